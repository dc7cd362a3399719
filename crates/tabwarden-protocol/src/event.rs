use serde::{Deserialize, Serialize};

use crate::ids::TabId;
use crate::tab::{TabChange, TabSnapshot};

/// Tab lifecycle signal delivered by the browser bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabEvent {
    Created(TabSnapshot),
    Removed(TabId),
    Updated {
        tab_id: TabId,
        change: TabChange,
        tab: TabSnapshot,
    },
}
