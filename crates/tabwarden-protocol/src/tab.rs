use serde::{Deserialize, Serialize};

use crate::ids::{TabId, WindowId};

/// Point-in-time view of a browser tab, limited to the attributes the
/// engine consumes. Tabs are owned by the browser; the engine only reads
/// snapshots and issues mutations through [`crate::host::TabHost`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSnapshot {
    pub id: TabId,
    pub window_id: WindowId,
    pub url: String,
    /// Position within the owning window.
    pub index: u32,
    pub active: bool,
    /// Milliseconds since the epoch; zero when the browser never reported it.
    pub last_accessed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTabRequest {
    pub url: String,
    pub index: u32,
    pub active: bool,
}

/// Delta payload of a tab update event. Only URL changes are relevant to
/// the engine; other browser-side changes arrive with `url: None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TabChange {
    pub url: Option<String>,
}
