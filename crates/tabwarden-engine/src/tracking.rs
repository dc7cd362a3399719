use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use tabwarden_core::pr::PrKey;
use tabwarden_protocol::ids::TabId;

/// Ephemeral per-process tracking state owned by the engine.
///
/// Holds the three short-lived guard structures: creation timestamps of
/// recently created tabs, identifiers of tabs the split controller opened
/// itself, and PR keys inside the split grace window. All of it resets to
/// empty when the engine process restarts; a tab tracked before a restart
/// simply counts as "not new" afterwards.
#[derive(Debug, Default)]
pub struct TabTrackingRegistry {
    recent: HashMap<TabId, Instant>,
    auto_opened: HashSet<TabId>,
    split_prs: HashSet<PrKey>,
}

impl TabTrackingRegistry {
    pub fn note_created(&mut self, tab_id: TabId, at: Instant) {
        self.recent.insert(tab_id, at);
    }

    /// Drops all tracking for a removed tab.
    pub fn forget_tab(&mut self, tab_id: TabId) {
        self.recent.remove(&tab_id);
        self.auto_opened.remove(&tab_id);
    }

    /// True when the tab was created within `window` of `now`. Entries past
    /// the window are pruned on consultation.
    pub fn is_recent(&mut self, tab_id: TabId, now: Instant, window: Duration) -> bool {
        let Some(created_at) = self.recent.get(&tab_id).copied() else {
            return false;
        };
        if now.duration_since(created_at) < window {
            return true;
        }
        self.recent.remove(&tab_id);
        false
    }

    pub fn note_auto_opened(&mut self, tab_id: TabId) {
        self.auto_opened.insert(tab_id);
    }

    /// Removes the auto-opened marker, reporting whether it was present.
    /// The first navigation of a side tab consumes its own marker.
    pub fn consume_auto_opened(&mut self, tab_id: TabId) -> bool {
        self.auto_opened.remove(&tab_id)
    }

    pub fn note_split(&mut self, key: PrKey) -> bool {
        self.split_prs.insert(key)
    }

    pub fn is_split(&self, key: &PrKey) -> bool {
        self.split_prs.contains(key)
    }

    pub fn expire_split(&mut self, key: &PrKey) -> bool {
        self.split_prs.remove(key)
    }

    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    pub fn auto_opened_len(&self) -> usize {
        self.auto_opened.len()
    }

    pub fn split_len(&self) -> usize {
        self.split_prs.len()
    }
}
