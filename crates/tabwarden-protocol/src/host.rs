use async_trait::async_trait;

use crate::error::HousekeeperResult;
use crate::ids::{TabId, WindowId};
use crate::tab::{CreateTabRequest, TabSnapshot};

/// Tab-management collaborator. Every call is a suspend point: the browser
/// may close, move, or create tabs between any two calls, so callers must
/// tolerate [`crate::error::HousekeeperError::TabNotFound`] on mutations.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Enumerates every open tab across all windows.
    async fn query_all(&self) -> HousekeeperResult<Vec<TabSnapshot>>;

    /// Makes the tab the active tab of its window.
    async fn activate(&self, tab_id: TabId) -> HousekeeperResult<()>;

    async fn create(&self, request: CreateTabRequest) -> HousekeeperResult<TabSnapshot>;

    /// Closes the given tabs in one batched operation.
    async fn remove(&self, tab_ids: &[TabId]) -> HousekeeperResult<()>;
}

/// Window-management collaborator.
#[async_trait]
pub trait WindowHost: Send + Sync {
    async fn focus(&self, window_id: WindowId) -> HousekeeperResult<()>;
}
