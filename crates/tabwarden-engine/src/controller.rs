use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tabwarden_core::pr::{match_pr_url, PrKey};
use tabwarden_core::url::{is_internal, normalize};
use tabwarden_protocol::error::HousekeeperResult;
use tabwarden_protocol::event::TabEvent;
use tabwarden_protocol::host::{TabHost, WindowHost};
use tabwarden_protocol::ids::TabId;
use tabwarden_protocol::settings::{MatchMode, Settings, SettingsStore};
use tabwarden_protocol::tab::{CreateTabRequest, TabSnapshot};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::tracking::TabTrackingRegistry;

/// How long after creation a tab still counts as "new" for deduplication.
pub const DEFAULT_NEW_TAB_WINDOW: Duration = Duration::from_secs(10);
/// How long a PR stays marked as already split.
pub const DEFAULT_SPLIT_GRACE_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HousekeeperConfig {
    pub new_tab_window: Duration,
    pub split_grace_window: Duration,
}

impl Default for HousekeeperConfig {
    fn default() -> Self {
        Self {
            new_tab_window: DEFAULT_NEW_TAB_WINDOW,
            split_grace_window: DEFAULT_SPLIT_GRACE_WINDOW,
        }
    }
}

/// Result of a bulk deduplication sweep. Serializes to the
/// `{"closed": n}` wire shape of the message surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub closed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HousekeeperPerfSnapshot {
    pub tracked_tabs: usize,
    pub auto_opened_tabs: usize,
    pub pending_split_keys: usize,
    pub active_grace_timers: u64,
    pub url_changes_total: u64,
    pub duplicates_resolved_total: u64,
    pub splits_total: u64,
    pub split_self_suppressed_total: u64,
    pub sweeps_total: u64,
    pub sweep_tabs_closed_total: u64,
    pub event_failures_total: u64,
}

#[derive(Debug, Default)]
struct HousekeeperPerfCounters {
    url_changes_total: AtomicU64,
    duplicates_resolved_total: AtomicU64,
    splits_total: AtomicU64,
    split_self_suppressed_total: AtomicU64,
    sweeps_total: AtomicU64,
    sweep_tabs_closed_total: AtomicU64,
    event_failures_total: AtomicU64,
    active_grace_timers: AtomicU64,
}

/// The reconciliation engine: routes tab lifecycle events to duplicate
/// resolution and PR auto-splitting, and runs the on-demand bulk sweep.
///
/// Tracking state is best-effort guard state, not a lock: every settings
/// read and tab enumeration is a suspend point and interleavings between a
/// read and its mutation are accepted.
#[derive(Clone)]
pub struct TabHousekeeper {
    tabs: Arc<dyn TabHost>,
    windows: Arc<dyn WindowHost>,
    settings: Arc<dyn SettingsStore>,
    tracking: Arc<RwLock<TabTrackingRegistry>>,
    config: HousekeeperConfig,
    perf: Arc<HousekeeperPerfCounters>,
}

impl TabHousekeeper {
    pub fn new(
        tabs: Arc<dyn TabHost>,
        windows: Arc<dyn WindowHost>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self::with_config(tabs, windows, settings, HousekeeperConfig::default())
    }

    pub fn with_config(
        tabs: Arc<dyn TabHost>,
        windows: Arc<dyn WindowHost>,
        settings: Arc<dyn SettingsStore>,
        config: HousekeeperConfig,
    ) -> Self {
        Self {
            tabs,
            windows,
            settings,
            tracking: Arc::new(RwLock::new(TabTrackingRegistry::default())),
            config,
            perf: Arc::new(HousekeeperPerfCounters::default()),
        }
    }

    /// Dispatches one tab lifecycle event.
    ///
    /// The guard ordering for URL changes is load-bearing: a brand-new
    /// duplicate tab is closed before it is ever considered for splitting,
    /// while an established tab that merely navigates skips deduplication
    /// but is still checked for a PR split.
    pub async fn handle_event(&self, event: TabEvent) -> HousekeeperResult<()> {
        match event {
            TabEvent::Created(tab) => {
                self.tracking
                    .write()
                    .await
                    .note_created(tab.id, Instant::now());
                Ok(())
            }
            TabEvent::Removed(tab_id) => {
                self.tracking.write().await.forget_tab(tab_id);
                Ok(())
            }
            TabEvent::Updated { tab_id, change, tab } => {
                let Some(url) = change.url else {
                    return Ok(());
                };
                self.perf.url_changes_total.fetch_add(1, Ordering::Relaxed);

                let is_new = self.tracking.write().await.is_recent(
                    tab_id,
                    Instant::now(),
                    self.config.new_tab_window,
                );
                if is_new && self.resolve_duplicate(tab_id, &url).await? {
                    // The triggering tab no longer exists.
                    return Ok(());
                }
                self.maybe_split(tab_id, &url, &tab).await
            }
        }
    }

    /// Collapses a newly created tab onto an existing tab with the same
    /// normalized URL: the existing tab is activated and focused, the
    /// newcomer closed. Reports whether the tab was handled.
    pub async fn resolve_duplicate(
        &self,
        tab_id: TabId,
        url: &str,
    ) -> HousekeeperResult<bool> {
        let settings = self.load_settings().await;
        if !settings.dedup || is_internal(url) {
            return Ok(false);
        }
        let wanted = match settings.match_mode {
            MatchMode::Exact => normalize(url),
        };

        let tabs = self.tabs.query_all().await?;
        let Some(existing) = tabs
            .iter()
            .find(|tab| tab.id != tab_id && normalize(&tab.url) == wanted)
        else {
            return Ok(false);
        };

        // Any of these can race a tab closed by another actor; the outcome
        // (one surviving tab) already satisfies the intent.
        if let Err(error) = self.tabs.activate(existing.id).await {
            tracing::debug!(tab = %existing.id, error = %error, "duplicate activation raced tab closure");
        }
        if let Err(error) = self.windows.focus(existing.window_id).await {
            tracing::debug!(window = %existing.window_id, error = %error, "window focus raced window closure");
        }
        if let Err(error) = self.tabs.remove(&[tab_id]).await {
            tracing::debug!(tab = %tab_id, error = %error, "duplicate close raced tab closure");
        }
        self.perf
            .duplicates_resolved_total
            .fetch_add(1, Ordering::Relaxed);
        Ok(true)
    }

    /// Opens the "files changed" companion tab for a navigation to a PR
    /// conversation page, at most once per PR within the grace window.
    pub async fn maybe_split(
        &self,
        tab_id: TabId,
        url: &str,
        tab: &TabSnapshot,
    ) -> HousekeeperResult<()> {
        let settings = self.load_settings().await;
        if !settings.github_split {
            return Ok(());
        }

        // A side tab completing its own first navigation is not a trigger.
        if self.tracking.write().await.consume_auto_opened(tab_id) {
            self.perf
                .split_self_suppressed_total
                .fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        let Some(pr) = match_pr_url(url, &settings.github_hosts) else {
            return Ok(());
        };
        let key = pr.key();
        if self.tracking.read().await.is_split(&key) {
            return Ok(());
        }

        let files_page = normalize(&pr.files_url);
        let open_tabs = self.tabs.query_all().await?;
        if open_tabs
            .iter()
            .any(|open| normalize(&open.url) == files_page)
        {
            return Ok(());
        }

        let created = self
            .tabs
            .create(CreateTabRequest {
                url: pr.files_url.clone(),
                index: tab.index + 1,
                active: false,
            })
            .await?;

        {
            let mut tracking = self.tracking.write().await;
            tracking.note_auto_opened(created.id);
            tracking.note_split(key.clone());
        }
        self.perf.splits_total.fetch_add(1, Ordering::Relaxed);
        self.spawn_grace_timer(key);
        Ok(())
    }

    /// One-shot sweep over all open tabs collapsing every duplicate-URL
    /// group to a single kept tab: the active tab wins, otherwise the most
    /// recently accessed, otherwise the first encountered. Closes the rest
    /// in one batched operation.
    pub async fn deduplicate_all(&self) -> HousekeeperResult<SweepOutcome> {
        self.perf.sweeps_total.fetch_add(1, Ordering::Relaxed);
        let tabs = self.tabs.query_all().await?;

        let mut kept_by_url = HashMap::new();
        let mut to_close: Vec<TabId> = Vec::new();
        for tab in tabs {
            if is_internal(&tab.url) {
                continue;
            }
            match kept_by_url.entry(normalize(&tab.url)) {
                Entry::Occupied(mut kept) => {
                    let current: &TabSnapshot = kept.get();
                    if tab.active
                        || (!current.active
                            && tab.last_accessed_ms > current.last_accessed_ms)
                    {
                        to_close.push(current.id);
                        kept.insert(tab);
                    } else {
                        to_close.push(tab.id);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(tab);
                }
            }
        }

        if !to_close.is_empty() {
            self.tabs.remove(&to_close).await?;
        }
        self.perf
            .sweep_tabs_closed_total
            .fetch_add(to_close.len() as u64, Ordering::Relaxed);
        Ok(SweepOutcome {
            closed: to_close.len(),
        })
    }

    /// Consumes the event inbox until it closes. One event's failure is
    /// logged and never blocks subsequent events.
    pub fn spawn_event_loop(
        &self,
        mut events: mpsc::UnboundedReceiver<TabEvent>,
    ) -> JoinHandle<()> {
        let housekeeper = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if let Err(error) = housekeeper.handle_event(event).await {
                    housekeeper
                        .perf
                        .event_failures_total
                        .fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(error = %error, "tab event handling failed");
                }
            }
        })
    }

    pub async fn perf_snapshot(&self) -> HousekeeperPerfSnapshot {
        let tracking = self.tracking.read().await;
        HousekeeperPerfSnapshot {
            tracked_tabs: tracking.recent_len(),
            auto_opened_tabs: tracking.auto_opened_len(),
            pending_split_keys: tracking.split_len(),
            active_grace_timers: self.perf.active_grace_timers.load(Ordering::Relaxed),
            url_changes_total: self.perf.url_changes_total.load(Ordering::Relaxed),
            duplicates_resolved_total: self
                .perf
                .duplicates_resolved_total
                .load(Ordering::Relaxed),
            splits_total: self.perf.splits_total.load(Ordering::Relaxed),
            split_self_suppressed_total: self
                .perf
                .split_self_suppressed_total
                .load(Ordering::Relaxed),
            sweeps_total: self.perf.sweeps_total.load(Ordering::Relaxed),
            sweep_tabs_closed_total: self
                .perf
                .sweep_tabs_closed_total
                .load(Ordering::Relaxed),
            event_failures_total: self.perf.event_failures_total.load(Ordering::Relaxed),
        }
    }

    async fn load_settings(&self) -> Settings {
        match self.settings.load().await {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!(error = %error, "settings store read failed; using defaults");
                Settings::default()
            }
        }
    }

    // Fire-and-forget expiry: the timer always fires and is never
    // cancelled, re-arming split eligibility for the PR.
    fn spawn_grace_timer(&self, key: PrKey) {
        let tracking = Arc::clone(&self.tracking);
        let perf = Arc::clone(&self.perf);
        let window = self.config.split_grace_window;
        perf.active_grace_timers.fetch_add(1, Ordering::Relaxed);
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            tracking.write().await.expire_split(&key);
            perf.active_grace_timers.fetch_sub(1, Ordering::Relaxed);
        });
    }
}
