//! End-to-end flow: browser events in, tab mutations out, message surface
//! on top, all through the public engine API with an in-memory browser.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tabwarden_engine::{HousekeeperConfig, TabHousekeeper};
use tabwarden_protocol::error::{HousekeeperError, HousekeeperResult};
use tabwarden_protocol::event::TabEvent;
use tabwarden_protocol::host::{TabHost, WindowHost};
use tabwarden_protocol::ids::{TabId, WindowId};
use tabwarden_protocol::settings::{MemorySettingsStore, Settings};
use tabwarden_protocol::tab::{CreateTabRequest, TabChange, TabSnapshot};
use tokio::sync::mpsc;
use tokio::time::sleep;

const TEST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Default)]
struct FakeBrowser {
    state: Mutex<FakeBrowserState>,
}

#[derive(Default)]
struct FakeBrowserState {
    tabs: Vec<TabSnapshot>,
    next_tab_id: u64,
    created: Vec<TabSnapshot>,
    removed: Vec<TabId>,
    focused: Vec<WindowId>,
}

impl FakeBrowser {
    fn open_tab(&self, window: u64, index: u32, url: &str) -> TabSnapshot {
        let mut state = self.state.lock().expect("lock browser state");
        state.next_tab_id += 1;
        let tab = TabSnapshot {
            id: TabId::new(state.next_tab_id),
            window_id: WindowId::new(window),
            url: url.to_owned(),
            index,
            active: false,
            last_accessed_ms: 0,
        };
        state.tabs.push(tab.clone());
        tab
    }

    fn created_tabs(&self) -> Vec<TabSnapshot> {
        self.state.lock().expect("lock browser state").created.clone()
    }

    fn removed_tabs(&self) -> Vec<TabId> {
        self.state.lock().expect("lock browser state").removed.clone()
    }
}

#[async_trait]
impl TabHost for FakeBrowser {
    async fn query_all(&self) -> HousekeeperResult<Vec<TabSnapshot>> {
        Ok(self.state.lock().expect("lock browser state").tabs.clone())
    }

    async fn activate(&self, tab_id: TabId) -> HousekeeperResult<()> {
        let mut state = self.state.lock().expect("lock browser state");
        if !state.tabs.iter().any(|tab| tab.id == tab_id) {
            return Err(HousekeeperError::TabNotFound(tab_id.to_string()));
        }
        for tab in &mut state.tabs {
            tab.active = tab.id == tab_id;
        }
        Ok(())
    }

    async fn create(&self, request: CreateTabRequest) -> HousekeeperResult<TabSnapshot> {
        let mut state = self.state.lock().expect("lock browser state");
        state.next_tab_id += 1;
        let tab = TabSnapshot {
            id: TabId::new(state.next_tab_id),
            window_id: WindowId::new(1),
            url: request.url,
            index: request.index,
            active: request.active,
            last_accessed_ms: 0,
        };
        let position = (request.index as usize).min(state.tabs.len());
        state.tabs.insert(position, tab.clone());
        state.created.push(tab.clone());
        Ok(tab)
    }

    async fn remove(&self, tab_ids: &[TabId]) -> HousekeeperResult<()> {
        let mut state = self.state.lock().expect("lock browser state");
        state.removed.extend_from_slice(tab_ids);
        state.tabs.retain(|tab| !tab_ids.contains(&tab.id));
        Ok(())
    }
}

#[async_trait]
impl WindowHost for FakeBrowser {
    async fn focus(&self, window_id: WindowId) -> HousekeeperResult<()> {
        self.state
            .lock()
            .expect("lock browser state")
            .focused
            .push(window_id);
        Ok(())
    }
}

fn engine(browser: &Arc<FakeBrowser>, settings: Settings) -> TabHousekeeper {
    TabHousekeeper::with_config(
        browser.clone(),
        browser.clone(),
        Arc::new(MemorySettingsStore::new(settings)),
        HousekeeperConfig::default(),
    )
}

async fn wait_until<F>(description: &str, mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + TEST_TIMEOUT;
    loop {
        if condition() {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {description}"
        );
        sleep(Duration::from_millis(10)).await;
    }
}

fn updated(tab: &TabSnapshot, url: &str) -> TabEvent {
    TabEvent::Updated {
        tab_id: tab.id,
        change: TabChange {
            url: Some(url.to_owned()),
        },
        tab: TabSnapshot {
            url: url.to_owned(),
            ..tab.clone()
        },
    }
}

#[tokio::test]
async fn pr_navigation_splits_without_closing_the_first_of_its_url() {
    let browser = Arc::new(FakeBrowser::default());
    let engine = engine(&browser, Settings::default());
    let (events, inbox) = mpsc::unbounded_channel();
    let loop_task = engine.spawn_event_loop(inbox);

    // A brand-new tab lands on a PR conversation page.
    let mut tab = browser.open_tab(1, 2, "chrome://newtab/");
    events.send(TabEvent::Created(tab.clone())).expect("send created");
    let pr_url = "https://github.com/acme/widgets/pull/42";
    events.send(updated(&tab, pr_url)).expect("send navigation");
    tab.url = pr_url.to_owned();
    {
        let mut state = browser.state.lock().expect("lock browser state");
        let position = state
            .tabs
            .iter()
            .position(|open| open.id == tab.id)
            .expect("trigger tab open");
        state.tabs[position].url = pr_url.to_owned();
    }

    wait_until("the files tab to open", || !browser.created_tabs().is_empty()).await;

    let created = browser.created_tabs();
    assert_eq!(created.len(), 1);
    assert_eq!(
        created[0].url,
        "https://github.com/acme/widgets/pull/42/files"
    );
    assert_eq!(created[0].index, tab.index + 1);
    assert!(!created[0].active);
    // First tab of its URL: nothing was deduplicated away.
    assert!(browser.removed_tabs().is_empty());

    // The browser reports the side tab's own creation and first navigation;
    // neither may trigger a second split.
    let side_tab = created[0].clone();
    events
        .send(TabEvent::Created(side_tab.clone()))
        .expect("send side tab created");
    events
        .send(updated(&side_tab, &side_tab.url))
        .expect("send side tab navigation");

    let deadline = tokio::time::Instant::now() + TEST_TIMEOUT;
    loop {
        if engine.perf_snapshot().await.split_self_suppressed_total == 1 {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for the side tab to be self-suppressed"
        );
        sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(browser.created_tabs().len(), 1);

    drop(events);
    loop_task.await.expect("event loop shuts down");
}

#[tokio::test]
async fn sweep_request_closes_duplicates_over_the_message_surface() {
    let browser = Arc::new(FakeBrowser::default());
    let engine = engine(&browser, Settings::default());

    let kept = browser.open_tab(1, 0, "https://example.com/doc");
    let duplicate = browser.open_tab(1, 1, "https://example.com/doc#footnote");
    browser.open_tab(1, 2, "https://example.com/other");
    {
        let mut state = browser.state.lock().expect("lock browser state");
        let position = state
            .tabs
            .iter()
            .position(|open| open.id == kept.id)
            .expect("kept tab open");
        state.tabs[position].active = true;
    }

    let response = engine
        .handle_request_json(r#"{"action":"deduplicateAll"}"#)
        .await
        .expect("dispatch sweep request");

    assert_eq!(response, r#"{"closed":1}"#);
    assert_eq!(browser.removed_tabs(), vec![duplicate.id]);
}

#[tokio::test]
async fn new_duplicate_tab_is_collapsed_onto_the_existing_tab() {
    let browser = Arc::new(FakeBrowser::default());
    let engine = engine(&browser, Settings::default());
    let (events, inbox) = mpsc::unbounded_channel();
    let loop_task = engine.spawn_event_loop(inbox);

    let existing = browser.open_tab(1, 0, "https://example.com/doc");
    let newcomer = browser.open_tab(2, 0, "chrome://newtab/");
    events
        .send(TabEvent::Created(newcomer.clone()))
        .expect("send created");
    events
        .send(updated(&newcomer, "https://example.com/doc/"))
        .expect("send navigation");

    wait_until("the duplicate to be closed", || {
        browser.removed_tabs() == vec![newcomer.id]
    })
    .await;
    let focused = browser.state.lock().expect("lock browser state").focused.clone();
    assert_eq!(focused, vec![existing.window_id]);

    drop(events);
    loop_task.await.expect("event loop shuts down");
}
