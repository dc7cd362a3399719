//! Shared protocol surface between the tabwarden engine and the browser.
//!
//! Everything the engine needs from the host browser (tab management,
//! window focus, and the settings store) is expressed here as data types
//! and async traits so the engine can be driven by a real extension bridge
//! or by in-memory fakes in tests.

pub mod error;
pub mod event;
pub mod host;
pub mod ids;
pub mod settings;
pub mod tab;

pub use error::{HousekeeperError, HousekeeperResult};
pub use event::TabEvent;
pub use host::{TabHost, WindowHost};
pub use ids::{TabId, WindowId};
pub use settings::{
    MatchMode, MemorySettingsStore, Settings, SettingsPatch, SettingsStore,
};
pub use tab::{CreateTabRequest, TabChange, TabSnapshot};
