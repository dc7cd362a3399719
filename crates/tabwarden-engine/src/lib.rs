//! Tab-event reconciliation engine.
//!
//! [`TabHousekeeper`] subscribes to tab lifecycle events and keeps the
//! browser tidy: freshly created duplicate tabs are collapsed onto the
//! existing tab, navigations to a pull-request conversation page get a
//! companion "files changed" tab opened alongside, and an on-demand sweep
//! collapses every duplicate-URL group across all open tabs.

pub mod controller;
pub mod message;
pub mod tracking;

pub use controller::{
    HousekeeperConfig, HousekeeperPerfSnapshot, SweepOutcome, TabHousekeeper,
    DEFAULT_NEW_TAB_WINDOW, DEFAULT_SPLIT_GRACE_WINDOW,
};
pub use message::HousekeeperRequest;
pub use tracking::TabTrackingRegistry;
