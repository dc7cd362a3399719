//! Pure URL logic for the tabwarden engine: page-identity normalization,
//! browser-internal URL classification, and pull-request URL matching.

pub mod pr;
pub mod url;

pub use crate::pr::{match_pr_url, PrKey, PrLink};
pub use crate::url::{is_internal, normalize, NormalizedUrl, NEW_TAB_URL};
