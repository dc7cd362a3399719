use std::fmt;
use std::hash::{Hash, Hasher};

use url::Url;

/// The browser's new-tab page.
pub const NEW_TAB_URL: &str = "chrome://newtab/";

const INTERNAL_PREFIXES: &[&str] = &["chrome://", "chrome-extension://", "about:"];

/// Canonical page-identity key for a URL.
///
/// Two URLs address the same page iff their normalized forms are equal as
/// strings; equality and hashing therefore ignore whether normalization
/// actually parsed the input.
#[derive(Debug, Clone)]
pub enum NormalizedUrl {
    /// Parsed and canonicalized: fragment cleared, one trailing slash
    /// stripped from the serialized form.
    Canonical(String),
    /// The input did not parse; normalization fails open and keeps it as-is.
    Raw(String),
}

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Canonical(url) | Self::Raw(url) => url,
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, Self::Canonical(_))
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Canonical(url) | Self::Raw(url) => url,
        }
    }
}

impl PartialEq for NormalizedUrl {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for NormalizedUrl {}

impl Hash for NormalizedUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonicalizes a URL for page-identity comparison. Never fails: inputs
/// that do not parse pass through unchanged.
pub fn normalize(url: &str) -> NormalizedUrl {
    let Ok(mut parsed) = Url::parse(url) else {
        return NormalizedUrl::Raw(url.to_owned());
    };
    parsed.set_fragment(None);

    let mut serialized = String::from(parsed);
    if serialized.ends_with('/') {
        serialized.pop();
    }
    NormalizedUrl::Canonical(serialized)
}

/// True for URLs pointing at browser-internal UI, which are exempt from
/// deduplication and PR matching.
pub fn is_internal(url: &str) -> bool {
    url.is_empty()
        || url == NEW_TAB_URL
        || INTERNAL_PREFIXES
            .iter()
            .any(|prefix| url.starts_with(prefix))
}
