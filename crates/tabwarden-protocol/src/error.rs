use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HousekeeperError {
    #[error("housekeeper configuration error: {0}")]
    Configuration(String),
    #[error("browser tab not found: {0}")]
    TabNotFound(String),
    #[error("browser window not found: {0}")]
    WindowNotFound(String),
    #[error("browser host error: {0}")]
    Host(String),
    #[error("settings store error: {0}")]
    Settings(String),
    #[error("housekeeper protocol error: {0}")]
    Protocol(String),
    #[error("housekeeper internal error: {0}")]
    Internal(String),
}

impl HousekeeperError {
    /// True when the failure means the target tab or window no longer
    /// exists, which callers racing the browser treat as success.
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::TabNotFound(_) | Self::WindowNotFound(_))
    }
}

pub type HousekeeperResult<T> = Result<T, HousekeeperError>;
