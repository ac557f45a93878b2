use crate::runtime::contract::ErrorCategory;

/// Access to the single shared counter record.
///
/// Implementations hold no counter state of their own; every call goes to the
/// backing store. `increment_count` must be a single store-side atomic update,
/// never a read followed by a write.
pub trait CounterStore {
    fn get_count(&self) -> Result<u64, CounterStoreError>;
    fn increment_count(&self) -> Result<u64, CounterStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CounterStoreError {
    /// The store answered with a service-level error (throttling, access denied, missing table).
    #[error("{0}")]
    Store(String),
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    InvalidRecord(String),
    /// The request never produced a service response.
    #[error("{0}")]
    Transport(String),
}

impl CounterStoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Store(_) => ErrorCategory::Store,
            Self::Configuration(_) | Self::InvalidRecord(_) | Self::Transport(_) => {
                ErrorCategory::Unhandled
            }
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::Store(detail)
            | Self::Configuration(detail)
            | Self::InvalidRecord(detail)
            | Self::Transport(detail) => detail,
        }
    }
}
