use crate::settings::SettingKey;
use thiserror::Error;

/// Failures reported by the face. None of these are fatal: a stale display is
/// better than a dead one, so callers log them and move on. The next
/// ten-minute tick is the only retry.
#[derive(Debug, Error)]
pub enum Error {
    /// A settings write did not durably commit. The display (and the session
    /// value of the setting) still reflect the write.
    #[error("Error saving setting {key:?}")]
    Storage {
        key: SettingKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An inbound message was dropped before it reached the reconciler
    #[error("Inbound message dropped: {reason}")]
    Delivery { reason: String },

    /// An outbound message was not transmitted
    #[error("Error sending outbound message: {reason}")]
    Send { reason: String },
}

impl Error {
    pub fn storage(key: SettingKey, error: anyhow::Error) -> Self {
        Self::Storage {
            key,
            source: error.into(),
        }
    }
}
