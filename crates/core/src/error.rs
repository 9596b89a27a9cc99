#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("forms error: {0}")]
    Forms(#[from] ctrls_forms::FormsError),
    #[error("failed to create auth state directory: {0}")]
    AuthDirCreation(std::io::Error),
    #[error("failed to read auth state file: {0}")]
    AuthFileRead(std::io::Error),
    #[error("failed to write auth state file: {0}")]
    AuthFileWrite(std::io::Error),
    #[error("failed to remove auth state file: {0}")]
    AuthFileRemove(std::io::Error),
    #[error("failed to serialize auth state: {0}")]
    AuthSerialization(serde_json::Error),
    #[error("failed to deserialize auth state: {0}")]
    AuthDeserialization(serde_json::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
