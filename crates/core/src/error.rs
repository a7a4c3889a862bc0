#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read ledger file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write ledger file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to persist ledger file (path: {path}): {source}", path = path.display())]
    FilePersist {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize ledger: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize ledger: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to read doctor directory: {0}")]
    DirectoryRead(std::io::Error),
    #[error("failed to parse doctor directory: {0}")]
    DirectoryParse(serde_json::Error),
}

pub type AppointmentResult<T> = std::result::Result<T, AppointmentError>;
