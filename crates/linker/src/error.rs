use std::path::PathBuf;

use catalink_client::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum LinkerError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The review artifact could not be written. Its contents were already
    /// emitted on the fallback writer.
    #[error("cannot write review artifact in {}: {source}", .dir.display())]
    Persistence {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot serialize review artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}
