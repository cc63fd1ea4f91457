use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Trace container already holds a content node")]
    ContainerOccupied,
    #[error("Invalid overlay configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
