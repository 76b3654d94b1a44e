use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebcamError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No live videos discovered")]
    NoVideosFound,

    #[error("Publish error: {0}")]
    Publish(String),
}
