use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
