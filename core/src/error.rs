use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Case table is missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("Case table '{path}' could not be read: {source}")]
    CaseTableUnreadable {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type InsightResult<T> = Result<T, InsightError>;
