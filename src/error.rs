use thiserror::Error;

#[derive(Error, Debug)]
pub enum BedlambError {
    #[error("{0}")]
    Usage(String),

    #[error("Error loading AWS config: {0}")]
    Config(String),

    #[error("Error invoking Lambda: {0}")]
    Invoke(String),

    #[error("Lambda function error: {error}\nResponse: {payload}")]
    Function { error: String, payload: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error marshaling request: {0}")]
    Json(#[from] serde_json::Error),
}

impl BedlambError {
    pub fn function(error: impl Into<String>, payload: &[u8]) -> Self {
        Self::Function {
            error: error.into(),
            payload: String::from_utf8_lossy(payload).into_owned(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BedlambError>;
