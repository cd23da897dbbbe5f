use thiserror::Error;

#[derive(Error, Debug)]
pub enum TripError {
    #[error("completion service error: {0}")] Service(String),
    #[error("configuration error: {0}")] Configuration(String),
    #[error("invalid trip request: {0}")] InvalidRequest(String),
    #[error("export failed: {0}")] Export(String),
    #[error(transparent)] Io(#[from] std::io::Error),
    #[error(transparent)] Json(#[from] serde_json::Error),
}

impl TripError {
    /// Message shown to the user by the outermost handler.
    pub fn user_message(&self) -> String {
        match self {
            TripError::Service(_) => format!("추천을 받지 못했습니다. {}", self),
            TripError::Configuration(_) => format!("설정을 확인해 주세요. {}", self),
            _ => self.to_string(),
        }
    }
}
