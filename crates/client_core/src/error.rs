use thiserror::Error;

pub const READ_ERROR_MESSAGE: &str = "failed to read the selected image";
pub const TRANSPORT_ERROR_MESSAGE: &str = "an error occurred during prediction";
pub const APPLICATION_ERROR_MESSAGE: &str = "prediction failed";
pub const NO_FILE_MESSAGE: &str = "please select an image first";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid file type")]
    InvalidFileType { mime_type: String },
    #[error("file too large")]
    FileTooLarge { size_bytes: u64, limit: u64 },
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("failed to read image data: {0}")]
    Read(#[from] std::io::Error),
    #[error("payload is not a base64 data URI")]
    NotDataUri,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Every way a submission can end up `Failed`.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("service reported failure: {0}")]
    Application(String),
}

impl ClassifyError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    /// Message shown to the user once the submission is `Failed`.
    pub fn user_message(&self) -> String {
        match self {
            ClassifyError::Validation(err) => err.to_string(),
            ClassifyError::Encoding(_) => READ_ERROR_MESSAGE.to_string(),
            ClassifyError::Transport(_) => TRANSPORT_ERROR_MESSAGE.to_string(),
            ClassifyError::Application(message) if message.trim().is_empty() => {
                APPLICATION_ERROR_MESSAGE.to_string()
            }
            ClassifyError::Application(message) => message.clone(),
        }
    }
}
