//! Client-side fast-fail gate on the declared type and size of a file.
//!
//! No content sniffing happens here; the service remains the authority on
//! whether the bytes really are an image.

use crate::error::ValidationError;

pub const ACCEPTED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/jpg",
    "image/bmp",
    "image/gif",
    "image/webp",
];

pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub mime_type: String,
    pub size_bytes: u64,
}

impl FileDescriptor {
    pub fn new(mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            mime_type: mime_type.into(),
            size_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accepted,
    Rejected(ValidationError),
}

impl Validation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Validation::Accepted)
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            Validation::Accepted => Ok(()),
            Validation::Rejected(err) => Err(err),
        }
    }
}

/// Type check first, then size; the first failing rule wins.
pub fn validate(file: &FileDescriptor) -> Validation {
    if !is_accepted_mime_type(&file.mime_type) {
        return Validation::Rejected(ValidationError::InvalidFileType {
            mime_type: file.mime_type.clone(),
        });
    }

    if file.size_bytes > MAX_UPLOAD_BYTES {
        return Validation::Rejected(ValidationError::FileTooLarge {
            size_bytes: file.size_bytes,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    Validation::Accepted
}

pub fn is_accepted_mime_type(mime_type: &str) -> bool {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ACCEPTED_MIME_TYPES.contains(&essence.as_str())
}

#[cfg(test)]
#[path = "tests/validator_tests.rs"]
mod tests;
