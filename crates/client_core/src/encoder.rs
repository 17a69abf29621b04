//! Binary image data to self-describing `data:` URIs and back.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{error::EncodingError, source::SourceFile};

const DATA_URI_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// A `data:<mime>;base64,<payload>` string. Carries its own MIME type so the
/// receiver can decode it without any side channel. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage(Arc<str>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn mime_type(&self) -> Option<&str> {
        split_data_uri(&self.0).map(|(mime, _)| mime)
    }

    pub fn decode(&self) -> Result<DecodedImage, EncodingError> {
        let (mime_type, payload) = split_data_uri(&self.0).ok_or(EncodingError::NotDataUri)?;
        let bytes = STANDARD.decode(payload)?;
        Ok(DecodedImage {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

impl TryFrom<String> for EncodedImage {
    type Error = EncodingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if split_data_uri(&value).is_none() {
            return Err(EncodingError::NotDataUri);
        }
        Ok(Self(value.into()))
    }
}

pub fn encode(mime_type: &str, bytes: &[u8]) -> EncodedImage {
    let uri = format!(
        "{DATA_URI_PREFIX}{}{BASE64_MARKER}{}",
        mime_type.trim(),
        STANDARD.encode(bytes)
    );
    EncodedImage(uri.into())
}

/// Reads the file behind `source` and encodes it with its declared type.
pub async fn encode_source(source: &SourceFile) -> Result<EncodedImage, EncodingError> {
    let bytes = source.read_bytes().await?;
    Ok(encode(&source.mime_type, &bytes))
}

fn split_data_uri(value: &str) -> Option<(&str, &str)> {
    let rest = value.strip_prefix(DATA_URI_PREFIX)?;
    let (mime_type, payload) = rest.split_once(BASE64_MARKER)?;
    if mime_type.is_empty() {
        return None;
    }
    Some((mime_type, payload))
}

#[cfg(test)]
#[path = "tests/encoder_tests.rs"]
mod tests;
