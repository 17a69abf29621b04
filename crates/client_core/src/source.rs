use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};

use crate::validator::FileDescriptor;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

#[derive(Clone)]
pub enum FileContent {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

impl fmt::Debug for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileContent::Path(path) => f.debug_tuple("Path").field(path).finish(),
            FileContent::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
        }
    }
}

/// Raw image chosen by the user: its declared type and size plus a handle to
/// the bytes, which are only read when a preview or payload is needed.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    content: FileContent,
}

impl SourceFile {
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as u64,
            content: FileContent::Memory(bytes),
        }
    }

    /// Declared metadata without touching the file; the size given here is
    /// what validation sees.
    pub fn from_path_with_metadata(
        path: impl Into<PathBuf>,
        mime_type: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        let path = path.into();
        Self {
            name: display_name(&path),
            mime_type: mime_type.into(),
            size_bytes,
            content: FileContent::Path(path),
        }
    }

    /// Stats the file and guesses its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("failed to stat '{}'", path.display()))?;
        if !metadata.is_file() {
            anyhow::bail!("'{}' is not a regular file", path.display());
        }

        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_MIME_TYPE);
        Ok(Self::from_path_with_metadata(
            path,
            mime_type,
            metadata.len(),
        ))
    }

    pub fn descriptor(&self) -> FileDescriptor {
        FileDescriptor::new(self.mime_type.clone(), self.size_bytes)
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.content {
            FileContent::Path(path) => tokio::fs::read(path).await,
            FileContent::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
