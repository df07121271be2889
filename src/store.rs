use crate::league::Document;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode store document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// The whole league document in one JSON file.
///
/// Every call reads or rewrites the full file. There is no locking: two
/// concurrent saves both succeed and the later rename wins.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document, writing an empty one first if the file is missing.
    pub async fn load(&self) -> Result<Document, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                let document = Document::default();
                self.save(&document).await?;
                tracing::info!(path = %self.path.display(), "created empty league store");
                return Ok(document);
            }
            Err(source) => return Err(self.io_error(source)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::default());
        }

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrites the file with `document`, pretty-printed.
    pub async fn save(&self, document: &Document) -> Result<(), StoreError> {
        let mut payload = serde_json::to_vec_pretty(document).map_err(StoreError::Encode)?;
        payload.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let temp_path = self.temp_path();
        if let Err(source) = tokio::fs::write(&temp_path, &payload).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(self.io_error(source));
        }
        if let Err(source) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(self.io_error(source));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store.json".to_string());
        self.path
            .with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4().simple()))
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
