use std::fs;
use std::path::PathBuf;

use log::info;
use url::Url;

use crate::errors::DraftError;

/// Destination for rendered media and exported drafts
pub trait Uploader {
    /// Store `bytes` under `name` and return where they can be fetched
    fn upload(&self, name: &str, bytes: &[u8]) -> Result<Url, DraftError>;
}

/// Uploader writing into a local directory
#[derive(Debug, Clone)]
pub struct LocalDirUploader {
    root: PathBuf,
}

impl LocalDirUploader {
    /// The directory is created on first upload
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Uploader for LocalDirUploader {
    fn upload(&self, name: &str, bytes: &[u8]) -> Result<Url, DraftError> {
        let file_name = std::path::Path::new(name)
            .file_name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DraftError::InvalidParameter(format!("invalid upload name '{}'", name)))?;

        fs::create_dir_all(&self.root)?;
        let path = fs::canonicalize(&self.root)?.join(file_name);
        fs::write(&path, bytes)?;

        let url = Url::from_file_path(&path)
            .map_err(|_| DraftError::InvalidParameter(format!("cannot build URL for {}", path.display())))?;
        info!("Uploaded {} ({} bytes) to {}", name, bytes.len(), url);
        Ok(url)
    }
}
