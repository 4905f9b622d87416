//! JSON file-backed registry store with atomic writes.

use std::path::{Path, PathBuf};

use {
    async_trait::async_trait,
    tokio::fs,
    tracing::{debug, info},
};

use crate::{
    Error, Result,
    store::{ChannelStore, RegistryFile, TrackedChannel},
};

/// Registry persisted as a single JSON document.
#[derive(Debug, Clone)]
pub struct FileChannelStore {
    path: PathBuf,
}

impl FileChannelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }
        Ok(())
    }

    /// Write to a sibling temp file, then rename over the target.
    async fn atomic_write(&self, doc: &RegistryFile) -> Result<()> {
        self.ensure_parent().await?;
        let json = serde_json::to_string_pretty(doc)?;
        let tmp = self.tmp_path();

        fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|e| Error::io(&tmp, e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::io(&self.path, e))?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ChannelStore for FileChannelStore {
    async fn load(&self) -> Result<Vec<TrackedChannel>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            info!(path = %self.path.display(), "channel registry not found, creating empty file");
            self.atomic_write(&RegistryFile::default()).await?;
            return Ok(Vec::new());
        }

        let data = fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::io(&self.path, e))?;
        if data.trim().is_empty() {
            debug!(path = %self.path.display(), "channel registry file is empty");
            return Ok(Vec::new());
        }

        let doc: RegistryFile =
            serde_json::from_str(&data).map_err(|e| Error::corrupt(&self.path, e))?;
        debug!(
            path = %self.path.display(),
            count = doc.channels.len(),
            "loaded channel registry"
        );
        Ok(doc.channels)
    }

    async fn save(&self, channels: &[TrackedChannel]) -> Result<()> {
        let doc = RegistryFile {
            channels: channels.to_vec(),
        };
        self.atomic_write(&doc).await?;
        debug!(path = %self.path.display(), count = channels.len(), "saved channel registry");
        Ok(())
    }
}
