//! Where raw provider tables come from on refresh.

use std::path::{Path, PathBuf};

use cloud_pricing_core::{CpuRamUnitPrice, GpuUnitOption, InstanceRecord, ProviderId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A provider table before normalization.
///
/// Fixed tables may list attachable GPU options together with the instance
/// name prefixes (`gpu_families`) they can be attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceTable {
    Fixed {
        instances: Vec<InstanceRecord>,
        #[serde(default)]
        gpu_options: Vec<GpuUnitOption>,
        #[serde(default)]
        gpu_families: Vec<String>,
    },
    Custom {
        cpu: Vec<CpuRamUnitPrice>,
        #[serde(default)]
        gpu: Vec<GpuUnitOption>,
    },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no table for provider {provider} at {}", path.display())]
    NotFound { provider: ProviderId, path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Fetches the current raw table of a provider.
pub trait TableSource: Send + Sync {
    fn fetch(&self, provider: &ProviderId) -> Result<SourceTable, SourceError>;
}

/// Reads `<dir>/<provider>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_path(&self, provider: &ProviderId) -> PathBuf {
        self.dir.join(format!("{provider}.json"))
    }
}

impl TableSource for DirectorySource {
    fn fetch(&self, provider: &ProviderId) -> Result<SourceTable, SourceError> {
        let path = self.table_path(provider);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound {
                    provider: provider.clone(),
                    path,
                });
            }
            Err(source) => return Err(SourceError::Io { path, source }),
        };
        let table: SourceTable =
            serde_json::from_str(&content).map_err(|source| SourceError::Parse {
                path: path.clone(),
                source,
            })?;
        debug!(%provider, path = %path.display(), "provider table read");
        Ok(table)
    }
}
