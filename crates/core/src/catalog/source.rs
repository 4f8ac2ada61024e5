use crate::catalog::{Catalog, LoadReport};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Where catalog snapshots come from. Implementations must return a whole snapshot or an error.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn load(&self) -> Result<(Catalog, LoadReport)>;
}

#[derive(Debug, Clone)]
pub struct JsonFileCatalogSource {
    path: PathBuf,
}

impl JsonFileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl CatalogSource for JsonFileCatalogSource {
    fn source_name(&self) -> &'static str {
        "json_file"
    }

    async fn load(&self) -> Result<(Catalog, LoadReport)> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read catalog file {}", self.path.display()))?;

        Catalog::from_json_str(&raw)
            .with_context(|| format!("failed to parse catalog file {}", self.path.display()))
    }
}
