//! Repository configuration, read from TOML.
//!
//! ```toml
//! name = "plant-7"
//! backend = "document"
//! seed = "submodels.json"
//! ```
//!
//! `seed` points at a JSON file holding an array of submodels loaded at
//! startup. Decorators are wired programmatically through
//! [`RepositoryBuilder`](crate::RepositoryBuilder), since sinks and
//! gateways are live objects a file cannot describe.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use twinrepo_core::RepoError;
use twinrepo_model::Submodel;

use crate::builder::RepositoryBuilder;
use crate::repository::{SubmodelRepository, DEFAULT_REPOSITORY_NAME};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CONFIG_READ: {0}")]
    Read(#[from] std::io::Error),

    #[error("CONFIG_PARSE: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("SEED_PARSE: {0}")]
    Seed(#[from] serde_json::Error),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    Document,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub backend: BackendKind,

    /// JSON file with submodels to load at startup.
    #[serde(default)]
    pub seed: Option<PathBuf>,
}

fn default_name() -> String {
    DEFAULT_REPOSITORY_NAME.to_string()
}

impl RepositoryConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    /// Builds the configured repository.
    pub fn build(&self) -> Result<Box<dyn SubmodelRepository>, ConfigError> {
        let seeds: Vec<Submodel> = match &self.seed {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => Vec::new(),
        };
        let repository = match self.backend {
            BackendKind::Memory => RepositoryBuilder::memory()
                .named(self.name.as_str())
                .seeded(seeds)
                .build()?,
            BackendKind::Document => RepositoryBuilder::in_process_documents()
                .named(self.name.as_str())
                .seeded(seeds)
                .build()?,
        };
        Ok(repository)
    }
}
