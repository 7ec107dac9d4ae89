//! Subcommand implementations.

pub mod analytics;
pub mod assignments;
pub mod delete;
pub mod feed;
pub mod init;
pub mod page;
pub mod plagiarism;
pub mod quiz;
pub mod student;
pub mod submissions;
pub mod tool;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use vedascore_client::{load_config, load_config_from, ClientConfig, HttpApi, MockApi};
use vedascore_core::VedaApi;
use vedascore_views::{DeletedSubmissions, LocalStore};

/// Where API data comes from, as chosen by the global flags.
pub struct Source {
    pub config: Option<PathBuf>,
    pub demo: bool,
}

/// A loaded config plus the API it points at.
pub struct Session {
    pub config: ClientConfig,
    pub api: Arc<dyn VedaApi>,
}

impl Source {
    pub fn connect(&self) -> Result<Session> {
        let config = match &self.config {
            Some(path) => load_config_from(Some(path.as_path()))?,
            None => load_config()?,
        };
        let api: Arc<dyn VedaApi> = if self.demo {
            tracing::debug!("using built-in demo data");
            Arc::new(MockApi::demo())
        } else {
            tracing::debug!(?config, "connecting");
            Arc::new(HttpApi::from_config(&config)?)
        };
        Ok(Session { config, api })
    }
}

impl Session {
    pub fn store(&self) -> Result<Arc<LocalStore>> {
        let store = LocalStore::open(&self.config.storage_path)
            .context("failed to open local store")?;
        Ok(Arc::new(store))
    }

    pub fn deleted_submissions(&self) -> Result<Arc<DeletedSubmissions>> {
        Ok(Arc::new(DeletedSubmissions::load(self.store()?)))
    }
}
