//! Static data: the seed content catalog and the fun-fact catalog.
//!
//! Both ship compiled in; a data directory can override either file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    content::{ContentType, Difficulty},
    fun_facts::FunFactCatalog,
};

const BUILTIN_CONTENT: &str = include_str!("../../data/content_catalog.json");
const BUILTIN_FUN_FACTS: &str = include_str!("../../data/fun_facts.json");

const CONTENT_FILE: &str = "content_catalog.json";
const FUN_FACTS_FILE: &str = "fun_facts.json";

/// A catalog item before it is stored. IDs are stable so reseeding is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub id:               String,
    pub title:            String,
    pub subject:          String,
    pub content_type:     ContentType,
    pub difficulty:       Difficulty,
    pub duration_minutes: u32,
    #[serde(default)]
    pub description:      String,
    #[serde(default)]
    pub thumbnail_url:    String,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentCatalogFile {
    content: Vec<CatalogEntry>,
}

#[derive(Debug, Clone)]
pub struct StudyConfig {
    pub content:   Vec<CatalogEntry>,
    pub fun_facts: FunFactCatalog,
}

impl StudyConfig {
    /// The catalogs compiled into the binary.
    pub fn builtin() -> anyhow::Result<Self> {
        let content: ContentCatalogFile = serde_json::from_str(BUILTIN_CONTENT)?;
        let fun_facts: FunFactCatalog = serde_json::from_str(BUILTIN_FUN_FACTS)?;
        Ok(Self {
            content: content.content,
            fun_facts,
        })
    }

    /// Load from `data_dir`, falling back to the builtin copy for any file
    /// that is not present there.
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let mut config = Self::builtin()?;

        let content_path = data_dir.join(CONTENT_FILE);
        if content_path.exists() {
            let raw = std::fs::read_to_string(&content_path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", content_path.display()))?;
            let file: ContentCatalogFile = serde_json::from_str(&raw)?;
            config.content = file.content;
            log::info!(
                "Loaded {} catalog items from {}",
                config.content.len(),
                content_path.display()
            );
        }

        let facts_path = data_dir.join(FUN_FACTS_FILE);
        if facts_path.exists() {
            let raw = std::fs::read_to_string(&facts_path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", facts_path.display()))?;
            config.fun_facts = serde_json::from_str(&raw)?;
            log::info!("Loaded fun facts from {}", facts_path.display());
        }

        Ok(config)
    }
}
