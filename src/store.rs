//! Attribute script stores.
//!
//! Two [`AttributeStore`] implementations: a file-backed one for the CLI
//! (one script file per attribute id under a root directory) and an
//! in-memory one for tests and embedding hosts.

use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::engine::AttributeStore;
use crate::error::{BakeError, BakeResult};

/// File-backed store: `<root>/<attribute_id>.expr`.
#[derive(Debug)]
pub struct FileAttributeStore {
    root: PathBuf,
}

impl FileAttributeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn script_path(&self, attribute_id: &str) -> PathBuf {
        self.root.join(format!("{}.expr", attribute_id))
    }
}

impl AttributeStore for FileAttributeStore {
    fn read(&self, attribute_id: &str) -> String {
        std::fs::read_to_string(self.script_path(attribute_id)).unwrap_or_default()
    }

    fn write(&mut self, attribute_id: &str, script: &str) -> BakeResult<()> {
        let path = self.script_path(attribute_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BakeError::WriteFailed(e.to_string()))?;
        }
        std::fs::write(&path, script).map_err(|e| BakeError::WriteFailed(e.to_string()))?;
        debug!("committed script to {}", path.display());
        Ok(())
    }

    fn refresh(&mut self) {
        debug!("attribute store refresh requested");
    }
}

/// In-memory store for tests and hosts that manage persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryAttributeStore {
    scripts: HashMap<String, String>,
    refreshes: usize,
}

impl MemoryAttributeStore {
    /// Pre-populate an attribute script (e.g. a hand-painted static map).
    pub fn seed(&mut self, attribute_id: impl Into<String>, script: impl Into<String>) {
        self.scripts.insert(attribute_id.into(), script.into());
    }

    pub fn get(&self, attribute_id: &str) -> Option<&str> {
        self.scripts.get(attribute_id).map(String::as_str)
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }
}

impl AttributeStore for MemoryAttributeStore {
    fn read(&self, attribute_id: &str) -> String {
        self.scripts.get(attribute_id).cloned().unwrap_or_default()
    }

    fn write(&mut self, attribute_id: &str, script: &str) -> BakeResult<()> {
        self.scripts.insert(attribute_id.to_owned(), script.to_owned());
        Ok(())
    }

    fn refresh(&mut self) {
        self.refreshes += 1;
    }
}

/// Convenience for seeding a file store outside a conversion (CLI `--assign`).
pub fn assign_initial_map(
    store: &mut impl AttributeStore,
    attribute_id: &str,
    map_ref: &str,
) -> BakeResult<()> {
    let script = format!("$a=map('{}');\n$a\n", map_ref);
    store.write(attribute_id, &script)
}
