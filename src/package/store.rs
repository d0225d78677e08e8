//! JSON store of configured repositories, keyed by stable identifier.

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::repository::UpdateStrategy;
use crate::runtime::Runtime;

use super::PackageEntry;

const STORE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Default)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, PackageEntry>,
}

/// Configured repositories persisted at a single JSON file.
///
/// Every call re-reads the file, so several stores over the same path stay
/// consistent as long as they are not used concurrently.
pub struct PackageStore<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> PackageStore<'a, R> {
    pub fn new(runtime: &'a R, path: PathBuf) -> Self {
        Self { runtime, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries with their identifiers, sorted by identifier.
    ///
    /// A missing file is an empty store.
    #[tracing::instrument(skip(self))]
    pub fn load_all(&self) -> Result<Vec<(String, PackageEntry)>> {
        Ok(self.read()?.entries.into_iter().collect())
    }

    /// Entry with the given identifier.
    pub fn get(&self, id: &str) -> Result<Option<PackageEntry>> {
        Ok(self.read()?.entries.remove(id))
    }

    /// Look up an entry by identifier, URL or slug.
    ///
    /// Fails if `name` is a slug shared by several entries.
    pub fn find(&self, name: &str) -> Result<Option<(String, PackageEntry)>> {
        let mut entries = self.read()?.entries;
        if let Some(entry) = entries.remove(name) {
            return Ok(Some((name.to_string(), entry)));
        }

        let mut matches: Vec<_> = entries
            .into_iter()
            .filter(|(_, entry)| entry.matches(name))
            .collect();
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            _ => {
                let ids: Vec<_> = matches.into_iter().map(|(id, _)| id).collect();
                bail!("'{}' is ambiguous, use one of: {}", name, ids.join(", "))
            }
        }
    }

    /// Like [`find`](Self::find), but a missing entry is an error.
    pub fn find_required(&self, name: &str) -> Result<(String, PackageEntry)> {
        self.find(name)?
            .with_context(|| format!("No configured repository matches '{}'", name))
    }

    /// Store a new entry and return its identifier.
    ///
    /// Fails if the URL has no stable identifier or the identifier is taken.
    pub fn add(&self, entry: PackageEntry) -> Result<String> {
        let id = entry
            .unique_id()
            .with_context(|| format!("Cannot derive an identifier from URL '{}'", entry.url))?;

        let mut file = self.read()?;
        if file.entries.contains_key(&id) {
            bail!("Repository {} is already configured", id);
        }

        debug!("Adding {} ({})", id, entry.url);
        file.entries.insert(id.clone(), entry);
        self.write(&file)?;
        Ok(id)
    }

    /// Drop an entry; returns it if it existed.
    pub fn remove(&self, id: &str) -> Result<Option<PackageEntry>> {
        let mut file = self.read()?;
        let removed = file.entries.remove(id);
        if removed.is_some() {
            debug!("Removing {}", id);
            self.write(&file)?;
        }
        Ok(removed)
    }

    /// Change the persisted update strategy of an entry.
    pub fn set_strategy(&self, id: &str, strategy: UpdateStrategy) -> Result<()> {
        let mut file = self.read()?;
        let entry = file
            .entries
            .get_mut(id)
            .with_context(|| format!("Repository {} is not configured", id))?;
        entry.update_strategy = strategy;
        self.write(&file)
    }

    fn read(&self) -> Result<StoreFile> {
        if !self.runtime.exists(&self.path) {
            return Ok(StoreFile {
                version: STORE_VERSION,
                ..Default::default()
            });
        }

        let content = self.runtime.read_to_string(&self.path)?;
        let file: StoreFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", self.path))?;
        if file.version > STORE_VERSION {
            bail!(
                "{:?} has store version {}, this gpm understands up to {}",
                self.path,
                file.version,
                STORE_VERSION
            );
        }
        Ok(file)
    }

    /// Write through a temporary file so a crash never leaves a truncated store.
    fn write(&self, file: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !self.runtime.exists(parent)
        {
            self.runtime.create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&StoreFile {
            version: STORE_VERSION,
            entries: file.entries.clone(),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        self.runtime
            .write(&tmp, content.as_bytes())
            .with_context(|| format!("Failed to write {:?}", tmp))?;
        self.runtime
            .rename(&tmp, &self.path)
            .with_context(|| format!("Failed to save {:?}", self.path))
    }
}
