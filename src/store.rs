//! Live configuration documents.
//!
//! This module provides the [`DocumentStore`] trait, the view of the live
//! configuration that [`ConfigMigrator`](crate::ConfigMigrator) works against,
//! and [`FileDocumentStore`], a store backed by a single file on disk.
//!
//! # Overview
//!
//! A store owns exactly one in-memory document and knows where its persisted
//! form lives. It can:
//!
//! - Report the schema version stored in the document
//! - Flatten the document into dotted keys
//! - Set single values
//! - Reload the in-memory document from disk and save it back
//!
//! # Example
//!
//! ```rust,no_run
//! use config_migrator::{DocumentStore, FileDocumentStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Open (or start) ./data/config.yml
//!     let mut store = FileDocumentStore::init("./data", "config.yml")?;
//!
//!     println!("schema version: {}", store.version("config-version"));
//!
//!     // Modify and persist in one step
//!     store.update(|doc| {
//!         doc.set("server.port", 8080.into());
//!         Ok(())
//!     })?;
//!
//!     Ok(())
//! }
//! ```
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_yaml::Value;
use tracing::debug;

use crate::{
    atomic::AtomicFile, document::ConfigDocument, error::Error, format::DocumentFormat,
};

/// Access to the live configuration document.
///
/// The migrator borrows a store for the duration of a single call and never
/// keeps a reference to it, so implementations are free to swap their
/// in-memory document on [`reload`](DocumentStore::reload).
pub trait DocumentStore {
    /// Integer stored at `version_path`, `0` if it or the document is missing.
    fn version(&self, version_path: &str) -> i64;

    /// All entries keyed by dotted path. With `exclude_sections` only scalars
    /// and lists are returned.
    fn flatten(&self, exclude_sections: bool) -> IndexMap<String, Value>;

    fn set(&mut self, key: &str, value: Value);

    /// Re-reads the persisted document into memory.
    fn reload(&mut self) -> Result<(), Error>;

    /// Writes the in-memory document to storage.
    fn save(&self) -> Result<(), Error>;

    /// Path of the persisted document.
    fn raw_file_path(&self) -> &Path;

    /// Directory that relative paths such as the backup area resolve against.
    fn data_dir(&self) -> &Path {
        self.raw_file_path().parent().unwrap_or(Path::new(""))
    }
}

/// A [`DocumentStore`] backed by one YAML or TOML file.
///
/// The format follows the file extension (see [`DocumentFormat::from_path`]).
/// A missing file is treated as an empty document and is only created on the
/// first [`save`](DocumentStore::save).
pub struct FileDocumentStore {
    /// Directory the document lives in.
    data_dir: PathBuf,

    file: AtomicFile,
    format: DocumentFormat,

    /// The live document.
    document: ConfigDocument,
}

impl FileDocumentStore {
    /// Opens the document at `path`. Its parent directory becomes the data
    /// directory.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let data_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self::with_data_dir(data_dir, path)
    }

    /// Opens `file_name` inside `data_dir`.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - The application's data directory. It does not need to
    ///   exist yet; it is created on the first save.
    /// * `file_name` - Name of the document, e.g. `config.yml`.
    pub fn init(data_dir: impl AsRef<Path>, file_name: &str) -> Result<Self, Error> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let path = data_dir.join(file_name);

        Self::with_data_dir(data_dir, path)
    }

    fn with_data_dir(data_dir: PathBuf, path: PathBuf) -> Result<Self, Error> {
        let format = DocumentFormat::from_path(&path);
        let file = AtomicFile::new(path);
        let document = load(&file, format)?;

        Ok(Self {
            data_dir,
            file,
            format,
            document,
        })
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Updates the document and saves it to disk.
    ///
    /// If `f` returns an error nothing is written, but changes it already made
    /// stay in memory until the next [`reload`](DocumentStore::reload).
    pub fn update<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut ConfigDocument) -> Result<(), Error>,
    {
        f(&mut self.document)?;

        self.save()
    }
}

impl DocumentStore for FileDocumentStore {
    fn version(&self, version_path: &str) -> i64 {
        self.document.version(version_path)
    }

    fn flatten(&self, exclude_sections: bool) -> IndexMap<String, Value> {
        self.document.flatten(exclude_sections)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.document.set(key, value);
    }

    fn reload(&mut self) -> Result<(), Error> {
        debug!(path = %self.file.path().display(), "reloading config");
        self.document = load(&self.file, self.format)?;

        Ok(())
    }

    fn save(&self) -> Result<(), Error> {
        debug!(path = %self.file.path().display(), "saving config");
        let contents = self.document.emit(self.format)?;
        self.file.write(&contents)?;

        Ok(())
    }

    fn raw_file_path(&self) -> &Path {
        self.file.path()
    }

    fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn load(file: &AtomicFile, format: DocumentFormat) -> Result<ConfigDocument, Error> {
    match file.read()? {
        Some(contents) => ConfigDocument::parse(&contents, format),
        None => Ok(ConfigDocument::new()),
    }
}
