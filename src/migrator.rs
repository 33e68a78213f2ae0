//! Upgrading a live document to the latest template.
//!
//! [`ConfigMigrator`] compares the version stored in the live document with
//! the version of the template. When they differ it:
//!
//! 1. copies the current file into the backup area (failures only warn)
//! 2. takes a [`ValueSnapshot`] of every scalar and list
//! 3. overwrites the file with the raw template
//! 4. reloads the store
//! 5. sets every snapshot entry again
//! 6. saves the store
//!
//! Values are restored by key only. Keys the template no longer has come back
//! as they were, and renamed keys keep the template default.
//!
//! # Example
//!
//! ```rust,ignore
//! use config_migrator::{BundledTemplate, ConfigMigrator, FileDocumentStore, Resource};
//!
//! #[derive(Resource)]
//! #[resource(path = "resources/config.yml")]
//! struct LatestConfig;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = FileDocumentStore::init("./data", "config.yml")?;
//!     let migrator = ConfigMigrator::new(BundledTemplate::new("config.yml"));
//!
//!     if migrator.migrate(&mut store)? {
//!         println!("config upgraded");
//!     }
//!     Ok(())
//! }
//! ```
use std::{
    fs,
    path::{Path, PathBuf},
};

use derive_builder::Builder;
use tracing::{info, warn};

use crate::{
    atomic::AtomicFile, error::Error, snapshot::ValueSnapshot, store::DocumentStore,
    template::TemplateSource,
};

pub const DEFAULT_VERSION_PATH: &str = "config-version";
pub const DEFAULT_BACKUP_PATH: &str = "backups/configs";

/// Settings for a [`ConfigMigrator`].
///
/// ```rust
/// use config_migrator::MigratorOptionsBuilder;
///
/// let options = MigratorOptionsBuilder::default()
///     .version_path("meta.schema")
///     .make_backup(false)
///     .build()?;
///
/// assert_eq!(options.backup_path.to_str(), Some("backups/configs"));
/// # Ok::<(), config_migrator::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(default, setter(into))]
pub struct MigratorOptions {
    /// Dotted path of the version integer.
    pub version_path: String,

    /// Backup directory, relative to the store's data directory.
    pub backup_path: PathBuf,

    /// Copy the old document into `backup_path` before replacing it.
    pub make_backup: bool,

    /// Migrate when the installed version is newer than the template.
    /// Otherwise such documents are left alone.
    pub allow_downgrade: bool,
}

impl Default for MigratorOptions {
    fn default() -> Self {
        Self {
            version_path: DEFAULT_VERSION_PATH.to_string(),
            backup_path: PathBuf::from(DEFAULT_BACKUP_PATH),
            make_backup: true,
            allow_downgrade: true,
        }
    }
}

impl MigratorOptions {
    pub fn builder() -> MigratorOptionsBuilder {
        MigratorOptionsBuilder::default()
    }
}

pub struct ConfigMigrator<T> {
    template: T,
    options: MigratorOptions,
}

impl<T: TemplateSource> ConfigMigrator<T> {
    pub fn new(template: T) -> Self {
        Self::with_options(template, MigratorOptions::default())
    }

    pub fn with_options(template: T, options: MigratorOptions) -> Self {
        Self { template, options }
    }

    pub fn options(&self) -> &MigratorOptions {
        &self.options
    }

    pub fn template(&self) -> &T {
        &self.template
    }

    /// Version of the live document.
    pub fn installed_version<S: DocumentStore + ?Sized>(&self, store: &S) -> i64 {
        store.version(&self.options.version_path)
    }

    /// Version of the template. Fails if the template can't be read.
    pub fn latest_version(&self) -> Result<i64, Error> {
        self.template.version(&self.options.version_path)
    }

    /// Brings the document held by `store` up to the template's version.
    ///
    /// Returns `Ok(false)` without touching anything when the versions match
    /// (or when the document is newer and downgrades are disabled), and
    /// `Ok(true)` after a migration.
    ///
    /// # Errors
    ///
    /// - [`Error::TemplateUnavailable`] if the template can't be opened. This
    ///   is detected before anything is written.
    /// - I/O and format errors while replacing, reloading or saving the
    ///   document. The document may then be left half migrated; the backup
    ///   is the way back.
    pub fn migrate<S: DocumentStore + ?Sized>(&self, store: &mut S) -> Result<bool, Error> {
        let installed = self.installed_version(&*store);
        let latest = self.latest_version()?;

        if installed == latest {
            info!(version = installed, "config is up to date");
            return Ok(false);
        }

        if installed > latest {
            if !self.options.allow_downgrade {
                warn!(installed, latest, "config is newer than the template, leaving it alone");
                return Ok(false);
            }
            warn!(installed, latest, "config is newer than the template, downgrading");
        }

        info!(installed, latest, "config is outdated, updating");

        if self.options.make_backup {
            match self.backup(&*store, installed) {
                Ok(path) => info!(path = %path.display(), "backed up old config"),
                Err(err) => warn!(error = %err, "failed to create a backup of the old config"),
            }
        }

        let snapshot = ValueSnapshot::capture(&*store, &self.options.version_path);
        self.replace(&*store)?;
        store.reload()?;

        let restored = restore(store, snapshot);
        info!(restored, "values have been restored from the old config");

        store.save()?;
        info!(version = latest, "config updated successfully");

        Ok(true)
    }

    /// Where the backup of a document at `version` goes:
    /// `<data dir>/<backup path>/<stem>-<version>.<ext>`.
    pub fn backup_path_for<S: DocumentStore + ?Sized>(&self, store: &S, version: i64) -> PathBuf {
        let source = store.raw_file_path();
        let stem = source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("config");
        let ext = source
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_else(|| self.template.format().extension());

        store
            .data_dir()
            .join(&self.options.backup_path)
            .join(format!("{stem}-{version}.{ext}"))
    }

    fn backup<S: DocumentStore + ?Sized>(&self, store: &S, installed: i64) -> Result<PathBuf, Error> {
        let source = store.raw_file_path();
        let target = self.backup_path_for(store, installed);

        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(|err| backup_failed(&target, err.to_string()))?;
        }

        if !source.exists() {
            return Err(backup_failed(source, "source does not exist"));
        }
        if source.is_dir() {
            return Err(backup_failed(source, "source is a directory"));
        }
        if target.is_dir() {
            return Err(backup_failed(&target, "target is a directory"));
        }

        fs::copy(source, &target).map_err(|err| backup_failed(&target, err.to_string()))?;

        Ok(target)
    }

    fn replace<S: DocumentStore + ?Sized>(&self, store: &S) -> Result<(), Error> {
        let stream = self.template.open_stream()?;
        AtomicFile::new(store.raw_file_path()).write_from(stream)?;

        Ok(())
    }
}

fn restore<S: DocumentStore + ?Sized>(store: &mut S, snapshot: ValueSnapshot) -> usize {
    let restored = snapshot.len();
    for (key, value) in snapshot {
        store.set(&key, value);
    }
    restored
}

fn backup_failed(path: &Path, reason: impl Into<String>) -> Error {
    Error::BackupFailed {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}
