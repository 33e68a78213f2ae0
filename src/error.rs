use std::path::PathBuf;

use thiserror::Error;

use crate::migrator::MigratorOptionsBuilderError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML Serialization: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    #[error("TOML Deserialization: {0}")]
    TomlDeserialization(#[from] toml::de::Error),

    /// The reference template could not be located or opened.
    ///
    /// Returned by [`TemplateSource::open_stream`](crate::TemplateSource::open_stream)
    /// and therefore by [`ConfigMigrator::migrate`](crate::ConfigMigrator::migrate)
    /// before anything on disk has been touched. The contained string is the
    /// template name (or path) that was requested.
    ///
    /// # How to Fix
    ///
    /// Bundled templates must be registered before they can be found:
    ///
    /// ```rust,ignore
    /// use config_migrator::Resource;
    ///
    /// #[derive(Resource)]
    /// #[resource(path = "resources/config.yml")]
    /// struct DefaultConfig;
    /// // "config.yml" can now be opened with BundledTemplate::new("config.yml")
    /// ```
    #[error("Template not available: {0}")]
    TemplateUnavailable(String),

    /// Copying the current document into the backup area failed.
    ///
    /// The migrator never propagates this error: it is logged as a warning
    /// and the migration continues without a backup.
    #[error("Backup of {} failed: {reason}", path.display())]
    BackupFailed { path: PathBuf, reason: String },

    /// The document root is not a mapping.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Options: {0}")]
    Options(#[from] MigratorOptionsBuilderError),
}
