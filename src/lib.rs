pub mod atomic;
pub mod document;
pub mod error;
pub mod format;
pub mod migrator;
pub mod resource;
pub mod snapshot;
pub mod store;
pub mod template;

pub use document::ConfigDocument;
pub use error::Error;
pub use format::DocumentFormat;
pub use migrator::{ConfigMigrator, MigratorOptions, MigratorOptionsBuilder};
pub use resource::{RegisteredResource, Resource};
pub use snapshot::ValueSnapshot;
pub use store::{DocumentStore, FileDocumentStore};
pub use template::{BundledTemplate, FileTemplate, InlineTemplate, TemplateSource};

// re-export macro
pub use config_migrator_macros::Resource;

#[doc(hidden)]
pub use inventory;
