//! Sources of the latest reference document.
//!
//! A [`TemplateSource`] is read twice during a migration: once to learn the
//! latest schema version and once to stream its raw bytes over the live
//! document. It is never written to.
use std::{
    borrow::Cow,
    fs::File,
    io::{Cursor, Read},
    path::PathBuf,
};

use tracing::warn;

use crate::{document::ConfigDocument, error::Error, format::DocumentFormat, resource};

fn unusable(name: &str, cause: impl std::fmt::Display) -> Error {
    warn!(template = name, error = %cause, "template is not a valid document");
    Error::TemplateUnavailable(name.to_string())
}

pub trait TemplateSource {
    /// Name used for error messages and for picking the [`DocumentFormat`].
    fn name(&self) -> &str;

    /// Opens the raw template bytes.
    ///
    /// Fails with [`Error::TemplateUnavailable`] when the template can't be
    /// located.
    fn open_stream(&self) -> Result<Box<dyn Read + '_>, Error>;

    fn format(&self) -> DocumentFormat {
        DocumentFormat::from_path(self.name())
    }

    /// Reads and parses the template.
    ///
    /// A template that can't be read to the end or doesn't parse also fails
    /// with [`Error::TemplateUnavailable`]. The cause is logged.
    fn load(&self) -> Result<ConfigDocument, Error> {
        let mut contents = String::new();
        self.open_stream()?
            .read_to_string(&mut contents)
            .map_err(|err| unusable(self.name(), err))?;

        ConfigDocument::parse(&contents, self.format()).map_err(|err| unusable(self.name(), err))
    }

    /// Version stored in the template at `version_path`.
    fn version(&self, version_path: &str) -> Result<i64, Error> {
        Ok(self.load()?.version(version_path))
    }
}

impl<T: TemplateSource + ?Sized> TemplateSource for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open_stream(&self) -> Result<Box<dyn Read + '_>, Error> {
        (**self).open_stream()
    }

    fn format(&self) -> DocumentFormat {
        (**self).format()
    }
}

/// A template compiled into the binary and registered with
/// `#[derive(Resource)]` or [`submit_resource!`](crate::submit_resource).
#[derive(Debug, Clone)]
pub struct BundledTemplate {
    name: String,
}

impl BundledTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TemplateSource for BundledTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn open_stream(&self) -> Result<Box<dyn Read + '_>, Error> {
        let resource = resource::require(&self.name)?;
        Ok(Box::new(Cursor::new(resource.contents)))
    }
}

/// A template read from the file system.
#[derive(Debug, Clone)]
pub struct FileTemplate {
    path: PathBuf,
    name: String,
}

impl FileTemplate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl TemplateSource for FileTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn open_stream(&self) -> Result<Box<dyn Read + '_>, Error> {
        if self.path.is_dir() {
            return Err(Error::TemplateUnavailable(self.name.clone()));
        }

        let file =
            File::open(&self.path).map_err(|_| Error::TemplateUnavailable(self.name.clone()))?;
        Ok(Box::new(file))
    }
}

/// A template held in memory.
#[derive(Debug, Clone)]
pub struct InlineTemplate {
    name: String,
    contents: Cow<'static, [u8]>,
}

impl InlineTemplate {
    /// `name` only needs to carry the right extension, e.g. `config.toml`.
    pub fn new(name: impl Into<String>, contents: impl Into<Cow<'static, [u8]>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

impl TemplateSource for InlineTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn open_stream(&self) -> Result<Box<dyn Read + '_>, Error> {
        Ok(Box::new(Cursor::new(self.contents.as_ref())))
    }
}
