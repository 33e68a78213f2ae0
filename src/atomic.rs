use std::{
    fs::{self, File, OpenOptions},
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use tempfile::NamedTempFile;

struct FileLock {
    _file: File,
}

impl FileLock {
    fn lock(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        // Blocks until exclusive lock is acquired
        file.lock_exclusive()?;

        Ok(Self { _file: file })
    }
}

/// A document file that is only ever replaced whole.
///
/// Writes go to a temporary file next to the target which is synced and then
/// renamed over it, so readers see either the old or the new contents.
pub struct AtomicFile {
    path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file, or `None` if it does not exist.
    pub fn read(&self) -> io::Result<Option<String>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };

        file.lock_shared()?;

        let mut buf = String::new();
        (&file).read_to_string(&mut buf)?;

        Ok(Some(buf))
    }

    pub fn write(&self, contents: &str) -> io::Result<()> {
        self.write_from(contents.as_bytes())
    }

    /// Streams `source` into the file. If reading `source` fails the target
    /// is left as it was, and is not created if it did not exist.
    pub fn write_from(&self, source: impl Read) -> io::Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;

        let existed = self.path.exists();
        let _lock = FileLock::lock(&self.path)?;

        let result = self.replace_with(dir, source);
        if result.is_err() && !existed {
            // The lock created an empty file
            let _ = fs::remove_file(&self.path);
        }

        result
    }

    fn replace_with(&self, dir: &Path, mut source: impl Read) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(dir)?;

        io::copy(&mut source, &mut tmp)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path)?;

        Ok(())
    }
}
