//! Store rooted at a directory of the real filesystem.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{relative_path, Entry, EntryKind, Store, StoreFile, Walk};
use crate::constants::PERMISSION_MASK;

/// Filesystem store whose paths all resolve below `root`.
#[derive(Debug, Clone)]
pub struct OsStore {
    root: PathBuf,
}

impl OsStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(self.root.join(relative_path(path)?))
    }
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & PERMISSION_MASK
}

#[cfg(not(unix))]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    use crate::constants::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
    let mode = if metadata.is_dir() { DEFAULT_DIR_MODE } else { DEFAULT_FILE_MODE };
    if metadata.permissions().readonly() {
        mode & 0o555
    } else {
        mode
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & PERMISSION_MASK))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

impl Store for OsStore {
    fn walk(&self) -> Walk<'_> {
        let entries = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .map(move |entry| -> io::Result<Entry> {
                let entry = entry?;
                let path = entry
                    .path()
                    .strip_prefix(&self.root)
                    .map_err(io::Error::other)?
                    .to_path_buf();
                let metadata = entry.metadata()?;
                let kind = if entry.file_type().is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };
                Ok(Entry { path, kind, mode: mode_of(&metadata) })
            });
        Box::new(entries)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path)?)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(self.resolve(path)?)?))
    }

    fn create(&self, path: &Path, mode: u32) -> io::Result<Box<dyn StoreFile + '_>> {
        let target = self.resolve(path)?;
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode & PERMISSION_MASK);
        }
        let file = options.open(&target)?;
        // The open mode only applies to new files and is subject to the umask.
        set_mode(&target, mode)?;
        Ok(Box::new(OsFile { file }))
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let target = self.resolve(path)?;
        if !target.is_dir() {
            fs::create_dir_all(&target)?;
        }
        set_mode(&target, mode)
    }
}

struct OsFile {
    file: File,
}

impl Write for OsFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl StoreFile for OsFile {
    /// Syncs the file so write-back errors surface here instead of being lost
    /// when the descriptor is dropped.
    fn close(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }
}
