//! Hierarchical stores a tree can be rendered from and into.
//!
//! The renderer only talks to the [`Store`] trait, so the same tree can be
//! read from disk and written into memory (or the other way round).

use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

pub mod memory;
pub mod os;

pub use memory::MemoryStore;
pub use os::OsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// A single entry visited while walking a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path relative to the store root. Empty for the root itself.
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Permission bits, already masked with [`crate::constants::PERMISSION_MASK`].
    pub mode: u32,
}

impl Entry {
    pub fn is_root(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Depth-first, pre-order sequence of entries, starting with the root.
pub type Walk<'a> = Box<dyn Iterator<Item = io::Result<Entry>> + 'a>;

/// A writable file handle obtained from [`Store::create`].
pub trait StoreFile: Write {
    /// Releases the handle, reporting anything that went wrong while doing so.
    fn close(&mut self) -> io::Result<()>;
}

/// Storage capability required by the tree renderer.
///
/// All paths are relative to the root of the store.
pub trait Store {
    /// Walks every entry of the store, parents before their children.
    fn walk(&self) -> Walk<'_>;

    /// Reads the whole content of the file at `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Opens the file at `path` for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;

    /// Opens `path` read-write, creating it if missing and truncating it
    /// otherwise. The file ends up with permission bits `mode`.
    fn create(&self, path: &Path, mode: u32) -> io::Result<Box<dyn StoreFile + '_>>;

    /// Creates `path` and all missing parents. An existing directory is fine.
    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;
}

/// Normalizes a store-relative path, rejecting anything that would leave the root.
pub(crate) fn relative_path(path: &Path) -> io::Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("path '{}' escapes the store root", path.display()),
                ));
            }
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path(Path::new("a/./b")).unwrap(), PathBuf::from("a/b"));
        assert_eq!(relative_path(Path::new("")).unwrap(), PathBuf::new());
        assert_eq!(
            relative_path(Path::new("../a")).unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
        assert!(relative_path(Path::new("/etc/passwd")).is_err());
    }

    #[test]
    fn test_entry_root() {
        let root = Entry { path: PathBuf::new(), kind: EntryKind::Directory, mode: 0o755 };
        assert!(root.is_root());
        assert!(root.is_dir());

        let file = Entry { path: PathBuf::from("a.txt"), kind: EntryKind::File, mode: 0o644 };
        assert!(!file.is_root());
        assert!(!file.is_dir());
    }
}
