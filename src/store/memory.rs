//! In-memory store, mostly useful for tests and dry runs.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use super::{relative_path, Entry, EntryKind, Store, StoreFile, Walk};
use crate::constants::{DEFAULT_DIR_MODE, PERMISSION_MASK};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Directory { mode: u32 },
    File { mode: u32, content: Vec<u8> },
}

impl Node {
    fn entry(&self, path: &Path) -> Entry {
        match self {
            Node::Directory { mode } => {
                Entry { path: path.to_path_buf(), kind: EntryKind::Directory, mode: *mode }
            }
            Node::File { mode, .. } => {
                Entry { path: path.to_path_buf(), kind: EntryKind::File, mode: *mode }
            }
        }
    }
}

/// A tree of directories and files kept in memory.
///
/// Entries are ordered by path, so walking yields parents before children and
/// siblings in name order. Not meant to be shared between threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("'{}' does not exist", path.display()))
}

fn is_a_directory(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, format!("'{}' is a directory", path.display()))
}

fn not_a_directory(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("'{}' exists and is not a directory", path.display()),
    )
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory (and any missing parents) with permission bits `mode`.
    pub fn insert_dir<P: AsRef<Path>>(&self, path: P, mode: u32) -> io::Result<()> {
        self.create_dir_all(path.as_ref(), mode)
    }

    /// Adds a file, creating missing parent directories with the default mode.
    pub fn insert_file<P: AsRef<Path>, C: AsRef<[u8]>>(
        &self,
        path: P,
        content: C,
        mode: u32,
    ) -> io::Result<()> {
        let path = relative_path(path.as_ref())?;
        if let Some(parent) = path.parent() {
            if !self.is_dir(parent) {
                self.create_dir_all(parent, DEFAULT_DIR_MODE)?;
            }
        }
        let mut file = self.create(&path, mode)?;
        file.write_all(content.as_ref())?;
        file.close()
    }

    pub fn contains<P: AsRef<Path>>(&self, path: P) -> bool {
        match relative_path(path.as_ref()) {
            Ok(path) => path.as_os_str().is_empty() || self.nodes.borrow().contains_key(&path),
            Err(_) => false,
        }
    }

    pub fn is_dir<P: AsRef<Path>>(&self, path: P) -> bool {
        match relative_path(path.as_ref()) {
            Ok(path) if path.as_os_str().is_empty() => true,
            Ok(path) => matches!(self.nodes.borrow().get(&path), Some(Node::Directory { .. })),
            Err(_) => false,
        }
    }

    /// Permission bits of the entry at `path`.
    pub fn mode<P: AsRef<Path>>(&self, path: P) -> Option<u32> {
        let path = relative_path(path.as_ref()).ok()?;
        self.nodes.borrow().get(&path).map(|node| match node {
            Node::Directory { mode } | Node::File { mode, .. } => *mode,
        })
    }

    pub fn read_to_string<P: AsRef<Path>>(&self, path: P) -> io::Result<String> {
        let content = self.read(path.as_ref())?;
        String::from_utf8(content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Every entry path, root excluded, in walk order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.nodes.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }
}

impl Store for MemoryStore {
    fn walk(&self) -> Walk<'_> {
        let root = Entry { path: PathBuf::new(), kind: EntryKind::Directory, mode: DEFAULT_DIR_MODE };
        // Snapshot so the store can be written to while the walk is in progress.
        let mut entries = vec![Ok(root)];
        entries.extend(self.nodes.borrow().iter().map(|(path, node)| Ok(node.entry(path))));
        Box::new(entries.into_iter())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let path = relative_path(path)?;
        match self.nodes.borrow().get(&path) {
            Some(Node::File { content, .. }) => Ok(content.clone()),
            Some(Node::Directory { .. }) => Err(is_a_directory(&path)),
            None if path.as_os_str().is_empty() => Err(is_a_directory(&path)),
            None => Err(not_found(&path)),
        }
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.read(path)?)))
    }

    fn create(&self, path: &Path, mode: u32) -> io::Result<Box<dyn StoreFile + '_>> {
        let path = relative_path(path)?;
        if path.as_os_str().is_empty() {
            return Err(is_a_directory(&path));
        }

        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            match nodes.get(parent) {
                Some(Node::Directory { .. }) => {}
                Some(Node::File { .. }) => return Err(not_a_directory(parent)),
                None => return Err(not_found(parent)),
            }
        }
        if let Some(Node::Directory { .. }) = nodes.get(&path) {
            return Err(is_a_directory(&path));
        }
        nodes.insert(
            path.clone(),
            Node::File { mode: mode & PERMISSION_MASK, content: Vec::new() },
        );

        Ok(Box::new(MemoryFile { store: self, path }))
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let path = relative_path(path)?;
        let mode = mode & PERMISSION_MASK;
        let mut nodes = self.nodes.borrow_mut();
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            match nodes.get(&current) {
                Some(Node::Directory { .. }) => {}
                Some(Node::File { .. }) => return Err(not_a_directory(&current)),
                None => {
                    nodes.insert(current.clone(), Node::Directory { mode });
                }
            }
        }
        if let Some(Node::Directory { mode: existing }) = nodes.get_mut(&path) {
            *existing = mode;
        }
        Ok(())
    }
}

/// Handle writing straight into the owning store.
struct MemoryFile<'a> {
    store: &'a MemoryStore,
    path: PathBuf,
}

impl Write for MemoryFile<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.store.nodes.borrow_mut().get_mut(&self.path) {
            Some(Node::File { content, .. }) => {
                content.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(not_found(&self.path)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl StoreFile for MemoryFile<'_> {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}
