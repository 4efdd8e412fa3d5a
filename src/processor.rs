//! Core tree rendering.
//! Walks a source store and mirrors it into a destination store, rendering
//! every `.tmpl` file through the template engine on the way.

use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;

use crate::{
    constants::TEMPLATE_SUFFIX,
    error::{Error, Result},
    renderer::MiniJinjaRenderer,
    store::{Entry, OsStore, Store, StoreFile},
};

/// Returns the rendered file name for a template file name, or `None` when
/// `file_name` is not a template.
///
/// Works on the raw file name, so names that aren't valid UTF-8 are handled
/// too. Only one trailing suffix is removed, and names that would be left
/// empty (`.tmpl`) or pointing at the directory itself (`..tmpl`) are not
/// templates.
pub fn template_target_name(file_name: &OsStr) -> Option<&OsStr> {
    let name = Path::new(file_name);
    if name.extension()? != TEMPLATE_SUFFIX.trim_start_matches('.') {
        return None;
    }
    name.file_stem().filter(|stem| !stem.is_empty() && *stem != ".")
}

/// Returns the destination path of a template entry, or `None` when `path`
/// doesn't point to a template.
pub fn template_target_path(path: &Path) -> Option<PathBuf> {
    template_target_name(path.file_name()?).map(|name| path.with_file_name(name))
}

/// Destination handle that is closed on every exit path.
///
/// Close failures are logged and swallowed so they never hide the error that
/// caused the early return.
struct ScopedFile<'a> {
    path: &'a Path,
    file: Box<dyn StoreFile + 'a>,
}

impl Write for ScopedFile<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Drop for ScopedFile<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.file.close() {
            warn!("Failed to close file '{}': {}", self.path.display(), e);
        }
    }
}

/// Mirrors a source tree into a destination, rendering templates with `engine`.
pub struct TreeRenderer<'a> {
    engine: &'a MiniJinjaRenderer,
}

impl<'a> TreeRenderer<'a> {
    /// Creates a renderer that compiles every template with `engine`.
    pub fn new(engine: &'a MiniJinjaRenderer) -> Self {
        Self { engine }
    }

    /// Copies the tree at `from` into `to`, rendering `.tmpl` files against
    /// `context` and stripping the suffix from their names.
    ///
    /// Both directories are opened as rooted stores. `to` is created if it
    /// doesn't exist yet.
    pub fn render<P, Q, S>(&self, from: P, to: Q, context: &S) -> Result<()>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        S: Serialize + ?Sized,
    {
        let to = to.as_ref();
        if !to.is_dir() {
            std::fs::create_dir_all(to).map_err(|source| Error::DirectoryCreateError {
                path: to.to_path_buf(),
                source,
            })?;
        }
        self.render_store(&OsStore::new(from), &OsStore::new(to), context)
    }

    /// Same as [`TreeRenderer::render`] but works on arbitrary stores.
    ///
    /// The first failure aborts the whole walk. Anything written before that
    /// point stays in `to`.
    pub fn render_store<F, T, S>(&self, from: &F, to: &T, context: &S) -> Result<()>
    where
        F: Store + ?Sized,
        T: Store + ?Sized,
        S: Serialize + ?Sized,
    {
        debug!("Processing template tree...");
        for entry in from.walk() {
            let entry = entry.map_err(Error::WalkError)?;
            if entry.is_root() {
                continue;
            }
            self.process(from, to, &entry, context)?;
        }
        Ok(())
    }

    fn process<F, T, S>(&self, from: &F, to: &T, entry: &Entry, context: &S) -> Result<()>
    where
        F: Store + ?Sized,
        T: Store + ?Sized,
        S: Serialize + ?Sized,
    {
        if entry.is_dir() {
            debug!("Creating directory: {}", entry.path.display());
            return to.create_dir_all(&entry.path, entry.mode).map_err(|source| {
                Error::DirectoryCreateError { path: entry.path.clone(), source }
            });
        }

        match template_target_path(&entry.path) {
            Some(target) => self.render_file(from, to, entry, &target, context),
            None => copy_file(from, to, entry),
        }
    }

    fn render_file<F, T, S>(
        &self,
        from: &F,
        to: &T,
        entry: &Entry,
        target: &Path,
        context: &S,
    ) -> Result<()>
    where
        F: Store + ?Sized,
        T: Store + ?Sized,
        S: Serialize + ?Sized,
    {
        let source = &entry.path;
        debug!("Writing file: {} -> {}", source.display(), target.display());

        let raw = from
            .read(source)
            .and_then(|raw| {
                String::from_utf8(raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            })
            .map_err(|e| Error::FileReadError { path: source.clone(), source: e })?;

        let template = self
            .engine
            .compile(&source.to_string_lossy(), &raw)
            .map_err(|e| Error::TemplateParseError { path: source.clone(), source: e })?;

        let file = to.create(target, entry.mode).map_err(|e| Error::FileCreateError {
            path: target.to_path_buf(),
            source: e,
        })?;
        let mut out = ScopedFile { path: target, file };

        template
            .execute(context, &mut out)
            .map_err(|e| Error::TemplateExecError { path: source.clone(), source: e })
    }
}

fn copy_file<F, T>(from: &F, to: &T, entry: &Entry) -> Result<()>
where
    F: Store + ?Sized,
    T: Store + ?Sized,
{
    let path = &entry.path;
    debug!("Copying file: {}", path.display());

    let file = to
        .create(path, entry.mode)
        .map_err(|e| Error::FileCreateError { path: path.clone(), source: e })?;
    let mut out = ScopedFile { path, file };

    let mut input = from
        .open(path)
        .map_err(|e| Error::FileCopyError { path: path.clone(), source: e })?;

    io::copy(&mut input, &mut out)
        .map(|_| ())
        .map_err(|e| Error::FileCopyError { path: path.clone(), source: e })
}

/// Renders the tree at `from` into `to` with the default engine.
pub fn render<P, Q, S>(from: P, to: Q, context: &S) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    S: Serialize + ?Sized,
{
    let engine = MiniJinjaRenderer::new();
    TreeRenderer::new(&engine).render(from, to, context)
}

/// Renders the store `from` into the store `to` with the default engine.
pub fn render_store<F, T, S>(from: &F, to: &T, context: &S) -> Result<()>
where
    F: Store + ?Sized,
    T: Store + ?Sized,
    S: Serialize + ?Sized,
{
    let engine = MiniJinjaRenderer::new();
    TreeRenderer::new(&engine).render_store(from, to, context)
}
