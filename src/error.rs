//! Error handling for tmpltree.
//! Every failure of a render carries the path it happened on together with the
//! underlying cause.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The source store could not be listed.
    #[error("Error received from file walk. Original error: {0}")]
    WalkError(#[source] io::Error),

    #[error("Failed to create destination directory '{}'. Original error: {source}", .path.display())]
    DirectoryCreateError { path: PathBuf, source: io::Error },

    #[error("Failed to read template '{}'. Original error: {source}", .path.display())]
    FileReadError { path: PathBuf, source: io::Error },

    #[error("Failed to parse template '{}'. Original error: {source}", .path.display())]
    TemplateParseError { path: PathBuf, source: minijinja::Error },

    #[error("Failed to create destination file '{}'. Original error: {source}", .path.display())]
    FileCreateError { path: PathBuf, source: io::Error },

    #[error("Failed to execute template '{}'. Original error: {source}", .path.display())]
    TemplateExecError { path: PathBuf, source: minijinja::Error },

    /// Opening the source file or copying its bytes failed.
    #[error("Failed to copy file '{}'. Original error: {source}", .path.display())]
    FileCopyError { path: PathBuf, source: io::Error },

    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// The template context could not be built.
    #[error("Context error: {0}.")]
    ContextError(String),

    #[error("Cannot proceed: output directory '{output_dir}' already exists. Use --force to overwrite it.")]
    OutputDirectoryExistsError { output_dir: String },
}

impl Error {
    /// Path of the entry the render failed on, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::DirectoryCreateError { path, .. }
            | Error::FileReadError { path, .. }
            | Error::TemplateParseError { path, .. }
            | Error::FileCreateError { path, .. }
            | Error::TemplateExecError { path, .. }
            | Error::FileCopyError { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for Results with tmpltree's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::IoError(_) => (),
            _ => panic!("Expected IoError variant"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = Error::ContextError("invalid context".to_string());
        assert_eq!(err.to_string(), "Context error: invalid context.");

        let err = Error::FileCreateError {
            path: PathBuf::from("dir/file.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to create destination file 'dir/file.txt'. Original error: denied"
        );
    }

    #[test]
    fn test_error_path() {
        let err = Error::FileCopyError {
            path: PathBuf::from("a.bin"),
            source: io::Error::other("broken"),
        };
        assert_eq!(err.path(), Some(Path::new("a.bin")));

        let err = Error::WalkError(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.path(), None);
    }
}
