//! tmpltree copies a directory tree into a destination, rendering every file
//! whose name ends in `.tmpl` as a template against a context value and
//! stripping the suffix from the rendered file name. Other files are copied
//! byte-for-byte, keeping their permission bits.

/// Command-line interface module for the tmpltree binary
pub mod cli;

/// Common constants
pub mod constants;

/// Template context loading from JSON/YAML documents and KEY=VALUE pairs
pub mod context;

/// Error types and handling
pub mod error;

/// Text functions available inside templates
pub mod functions;

/// Logger setup for the binary
pub mod logger;

/// Tree walking and rendering
pub mod processor;

/// MiniJinja template engine
pub mod renderer;

/// Storage backends the renderer reads from and writes to
pub mod store;

pub use error::{Error, Result};
pub use processor::{render, render_store, TreeRenderer};
