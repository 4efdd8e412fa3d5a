//! Common constants used throughout tmpltree.

/// Suffix marking a file as a template. Stripped from the rendered file name.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// Permission bits carried from source to destination.
pub const PERMISSION_MASK: u32 = 0o777;

/// Mode used for directories a store creates implicitly.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Mode used for files when the platform doesn't expose permission bits.
pub const DEFAULT_FILE_MODE: u32 = 0o644;
