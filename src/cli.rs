//! Command-line interface implementation for tmpltree.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for tmpltree.
#[derive(Parser, Debug)]
#[command(author, version, about = "tmpltree: copy a directory tree, rendering .tmpl files", long_about = None)]
pub struct Args {
    /// Directory to copy from
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Directory where the rendered tree will be created
    #[arg(value_name = "DEST")]
    pub output_dir: PathBuf,

    /// JSON or YAML file holding the template context
    #[arg(short, long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Read the template context from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Set a context value, overriding the context file. Can be repeated.
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Render into the output directory even if it already exists
    #[arg(short, long)]
    pub force: bool,

    /// Render missing context values as empty strings instead of failing
    #[arg(long)]
    pub allow_undefined: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
