//! tmpltree's main application entry point.
//! Parses the command line, builds the template context and renders the tree.

use std::path::{Path, PathBuf};

use tmpltree::{
    cli::{get_args, Args},
    context::{build_context, load_context, read_context},
    error::{default_error_handler, Error, Result},
    logger::init_logger,
    processor::TreeRenderer,
    renderer::MiniJinjaRenderer,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Ensures the output directory is safe to write to.
///
/// # Errors
/// * Returns `Error::OutputDirectoryExistsError` if directory exists and force is false
fn get_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() && !force {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}

/// Main application logic execution.
///
/// # Flow
/// 1. Validates the output directory
/// 2. Builds the context from the context file, stdin and `--set` values
/// 3. Renders the source tree into the output directory
fn run(args: Args) -> Result<()> {
    let output_root = get_output_dir(&args.output_dir, args.force)?;

    let mut documents = Vec::new();
    if let Some(path) = &args.context {
        documents.push(load_context(path)?);
    }
    if args.stdin {
        documents.push(read_context(std::io::stdin().lock())?);
    }
    let context = build_context(documents, &args.set)?;

    let engine = if args.allow_undefined {
        MiniJinjaRenderer::new().lenient()
    } else {
        MiniJinjaRenderer::new()
    };

    TreeRenderer::new(&engine).render(&args.source, &output_root, &context)?;

    println!("Rendered '{}' into '{}'.", args.source.display(), output_root.display());
    Ok(())
}
