//! Command-line interface module.

mod args;
pub mod render;
pub mod watch;

pub use args::{Cli, Commands, RenderArgs};

use anyhow::{Context, Result};
use docpress::record::Renderable;
use std::{fs, path::Path, sync::Arc};

/// Read and deserialize the record named on the command line.
pub fn load_record(args: &RenderArgs) -> Result<Arc<dyn Renderable>> {
    let text = fs::read_to_string(&args.record)
        .with_context(|| format!("Failed to read record `{}`", args.record.display()))?;
    args.shape
        .from_json(&text)
        .with_context(|| format!("Invalid record `{}`", args.record.display()))
}

/// Write `bytes` to `path`, creating parent directories.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create `{}`", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write `{}`", path.display()))
}
