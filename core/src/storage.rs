//! Text storage layer for stage-to-stage materialization.
//!
//! Every stage boundary is a plain line-oriented text file. Writers always
//! replace the previous contents of their output location, which is what
//! makes reruns idempotent.

use listenomics_common::{Error, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Read a text file into its lines.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::io_error_with_source(format!("failed to read {}", path.display()), e)
    })?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Replace the contents of `path` with the given lines, creating parent
/// directories as needed.
pub fn overwrite_lines<P, I>(path: P, lines: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = String>,
{
    let path = path.as_ref();
    let mut writer = create_writer(path)?;
    for line in lines {
        writeln!(writer, "{line}").map_err(|e| {
            Error::io_error_with_source(format!("failed to write {}", path.display()), e)
        })?;
    }
    writer.flush().map_err(|e| {
        Error::io_error_with_source(format!("failed to flush {}", path.display()), e)
    })
}

/// Replace the contents of `path` with a pre-rendered string.
pub fn overwrite_string<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create_writer(path)?;
    writer.write_all(content.as_bytes()).map_err(|e| {
        Error::io_error_with_source(format!("failed to write {}", path.display()), e)
    })?;
    writer.flush().map_err(|e| {
        Error::io_error_with_source(format!("failed to flush {}", path.display()), e)
    })
}

/// Remove a directory and all its contents if it exists.
pub fn remove_dir_if_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| {
            Error::io_error_with_source(format!("failed to remove {}", path.display()), e)
        })?;
    }
    Ok(())
}

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::io_error_with_source(
                    format!("failed to create directory {}", parent.display()),
                    e,
                )
            })?;
        }
    }
    let file = File::create(path).map_err(|e| {
        Error::io_error_with_source(format!("failed to create {}", path.display()), e)
    })?;
    Ok(BufWriter::new(file))
}
