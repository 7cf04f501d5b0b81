//! Rendering and persisting resolved options as a flag file.
//!
//! The file is a derived artifact: a comment header warning that it is
//! generated, one blank line, then one option per line. It is fully
//! regenerated on every start attempt.

use std::borrow::Cow;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::OptionSet;

/// Render `header`, a blank line, then the options joined by single newlines.
///
/// A header that does not end with a newline gets one, so the blank line is
/// always exactly one line. No newline follows the last option.
pub fn render(header: &str, options: &OptionSet) -> Vec<u8> {
    let mut content = String::with_capacity(header.len() + options.len() * 32);
    content.push_str(header);
    if !header.is_empty() && !header.ends_with('\n') {
        content.push('\n');
    }
    content.push('\n');
    content.push_str(&options.get_all().join("\n"));
    content.into_bytes()
}

/// Render and persist the options at `path`, replacing any previous content.
pub fn write(path: &Path, header: &str, options: &OptionSet) -> DomainResult<()> {
    let bytes = render(header, options);
    write_atomically(path, &bytes).map_err(|source| DomainError::Persistence {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), options = options.len(), "wrote options file");
    Ok(())
}

/// Writes option files with a fixed generated-file header.
#[derive(Debug, Clone)]
pub struct OptionsFileWriter {
    header: Cow<'static, str>,
}

impl OptionsFileWriter {
    /// Writer prepending `header` to every file.
    pub fn new(header: impl Into<Cow<'static, str>>) -> Self {
        Self { header: header.into() }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn render(&self, options: &OptionSet) -> Vec<u8> {
        render(&self.header, options)
    }

    pub fn render_to_string(&self, options: &OptionSet) -> String {
        String::from_utf8_lossy(&self.render(options)).into_owned()
    }

    pub fn write(&self, path: &Path, options: &OptionSet) -> DomainResult<()> {
        write(path, &self.header, options)
    }
}

/// Write to a uniquely named sibling temp file, fsync, then rename over `path`.
///
/// Readers see either the previous file or the complete new one. Concurrent
/// writers each get their own temp file; the last rename wins.
fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let prefix = temp_prefix_for(path)?;
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    // Dropped (and deleted) on any early return
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(parent)?;
    debug!(temp = %temp.path().display(), "writing options to temp file");
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    sync_dir(parent)
}

/// Fsync the directory so the rename itself is durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Hidden temp file prefix for `path`, e.g. `.jvm.options.`
fn temp_prefix_for(path: &Path) -> io::Result<OsString> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not name a file", path.display()),
        )
    })?;
    let mut prefix = OsString::from(".");
    prefix.push(file_name);
    prefix.push(".");
    Ok(prefix)
}
