//! Zip bundles of named text artifacts.
//!
//! ## Archive layout
//!
//! ```text
//! covid.params.results.zip
//! ├── covid.params.json                  # present when params are set
//! └── covid.results.deterministic.tsv    # present when the trajectory is set
//! ```
//!
//! Entries are deflated and stamped with the zip epoch (1980-01-01 00:00) and
//! mode 0644, so the same entries always produce the same bytes. A bundle
//! with no entries is still a valid archive.

use crate::{Error, Result};
use std::collections::HashSet;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// One named file inside a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub contents: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Contents as UTF-8, if they are valid text
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }
}

/// Bundle entries into a compressed archive.
///
/// Inside a tokio runtime the work runs on the blocking thread pool. Under
/// any other executor it runs inline on the polling thread.
/// Compression and memory failures surface as [`Error::ArchiveError`].
pub async fn bundle(entries: Vec<ArchiveEntry>) -> Result<Vec<u8>> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle
            .spawn_blocking(move || bundle_blocking(&entries))
            .await
            .map_err(|e| Error::ArchiveError(format!("archive task failed: {}", e)))?,
        Err(_) => {
            log::debug!("no tokio runtime, bundling inline");
            bundle_blocking(&entries)
        }
    }
}

/// Synchronous form of [`bundle`].
pub fn bundle_blocking(entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    let mut seen = HashSet::new();
    for entry in entries {
        if entry.name.is_empty() {
            return Err(Error::ArchiveError("entry name is empty".to_string()));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(Error::ArchiveError(format!(
                "duplicate entry name: {}",
                entry.name
            )));
        }
    }

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in entries {
        writer
            .start_file(entry.name.as_str(), options)
            .map_err(|e| Error::ArchiveError(format!("{}: {}", entry.name, e)))?;
        writer
            .write_all(&entry.contents)
            .map_err(|e| Error::ArchiveError(format!("{}: {}", entry.name, e)))?;
    }

    let bytes = writer
        .finish()
        .map_err(|e| Error::ArchiveError(format!("zip finish: {}", e)))?
        .into_inner();
    log::debug!("bundled {} entries into {} bytes", entries.len(), bytes.len());
    Ok(bytes)
}

/// Read every regular file out of a bundle, in archive order.
pub fn read_archive(bytes: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::ArchiveError(format!("zip read: {}", e)))?;
    let mut out = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| Error::ArchiveError(format!("zip entry {}: {}", index, e)))?;
        if !file.is_file() {
            continue;
        }
        let name = file.name().to_string();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| Error::ArchiveError(format!("{}: {}", name, e)))?;
        out.push(ArchiveEntry { name, contents });
    }

    Ok(out)
}
