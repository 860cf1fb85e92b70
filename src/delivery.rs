//! Finished artifacts and the sinks that receive them.
//!
//! File names are stable across versions: downstream tools look for these
//! exact names, both on disk and inside the archive.

use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub const PARAMS_FILE_NAME: &str = "covid.params.json";
pub const RESULTS_FILE_NAME: &str = "covid.results.deterministic.tsv";
pub const ARCHIVE_FILE_NAME: &str = "covid.params.results.zip";
pub const DOCUMENT_FILE_NAME: &str = "covid_scenarios.pdf";

/// The kinds of artifact the exporter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Params,
    Results,
    Archive,
    Document,
}

impl ArtifactKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Params => PARAMS_FILE_NAME,
            ArtifactKind::Results => RESULTS_FILE_NAME,
            ArtifactKind::Archive => ARCHIVE_FILE_NAME,
            ArtifactKind::Document => DOCUMENT_FILE_NAME,
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ArtifactKind::Params => "application/json",
            ArtifactKind::Results => "text/tab-separated-values",
            ArtifactKind::Archive => "application/zip",
            ArtifactKind::Document => "application/pdf",
        }
    }
}

/// One exported unit of content, ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub data: Vec<u8>,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, data: Vec<u8>) -> Self {
        Self { kind, data }
    }

    pub fn text(kind: ArtifactKind, content: String) -> Self {
        Self::new(kind, content.into_bytes())
    }

    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Hex-encoded SHA-256 of the artifact bytes
    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.data))
    }
}

/// Receives finished artifacts (a download, a file write, an upload...).
pub trait DeliverySink: Send + Sync {
    fn deliver(&self, artifact: &Artifact) -> Result<()>;
}

/// Writes each artifact under its fixed file name in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, artifact: &Artifact) -> PathBuf {
        self.dir.join(artifact.file_name())
    }
}

impl DeliverySink for DirectorySink {
    fn deliver(&self, artifact: &Artifact) -> Result<()> {
        let target = self.path_for(artifact);
        let write = || -> std::io::Result<()> {
            fs::create_dir_all(&self.dir)?;
            // Write atomically: temp file first, then rename over the target
            let temp = self.dir.join(format!("{}.tmp", artifact.file_name()));
            let mut file = File::create(&temp)?;
            file.write_all(&artifact.data)?;
            file.flush()?;
            drop(file);
            fs::rename(&temp, &target)
        };
        write().map_err(|e| Error::DeliveryError(format!("{}: {}", target.display(), e)))?;
        log::debug!("wrote {} bytes to {}", artifact.len(), target.display());
        Ok(())
    }
}

/// Keeps delivered artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Artifact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far, in delivery order
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<Artifact> {
        self.artifacts().into_iter().rev().find(|a| a.kind == kind)
    }
}

impl DeliverySink for MemorySink {
    fn deliver(&self, artifact: &Artifact) -> Result<()> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(artifact.clone());
        Ok(())
    }
}

impl<S: DeliverySink + ?Sized> DeliverySink for std::sync::Arc<S> {
    fn deliver(&self, artifact: &Artifact) -> Result<()> {
        (**self).deliver(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_fixed() {
        assert_eq!(ArtifactKind::Params.file_name(), "covid.params.json");
        assert_eq!(
            ArtifactKind::Results.file_name(),
            "covid.results.deterministic.tsv"
        );
        assert_eq!(ArtifactKind::Archive.file_name(), "covid.params.results.zip");
        assert_eq!(ArtifactKind::Document.file_name(), "covid_scenarios.pdf");
        assert_eq!(ArtifactKind::Archive.media_type(), "application/zip");
    }

    #[test]
    fn digest_is_sha256_hex() {
        let a = Artifact::text(ArtifactKind::Params, String::new());
        assert_eq!(
            a.sha256_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn directory_sink_writes_under_fixed_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"));
        let artifact = Artifact::text(ArtifactKind::Results, "time\n0\n".to_string());
        sink.deliver(&artifact).unwrap();

        let written = fs::read(dir.path().join("out").join(RESULTS_FILE_NAME)).unwrap();
        assert_eq!(written, b"time\n0\n");
        assert!(!dir
            .path()
            .join("out")
            .join(format!("{}.tmp", RESULTS_FILE_NAME))
            .exists());
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.deliver(&Artifact::text(ArtifactKind::Params, "{}".into()))
            .unwrap();
        sink.deliver(&Artifact::new(ArtifactKind::Archive, vec![1, 2]))
            .unwrap();
        let kinds: Vec<_> = sink.artifacts().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ArtifactKind::Params, ArtifactKind::Archive]);
        assert_eq!(sink.get(ArtifactKind::Archive).unwrap().data, vec![1, 2]);
    }
}
