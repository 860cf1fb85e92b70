//! Export entry points.
//!
//! Each entry point composes the probe, the result classification, the
//! serializers, the bundler and the paginator, and reports what happened as
//! an [`ExportOutcome`]. Only a missing result is returned as an `Err`; every
//! other problem is logged and reported in the outcome so callers can show
//! their own feedback.

use crate::archive::{self, ArchiveEntry};
use crate::delivery::{Artifact, ArtifactKind, DeliverySink};
use crate::probe::{BufferProbe, RuntimeProbe};
use crate::rendering::capture::{capture_with_timeout, SnapshotSource};
use crate::rendering::paginate::paginate;
use crate::rendering::pdf::PdfRenderer;
use crate::result::{classify, AlgorithmResult, ResultShape};
use crate::serialize::{serialize_params, TrajectorySerializer, TsvTrajectorySerializer};
use crate::{Error, ExportConfig, Result};
use std::fmt;
use std::sync::Arc;

/// A recoverable condition that stopped or trimmed an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// The field backing this artifact was not set
    MissingArtifact(ArtifactKind),
    /// In-memory binary buffers are not available
    UnsupportedEnvironment,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingArtifact(ArtifactKind::Params) => write!(
                f,
                "the params of the simulation cannot be exported because they are null"
            ),
            Diagnostic::MissingArtifact(ArtifactKind::Results) => write!(
                f,
                "the results of the simulation cannot be exported because they are nondeterministic"
            ),
            Diagnostic::MissingArtifact(kind) => {
                write!(f, "{} cannot be exported: nothing to export", kind.file_name())
            }
            Diagnostic::UnsupportedEnvironment => write!(
                f,
                "export is not supported in this environment: in-memory binary buffers are unavailable"
            ),
        }
    }
}

/// What was delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub kind: ArtifactKind,
    pub file_name: &'static str,
    pub size: usize,
    pub sha256: String,
    /// Archive entry names, in archive order (empty for single files)
    pub entries: Vec<String>,
    /// Number of pages, for documents
    pub page_count: Option<usize>,
    /// Conditions noticed along the way that did not stop the export
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of one export call.
#[derive(Debug)]
pub enum ExportOutcome {
    Delivered(ExportReport),
    Skipped(Diagnostic),
    Failed(Error),
}

impl ExportOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ExportOutcome::Delivered(_))
    }

    pub fn report(&self) -> Option<&ExportReport> {
        match self {
            ExportOutcome::Delivered(report) => Some(report),
            _ => None,
        }
    }

    pub fn skipped(&self) -> Option<Diagnostic> {
        match self {
            ExportOutcome::Skipped(d) => Some(*d),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            ExportOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Runs exports against one delivery sink.
pub struct Exporter {
    config: ExportConfig,
    sink: Arc<dyn DeliverySink>,
    probe: Arc<dyn BufferProbe>,
    trajectory: Arc<dyn TrajectorySerializer>,
}

impl Exporter {
    pub fn new(config: ExportConfig, sink: impl DeliverySink + 'static) -> Self {
        Self {
            config,
            sink: Arc::new(sink),
            probe: Arc::new(RuntimeProbe),
            trajectory: Arc::new(TsvTrajectorySerializer),
        }
    }

    /// Replace the capability probe.
    pub fn with_probe(mut self, probe: impl BufferProbe + 'static) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    /// Replace the tabular trajectory serializer.
    pub fn with_trajectory_serializer(
        mut self,
        serializer: impl TrajectorySerializer + 'static,
    ) -> Self {
        self.trajectory = Arc::new(serializer);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Bundle every present field into one archive.
    ///
    /// Missing fields are left out of the archive and listed in the report's
    /// diagnostics. A result with neither field still yields an (empty)
    /// archive.
    pub async fn export_archive(&self, result: Option<&AlgorithmResult>) -> Result<ExportOutcome> {
        let shape = classify(result)?;
        if let Some(skipped) = self.check_environment() {
            return Ok(skipped);
        }

        if shape.is_empty() {
            log::error!("Error: the results, and params, of the simulation cannot be exported");
        }
        let diagnostics: Vec<Diagnostic> = shape
            .missing()
            .into_iter()
            .map(|kind| self.missing(kind))
            .collect();

        match self.build_archive(&shape).await {
            Ok((data, entries)) => Ok(self.deliver(
                Artifact::new(ArtifactKind::Archive, data),
                entries,
                None,
                diagnostics,
            )),
            Err(err) => Ok(self.failed(ArtifactKind::Archive, err)),
        }
    }

    /// Export the trajectory alone as tabular text.
    pub fn export_results(&self, result: Option<&AlgorithmResult>) -> Result<ExportOutcome> {
        let shape = classify(result)?;
        if let Some(skipped) = self.check_environment() {
            return Ok(skipped);
        }
        let Some(trajectory) = shape.deterministic() else {
            return Ok(ExportOutcome::Skipped(self.missing(ArtifactKind::Results)));
        };

        Ok(match self.trajectory.serialize(trajectory) {
            Ok(text) => self.deliver(
                Artifact::text(ArtifactKind::Results, text),
                Vec::new(),
                None,
                Vec::new(),
            ),
            Err(err) => self.failed(ArtifactKind::Results, err),
        })
    }

    /// Export the parameters alone as JSON.
    pub fn export_params(&self, result: Option<&AlgorithmResult>) -> Result<ExportOutcome> {
        let shape = classify(result)?;
        if let Some(skipped) = self.check_environment() {
            return Ok(skipped);
        }
        let Some(params) = shape.params() else {
            return Ok(ExportOutcome::Skipped(self.missing(ArtifactKind::Params)));
        };

        Ok(match serialize_params(params) {
            Ok(text) => self.deliver(
                Artifact::text(ArtifactKind::Params, text),
                Vec::new(),
                None,
                Vec::new(),
            ),
            Err(err) => self.failed(ArtifactKind::Params, err),
        })
    }

    /// Capture the visual state and deliver it as a paginated PDF.
    ///
    /// Independent of any result and of the buffer probe. Capture, timeout
    /// and rendering failures are logged and returned as
    /// [`ExportOutcome::Failed`]; no partial document is delivered.
    pub async fn export_document(
        &self,
        renderer: &PdfRenderer,
        source: &dyn SnapshotSource,
    ) -> ExportOutcome {
        let rendered = async {
            let snapshot = capture_with_timeout(source, &self.config.capture).await?;
            let document = paginate(&snapshot, &self.config.layout)?;
            let bytes = renderer.render(&document)?;
            Ok::<_, Error>((bytes, document.page_count()))
        }
        .await;

        match rendered {
            Ok((bytes, pages)) => self.deliver(
                Artifact::new(ArtifactKind::Document, bytes),
                Vec::new(),
                Some(pages),
                Vec::new(),
            ),
            Err(err) => self.failed(ArtifactKind::Document, err),
        }
    }

    async fn build_archive(&self, shape: &ResultShape<'_>) -> Result<(Vec<u8>, Vec<String>)> {
        let mut entries = Vec::new();
        if let Some(params) = shape.params() {
            entries.push(ArchiveEntry::new(
                ArtifactKind::Params.file_name(),
                serialize_params(params)?,
            ));
        }
        if let Some(trajectory) = shape.deterministic() {
            entries.push(ArchiveEntry::new(
                ArtifactKind::Results.file_name(),
                self.trajectory.serialize(trajectory)?,
            ));
        }

        let names = entries.iter().map(|e| e.name.clone()).collect();
        let data = archive::bundle(entries).await?;
        Ok((data, names))
    }

    fn check_environment(&self) -> Option<ExportOutcome> {
        if self.probe.is_supported() {
            return None;
        }
        let diagnostic = Diagnostic::UnsupportedEnvironment;
        log::error!("Error: {}", diagnostic);
        Some(ExportOutcome::Skipped(diagnostic))
    }

    fn missing(&self, kind: ArtifactKind) -> Diagnostic {
        let diagnostic = Diagnostic::MissingArtifact(kind);
        log::error!("Error: {}", diagnostic);
        diagnostic
    }

    fn failed(&self, kind: ArtifactKind, err: Error) -> ExportOutcome {
        log::error!("Error: export of {} failed: {}", kind.file_name(), err);
        ExportOutcome::Failed(err)
    }

    fn deliver(
        &self,
        artifact: Artifact,
        entries: Vec<String>,
        page_count: Option<usize>,
        diagnostics: Vec<Diagnostic>,
    ) -> ExportOutcome {
        if let Err(err) = self.sink.deliver(&artifact) {
            return self.failed(artifact.kind, err);
        }
        log::info!(
            "exported {} ({} bytes)",
            artifact.file_name(),
            artifact.len()
        );
        ExportOutcome::Delivered(ExportReport {
            kind: artifact.kind,
            file_name: artifact.file_name(),
            size: artifact.len(),
            sha256: artifact.sha256_hex(),
            entries,
            page_count,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::MemorySink;
    use crate::result::{Trajectory, TrajectoryPoint};
    use serde_json::json;

    struct RefusingSink;

    impl DeliverySink for RefusingSink {
        fn deliver(&self, _artifact: &Artifact) -> Result<()> {
            Err(Error::DeliveryError("disk full".to_string()))
        }
    }

    fn full_result() -> AlgorithmResult {
        AlgorithmResult::new(
            Some(json!({"population": 1000})),
            Some(Trajectory {
                columns: vec!["infectious".into()],
                points: vec![TrajectoryPoint {
                    time: 0.0,
                    values: vec![1.0],
                }],
            }),
        )
    }

    #[test]
    fn diagnostics_use_the_established_wording() {
        assert_eq!(
            Diagnostic::MissingArtifact(ArtifactKind::Params).to_string(),
            "the params of the simulation cannot be exported because they are null"
        );
        assert_eq!(
            Diagnostic::MissingArtifact(ArtifactKind::Results).to_string(),
            "the results of the simulation cannot be exported because they are nondeterministic"
        );
    }

    #[test]
    fn params_export_delivers_json() {
        let sink = Arc::new(MemorySink::new());
        let exporter = Exporter::new(ExportConfig::default(), sink.clone());
        let outcome = exporter.export_params(Some(&full_result())).unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.file_name, "covid.params.json");
        assert_eq!(
            sink.get(ArtifactKind::Params).unwrap().data,
            b"{\n  \"population\": 1000\n}".to_vec()
        );
    }

    #[test]
    fn sink_failure_is_reported_not_raised() {
        let exporter = Exporter::new(ExportConfig::default(), RefusingSink);
        let outcome = exporter.export_results(Some(&full_result())).unwrap();
        assert!(matches!(outcome.error(), Some(Error::DeliveryError(_))));
    }

    #[test]
    fn contract_check_precedes_the_probe() {
        let exporter = Exporter::new(ExportConfig::default(), MemorySink::new()).with_probe(|| false);
        assert!(exporter.export_params(None).unwrap_err().is_contract_violation());
    }
}
