//! Simulation result export
//!
//! Turns the outcome of a completed simulation run into downloadable
//! artifacts: the input parameters as JSON, the deterministic trajectory as
//! tab-separated text, both together in one compressed archive, or a
//! paginated PDF of a captured snapshot of the current screen.
//!
//! # Features
//!
//! - **Typed outcomes**: every export reports `Delivered`, `Skipped` or
//!   `Failed` instead of only logging
//! - **Pluggable collaborators**: capture sources, trajectory serializers,
//!   capability probes and delivery sinks are traits
//! - **Deterministic artifacts**: identical input gives byte-identical files
//!
//! # Example
//!
//! ```no_run
//! use simexport::{AlgorithmResult, DirectorySink, ExportConfig, Exporter};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let result: Option<AlgorithmResult> =
//!     serde_json::from_str(&std::fs::read_to_string("result.json")?)?;
//!
//! let exporter = Exporter::new(ExportConfig::default(), DirectorySink::new("out"));
//! let outcome = exporter.export_archive(result.as_ref()).await?;
//! if let Some(report) = outcome.report() {
//!     println!("{} ({} bytes)", report.file_name, report.size);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod archive;
pub mod delivery;
pub mod export;
pub mod probe;
pub mod rendering;
pub mod result;
pub mod serialize;

pub use delivery::{Artifact, ArtifactKind, DeliverySink, DirectorySink, MemorySink};
pub use export::{Diagnostic, ExportOutcome, ExportReport, Exporter};
pub use probe::{is_binary_buffer_supported, BufferProbe, RuntimeProbe};
pub use rendering::capture::{CaptureOptions, SnapshotSource, StaticSnapshot};
pub use rendering::paginate::{BoundaryPolicy, Orientation, PageLayout};
pub use rendering::pdf::{PdfRenderer, RendererConfig};
pub use rendering::RasterSnapshot;
pub use result::{AlgorithmResult, ResultShape, Trajectory, TrajectoryPoint};
pub use serialize::{TrajectorySerializer, TsvTrajectorySerializer};

/// Configuration for the exporter
///
/// The defaults match a browser screenshot export: a 30 second bound on
/// capture, transparent regions flattened onto white, and A4 portrait pages.
///
/// # Examples
///
/// ```
/// let cfg = simexport::ExportConfig::default();
/// assert_eq!(cfg.capture.timeout_ms, 30000);
/// assert_eq!(cfg.layout.page_size_mm(), (210.0, 297.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    /// Snapshot capture settings
    pub capture: CaptureOptions,
    /// Destination page geometry for document exports
    pub layout: PageLayout,
}
