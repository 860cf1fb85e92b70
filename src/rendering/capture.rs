//! Capturing the current visual state as a [`RasterSnapshot`].

use super::{RasterSnapshot, WHITE};
use crate::{Error, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
#[cfg(feature = "png")]
use std::path::PathBuf;
use std::time::Duration;

/// Options passed to every capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Upper bound on a single capture, in milliseconds
    pub timeout_ms: u64,
    /// Colour transparent regions are flattened onto
    pub background: [u8; 3],
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            background: WHITE,
        }
    }
}

/// Something that can produce a raster image of the current visual state.
pub trait SnapshotSource: Send + Sync {
    fn capture<'a>(&'a self, options: &'a CaptureOptions) -> BoxFuture<'a, Result<RasterSnapshot>>;
}

/// Run a capture, failing with [`Error::Timeout`] once `options.timeout_ms`
/// elapses.
pub async fn capture_with_timeout(
    source: &dyn SnapshotSource,
    options: &CaptureOptions,
) -> Result<RasterSnapshot> {
    let limit = Duration::from_millis(options.timeout_ms);
    match tokio::time::timeout(limit, source.capture(options)).await {
        Ok(res) => res,
        Err(_) => Err(Error::Timeout(options.timeout_ms)),
    }
}

/// A source that always yields the same, already captured snapshot.
#[derive(Debug, Clone)]
pub struct StaticSnapshot {
    snapshot: RasterSnapshot,
}

impl StaticSnapshot {
    pub fn new(snapshot: RasterSnapshot) -> Self {
        Self { snapshot }
    }
}

impl SnapshotSource for StaticSnapshot {
    fn capture<'a>(&'a self, _options: &'a CaptureOptions) -> BoxFuture<'a, Result<RasterSnapshot>> {
        let snapshot = self.snapshot.clone();
        async move { Ok(snapshot) }.boxed()
    }
}

/// Reads a PNG screenshot from disk at capture time.
#[cfg(feature = "png")]
#[derive(Debug, Clone)]
pub struct PngFileSource {
    path: PathBuf,
}

#[cfg(feature = "png")]
impl PngFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(feature = "png")]
impl SnapshotSource for PngFileSource {
    fn capture<'a>(&'a self, options: &'a CaptureOptions) -> BoxFuture<'a, Result<RasterSnapshot>> {
        async move {
            let bytes = tokio::fs::read(&self.path)
                .await
                .map_err(|e| Error::CaptureError(format!("{}: {}", self.path.display(), e)))?;
            RasterSnapshot::from_png(&bytes, options.background)
        }
        .boxed()
    }
}
