//! PNG frame sequence export.

use std::path::{Path, PathBuf};

use crate::error::RenderResult;
use crate::surface::PixmapSurface;

/// Writes selected frames of a [`PixmapSurface`] as numbered PNG files.
///
/// Files are named `frame-00000.png`, `frame-00001.png`, ... in capture
/// order, independent of which frame indices were selected.
#[derive(Debug)]
pub struct FrameExporter {
    dir: PathBuf,
    every: u64,
    written: Vec<PathBuf>,
}

impl FrameExporter {
    /// Create an exporter writing into `dir`, capturing every `every`-th
    /// frame. The directory is created if missing; `every` of zero is
    /// treated as one.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>, every: u64) -> RenderResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            every: every.max(1),
            written: Vec::new(),
        })
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Whether the zero-based `frame` index is selected.
    #[must_use]
    pub fn wants(&self, frame: u64) -> bool {
        frame % self.every == 0
    }

    /// Write `surface` if `frame` is selected.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn capture(&mut self, frame: u64, surface: &PixmapSurface) -> RenderResult<Option<&Path>> {
        if !self.wants(frame) {
            return Ok(None);
        }
        let path = self.dir.join(format!("frame-{:05}.png", self.written.len()));
        write_png(surface, &path)?;
        tracing::debug!(frame, path = %path.display(), "Frame exported");
        self.written.push(path);
        Ok(self.written.last().map(PathBuf::as_path))
    }
}

/// Encode `surface` and write it to `path`.
///
/// # Errors
///
/// Returns an error if the surface is empty, encoding fails or the write fails.
pub fn write_png(surface: &PixmapSurface, path: &Path) -> RenderResult<()> {
    let png = surface.encode_png()?;
    std::fs::write(path, png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fiber_core::Viewport;

    #[test]
    fn test_every_nth_frame() {
        let dir = tempfile::tempdir().expect("tempdir");
        let surface = PixmapSurface::new(Viewport::new(8, 8)).expect("alloc");
        let mut exporter = FrameExporter::new(dir.path().join("out"), 3).expect("exporter");

        for frame in 0..7 {
            exporter.capture(frame, &surface).expect("capture");
        }

        let names: Vec<String> = exporter
            .written()
            .iter()
            .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
            .collect();
        assert_eq!(names, ["frame-00000.png", "frame-00001.png", "frame-00002.png"]);
        assert!(exporter.written().iter().all(|p| p.exists()));
    }

    #[test]
    fn test_zero_interval_captures_all() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = FrameExporter::new(dir.path(), 0).expect("exporter");
        assert!((0..5).all(|f| exporter.wants(f)));
    }

    #[test]
    fn test_empty_surface_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let surface = PixmapSurface::new(Viewport::new(0, 0)).expect("empty");
        let mut exporter = FrameExporter::new(dir.path(), 1).expect("exporter");
        assert!(exporter.capture(0, &surface).is_err());
        assert!(exporter.written().is_empty());
    }
}
