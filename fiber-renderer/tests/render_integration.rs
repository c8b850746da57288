//! Integration tests for offline rendering (fiber-renderer).
//!
//! Drives a real `CanvasHost` into a `PixmapSurface` and checks the raster
//! output and the exported files.

use fiber_core::{CanvasHost, HostConfig, ManualClock, QualityHandle, QualityTier, Viewport};
use fiber_renderer::{FrameExporter, PixmapSurface};

fn host(tier: QualityTier) -> CanvasHost<PixmapSurface, ManualClock> {
    let mut host = CanvasHost::new(
        HostConfig::default(),
        ManualClock::new(),
        QualityHandle::new(tier),
    );
    let surface = PixmapSurface::new(Viewport::new(600, 400)).expect("alloc");
    host.start(Some(surface), false).expect("start");
    host
}

fn lit_pixels(surface: &PixmapSurface) -> usize {
    surface
        .pixmap()
        .expect("pixmap")
        .pixels()
        .iter()
        .filter(|p| p.alpha() > 0 && p.red() > 0)
        .count()
}

#[test]
fn test_host_renders_fibers() {
    let mut host = host(QualityTier::High);
    for i in 0..10 {
        host.tick(f64::from(i) * 16.0);
    }
    let surface = host.surface().expect("surface");
    assert!(lit_pixels(surface) > 0);
}

#[test]
fn test_rendering_is_deterministic() {
    let render = || {
        let mut host = host(QualityTier::Medium);
        for i in 0..5 {
            host.tick(f64::from(i) * 16.0);
        }
        host.surface().expect("surface").encode_png().expect("png")
    };
    assert_eq!(render(), render());
}

#[test]
fn test_low_tier_draws_less() {
    let lit = |tier| {
        let mut host = host(tier);
        host.tick(0.0);
        lit_pixels(host.surface().expect("surface"))
    };
    assert!(lit(QualityTier::Low) < lit(QualityTier::High));
}

#[test]
fn test_export_sequence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut exporter = FrameExporter::new(dir.path(), 2).expect("exporter");
    let mut host = host(QualityTier::High);

    for i in 0..6u32 {
        let report = host.tick(f64::from(i) * 16.0).expect("running");
        let surface = host.surface().expect("surface");
        exporter.capture(report.frame - 1, surface).expect("capture");
    }

    assert_eq!(exporter.written().len(), 3);
    for path in exporter.written() {
        let bytes = std::fs::read(path).expect("read");
        assert_eq!(&bytes[..4], b"\x89PNG");
    }
}
