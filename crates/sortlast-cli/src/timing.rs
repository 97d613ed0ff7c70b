//! YAML timing report.
//!
//! Per-phase wall-clock seconds, aggregated as the maximum over ranks
//! (the collective is only as fast as its slowest member), plus enough
//! run metadata to reproduce the measurement.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Wall-clock seconds one rank spent in each phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseSeconds {
    /// Rasterizing the local image.
    pub paint: f64,
    /// The composition collective.
    pub compose: f64,
    /// The gather collective.
    pub gather: f64,
}

impl PhaseSeconds {
    /// Componentwise maximum, for aggregating over ranks.
    pub fn max(self, other: PhaseSeconds) -> PhaseSeconds {
        PhaseSeconds {
            paint: self.paint.max(other.paint),
            compose: self.compose.max(other.compose),
            gather: self.gather.max(other.gather),
        }
    }
}

/// The YAML document describing one run.
#[derive(Debug, Serialize)]
pub struct TimingReport {
    /// Framebuffer width.
    pub width: u32,
    /// Framebuffer height.
    pub height: u32,
    /// Group size.
    pub ranks: usize,
    /// Pixel encoding selector name.
    pub encoding: String,
    /// Composition algorithm name.
    pub compositor: String,
    /// Geometry distribution mode name.
    pub distribution: String,
    /// Slowest rank's paint phase, seconds.
    pub paint_seconds: f64,
    /// Slowest rank's compose phase, seconds.
    pub compose_seconds: f64,
    /// Slowest rank's gather phase, seconds.
    pub gather_seconds: f64,
    /// End-to-end wall clock, seconds.
    pub total_seconds: f64,
}

/// Writes the report as YAML to `path`.
pub fn write_report(path: &Path, report: &TimingReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating timing report {}", path.display()))?;
    serde_yaml::to_writer(BufWriter::new(file), report)
        .with_context(|| format!("writing timing report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_max_is_componentwise() {
        let a = PhaseSeconds {
            paint: 1.0,
            compose: 0.2,
            gather: 0.5,
        };
        let b = PhaseSeconds {
            paint: 0.5,
            compose: 0.4,
            gather: 0.1,
        };
        let m = a.max(b);
        assert_eq!(m.paint, 1.0);
        assert_eq!(m.compose, 0.4);
        assert_eq!(m.gather, 0.5);
    }

    #[test]
    fn test_report_round_trips_through_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timing.yaml");
        let report = TimingReport {
            width: 1100,
            height: 900,
            ranks: 4,
            encoding: "rgba8z".into(),
            compositor: "binary-swap".into(),
            distribution: "duplicate".into(),
            paint_seconds: 0.25,
            compose_seconds: 0.125,
            gather_seconds: 0.0625,
            total_seconds: 0.5,
        };
        write_report(&path, &report).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("ranks: 4"));
        assert!(text.contains("encoding: rgba8z"));
        assert!(text.contains("compose_seconds: 0.125"));
    }
}
