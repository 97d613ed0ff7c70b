//! The end-to-end run loop: distribute, paint, compose, gather.

use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use tracing::info;

use sortlast_comm::{Communicator, group};
use sortlast_compose::{BinarySwap, ComposeResult, Compositor, DirectSend, gather};
use sortlast_core::{Encoding, Image};
use sortlast_paint::{Camera, Distribution, Mesh, distribute, paint, scene_bounds};

use crate::timing::PhaseSeconds;

/// The rank all strips are gathered onto.
const ROOT: usize = 0;

/// Which composition algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Binary swap; `strict` refuses non-power-of-two groups.
    BinarySwap {
        /// Fail instead of falling back to direct send.
        strict: bool,
    },
    /// Direct send onto rank 0.
    DirectSend,
}

impl Algorithm {
    /// The selector name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::BinarySwap { .. } => "binary-swap",
            Algorithm::DirectSend => "direct-send",
        }
    }
}

/// Everything a run needs; identical on all ranks.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Framebuffer width, uniform across ranks.
    pub width: u32,
    /// Framebuffer height, uniform across ranks.
    pub height: u32,
    /// Group size.
    pub ranks: usize,
    /// Composition algorithm.
    pub algorithm: Algorithm,
    /// Geometry distribution mode.
    pub distribution: Distribution,
    /// Face opacity of the synthetic box scene.
    pub opacity: f32,
}

fn rank_task<E: Encoding, C: Communicator>(
    config: &Config,
    mesh: &Mesh,
    camera: &Camera,
    comm: &C,
) -> ComposeResult<(Image<E>, PhaseSeconds)> {
    let mut phases = PhaseSeconds::default();

    let local_mesh = distribute(mesh, config.distribution, comm.rank(), comm.size());
    let mut local = Image::<E>::full(config.width, config.height);

    let start = Instant::now();
    paint(&local_mesh, camera, &mut local);
    phases.paint = start.elapsed().as_secs_f64();

    let start = Instant::now();
    let strip = match config.algorithm {
        Algorithm::BinarySwap { strict: false } => BinarySwap::new().compose(local, comm)?,
        Algorithm::BinarySwap { strict: true } => BinarySwap::strict().compose(local, comm)?,
        Algorithm::DirectSend => DirectSend::new().compose(local, comm)?,
    };
    phases.compose = start.elapsed().as_secs_f64();

    let start = Instant::now();
    let assembled = gather(&strip, ROOT, comm)?;
    phases.gather = start.elapsed().as_secs_f64();

    Ok((assembled, phases))
}

/// Runs the whole pipeline on `config.ranks` rank threads and returns the
/// root's gathered image with the per-phase maxima over ranks.
pub fn run<E: Encoding>(config: &Config) -> Result<(Image<E>, PhaseSeconds)> {
    anyhow::ensure!(config.ranks > 0, "at least one rank is required");

    let mesh = Mesh::box_mesh(config.opacity);
    let (scene_min, scene_max) = scene_bounds(&mesh, config.distribution, config.ranks);
    let camera = Camera::frame_box(scene_min, scene_max, config.width, config.height);
    info!(
        width = config.width,
        height = config.height,
        ranks = config.ranks,
        encoding = E::NAME,
        algorithm = config.algorithm.name(),
        "run start"
    );

    let outcomes = group::run(config.ranks, |comm| {
        rank_task::<E, _>(config, &mesh, &camera, &comm)
    });

    let mut root_image = None;
    let mut phases = PhaseSeconds::default();
    for (rank, outcome) in outcomes.into_iter().enumerate() {
        let (image, rank_phases) =
            outcome.with_context(|| format!("collective failed on rank {rank}"))?;
        phases = phases.max(rank_phases);
        if rank == ROOT {
            root_image = Some(image);
        }
    }
    let image = root_image.ok_or_else(|| anyhow!("root rank produced no image"))?;
    Ok((image, phases))
}
