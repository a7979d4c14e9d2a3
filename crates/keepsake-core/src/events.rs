use serde::{Deserialize, Serialize};

use crate::celebration::{CelebrationStage, ParticleKind};

/// Every state change in the celebration produces an Event.
/// Renderers consume them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CelebrationStarted {
        at_ms: u64,
    },
    StageEntered {
        stage: CelebrationStage,
        at_ms: u64,
    },
    /// Dismissed from the finale.
    CelebrationReset {
        at_ms: u64,
    },
    /// Aborted before the finale.
    CelebrationCancelled {
        from: CelebrationStage,
        dropped_transitions: usize,
        at_ms: u64,
    },
    BatchLaunched {
        kind: ParticleKind,
        count: usize,
        last_spawn_ms: u64,
        at_ms: u64,
    },
    ParticlesSpawned {
        kind: ParticleKind,
        count: usize,
        at_ms: u64,
    },
    ParticlesExpired {
        kind: ParticleKind,
        count: usize,
        at_ms: u64,
    },
    LikeHeartEmitted {
        x: f64,
        y: f64,
        at_ms: u64,
    },
    StateSnapshot {
        stage: CelebrationStage,
        pending_transitions: usize,
        live_particles: usize,
        pending_spawns: usize,
        at_ms: u64,
    },
}

impl Event {
    pub fn at_ms(&self) -> u64 {
        match self {
            Event::CelebrationStarted { at_ms }
            | Event::StageEntered { at_ms, .. }
            | Event::CelebrationReset { at_ms }
            | Event::CelebrationCancelled { at_ms, .. }
            | Event::BatchLaunched { at_ms, .. }
            | Event::ParticlesSpawned { at_ms, .. }
            | Event::ParticlesExpired { at_ms, .. }
            | Event::LikeHeartEmitted { at_ms, .. }
            | Event::StateSnapshot { at_ms, .. } => *at_ms,
        }
    }
}
