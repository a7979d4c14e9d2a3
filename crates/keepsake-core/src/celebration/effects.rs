//! Transient particle effects.
//!
//! The emitter owns every live particle as a value with its own expiry time.
//! A batch launch only schedules spawns; `tick(now_ms)` materializes the
//! spawns that are due and hands back the particles whose lifetime has run
//! out. Each particle leaves the live map exactly once.
//!
//! Batches are fire-and-forget: there is no way to cancel one, and batches
//! from overlapping celebrations simply share the scene.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::timers::TimerQueue;
use crate::random::RandomSource;

/// Confetti colors.
pub const CONFETTI_PALETTE: [&str; 6] = [
    "#ff1744", "#ff6090", "#ffd700", "#ffffff", "#ff4081", "#b76e79",
];

/// Firework burst positions, in percent of the viewport (left, top).
pub const FIREWORK_POSITIONS: [(f64, f64); 5] =
    [(20.0, 30.0), (80.0, 25.0), (50.0, 40.0), (35.0, 60.0), (70.0, 55.0)];

/// Sparks created with every firework burst.
pub const FIREWORK_SPARKS: usize = 30;

/// Lifetime of the single-shot like heart.
pub const LIKE_HEART_LIFETIME_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Confetti,
    Firework,
    ExplosionHeart,
    Sparkle,
    LikeHeart,
}

impl ParticleKind {
    pub const fn lifetime_ms(self) -> u64 {
        match self {
            ParticleKind::Confetti => 6000,
            ParticleKind::Firework => 2000,
            ParticleKind::ExplosionHeart => 3000,
            ParticleKind::Sparkle => 4000,
            ParticleKind::LikeHeart => LIKE_HEART_LIFETIME_MS,
        }
    }

    /// Batch shape for the batched kinds; `None` for the like heart.
    pub fn batch(self) -> Option<BatchSpec> {
        CELEBRATION_BATCHES
            .iter()
            .find(|spec| spec.kind == self)
            .copied()
    }
}

/// The four batches a celebration launches, in launch order.
pub const CELEBRATION_BATCHES: [BatchSpec; 4] = [
    BatchSpec::new(ParticleKind::Confetti, 300, 15),
    BatchSpec::new(ParticleKind::Firework, FIREWORK_POSITIONS.len(), 600),
    BatchSpec::new(ParticleKind::ExplosionHeart, 50, 30),
    BatchSpec::new(ParticleKind::Sparkle, 100, 40),
];

/// Count, stagger and lifetime of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSpec {
    pub kind: ParticleKind,
    pub count: usize,
    pub stagger_ms: u64,
    pub lifetime_ms: u64,
}

impl BatchSpec {
    const fn new(kind: ParticleKind, count: usize, stagger_ms: u64) -> Self {
        Self {
            kind,
            count,
            stagger_ms,
            lifetime_ms: kind.lifetime_ms(),
        }
    }

    /// Offset of the last spawn from the launch time.
    pub fn last_spawn_offset_ms(&self) -> u64 {
        self.stagger_ms
            .saturating_mul(self.count.saturating_sub(1) as u64)
    }

    /// Offset by which every particle of the batch is gone.
    pub fn settle_offset_ms(&self) -> u64 {
        self.last_spawn_offset_ms().saturating_add(self.lifetime_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub u64);

/// One sub-particle of a firework burst, removed together with its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spark {
    pub angle: f64,
    pub velocity: f64,
    /// Travel offset in px (`cos(angle) * velocity`, `sin(angle) * velocity`).
    pub dx: f64,
    pub dy: f64,
}

/// Randomized look of a particle, fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticleAttrs {
    Confetti {
        left_vw: f64,
        color: String,
        width_px: f64,
        height_px: f64,
        delay_s: f64,
    },
    Firework {
        left_pct: f64,
        top_pct: f64,
        sparks: Vec<Spark>,
    },
    ExplosionHeart {
        angle: f64,
        distance_px: f64,
        left_pct: f64,
        top_pct: f64,
    },
    Sparkle {
        left_vw: f64,
        size_rem: f64,
        delay_s: f64,
    },
    LikeHeart {
        x: f64,
        y: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub kind: ParticleKind,
    pub spawned_at_ms: u64,
    pub expires_at_ms: u64,
    pub attrs: ParticleAttrs,
}

impl Particle {
    /// Scene elements this particle occupies (a firework counts its sparks).
    pub fn element_count(&self) -> usize {
        match &self.attrs {
            ParticleAttrs::Firework { sparks, .. } => 1 + sparks.len(),
            _ => 1,
        }
    }
}

/// What a launch scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTicket {
    pub spec: BatchSpec,
    pub launched_at_ms: u64,
}

impl BatchTicket {
    pub fn last_spawn_ms(&self) -> u64 {
        self.launched_at_ms
            .saturating_add(self.spec.last_spawn_offset_ms())
    }

    /// Time by which every particle of this batch has been removed.
    pub fn settled_by_ms(&self) -> u64 {
        self.launched_at_ms
            .saturating_add(self.spec.settle_offset_ms())
    }
}

/// Result of one emitter tick.
#[derive(Debug, Clone, Default)]
pub struct EffectFrame {
    pub spawned: Vec<ParticleId>,
    pub expired: Vec<Particle>,
}

impl EffectFrame {
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.expired.is_empty()
    }
}

/// Running element tallies per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterStats {
    pub spawned: BTreeMap<ParticleKind, usize>,
    pub expired: BTreeMap<ParticleKind, usize>,
}

impl EmitterStats {
    pub fn spawned_of(&self, kind: ParticleKind) -> usize {
        self.spawned.get(&kind).copied().unwrap_or(0)
    }

    pub fn expired_of(&self, kind: ParticleKind) -> usize {
        self.expired.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingSpawn {
    kind: ParticleKind,
    index: usize,
}

/// Spawns and expires transient particles.
#[derive(Debug, Clone)]
pub struct EffectEmitter<R> {
    rng: R,
    next_id: u64,
    spawns: TimerQueue<PendingSpawn>,
    live: BTreeMap<ParticleId, Particle>,
    stats: EmitterStats,
}

impl<R: RandomSource> EffectEmitter<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            next_id: 0,
            spawns: TimerQueue::new(),
            live: BTreeMap::new(),
            stats: EmitterStats::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn live(&self) -> impl Iterator<Item = &Particle> {
        self.live.values()
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.live.get(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live scene elements, counting firework sparks.
    pub fn live_elements(&self) -> usize {
        self.live.values().map(Particle::element_count).sum()
    }

    pub fn pending_spawns(&self) -> usize {
        self.spawns.len()
    }

    /// Nothing scheduled and nothing on screen.
    pub fn is_idle(&self) -> bool {
        self.spawns.is_empty() && self.live.is_empty()
    }

    pub fn stats(&self) -> &EmitterStats {
        &self.stats
    }

    /// Earliest time at which `tick` would change anything.
    pub fn next_change_ms(&self) -> Option<u64> {
        let next_expiry = self.live.values().map(|p| p.expires_at_ms).min();
        match (self.spawns.next_due(), next_expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Schedule one batch. The like heart is not a batch; launching it
    /// schedules nothing.
    pub fn launch(&mut self, kind: ParticleKind, now_ms: u64) -> Option<BatchTicket> {
        kind.batch().map(|spec| self.launch_batch(spec, now_ms))
    }

    /// Schedule `spec.count` spawns, `spec.stagger_ms` apart.
    pub fn launch_batch(&mut self, spec: BatchSpec, now_ms: u64) -> BatchTicket {
        let kind = spec.kind;
        for index in 0..spec.count {
            let offset = spec.stagger_ms.saturating_mul(index as u64);
            self.spawns
                .schedule(now_ms.saturating_add(offset), PendingSpawn { kind, index });
        }
        debug!(?kind, count = spec.count, at_ms = now_ms, "batch launched");
        BatchTicket {
            spec,
            launched_at_ms: now_ms,
        }
    }

    /// Launch confetti, fireworks, heart explosion and sparkle shower.
    pub fn launch_celebration(&mut self, now_ms: u64) -> [BatchTicket; 4] {
        CELEBRATION_BATCHES.map(|spec| self.launch_batch(spec, now_ms))
    }

    /// Spawn a single like heart at screen coordinates, gone after one second.
    pub fn emit_like_heart(&mut self, x: f64, y: f64, now_ms: u64) -> ParticleId {
        self.insert(
            ParticleKind::LikeHeart,
            now_ms,
            ParticleAttrs::LikeHeart { x, y },
        )
    }

    /// Materialize due spawns, then remove every expired particle.
    pub fn tick(&mut self, now_ms: u64) -> EffectFrame {
        let mut frame = EffectFrame::default();

        for (due_ms, spawn) in self.spawns.pop_due(now_ms) {
            let attrs = self.roll_attrs(spawn);
            frame.spawned.push(self.insert(spawn.kind, due_ms, attrs));
        }

        let expired_ids: Vec<ParticleId> = self
            .live
            .values()
            .filter(|p| p.expires_at_ms <= now_ms)
            .map(|p| p.id)
            .collect();
        for id in expired_ids {
            if let Some(particle) = self.live.remove(&id) {
                *self.stats.expired.entry(particle.kind).or_insert(0) += particle.element_count();
                frame.expired.push(particle);
            }
        }

        frame
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn insert(&mut self, kind: ParticleKind, spawned_at_ms: u64, attrs: ParticleAttrs) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        let particle = Particle {
            id,
            kind,
            spawned_at_ms,
            expires_at_ms: spawned_at_ms.saturating_add(kind.lifetime_ms()),
            attrs,
        };
        *self.stats.spawned.entry(kind).or_insert(0) += particle.element_count();
        self.live.insert(id, particle);
        id
    }

    fn roll_attrs(&mut self, spawn: PendingSpawn) -> ParticleAttrs {
        let rng = &mut self.rng;
        match spawn.kind {
            ParticleKind::Confetti => ParticleAttrs::Confetti {
                left_vw: rng.range(0.0, 100.0),
                color: CONFETTI_PALETTE[rng.index(CONFETTI_PALETTE.len())].to_string(),
                delay_s: rng.range(0.0, 2.0),
                width_px: rng.range(8.0, 16.0),
                height_px: rng.range(8.0, 16.0),
            },
            ParticleKind::Firework => {
                let (left_pct, top_pct) = FIREWORK_POSITIONS[spawn.index % FIREWORK_POSITIONS.len()];
                let sparks = (0..FIREWORK_SPARKS)
                    .map(|i| {
                        let angle = 2.0 * PI * i as f64 / FIREWORK_SPARKS as f64;
                        let velocity = rng.range(100.0, 200.0);
                        Spark {
                            angle,
                            velocity,
                            dx: angle.cos() * velocity,
                            dy: angle.sin() * velocity,
                        }
                    })
                    .collect();
                ParticleAttrs::Firework {
                    left_pct,
                    top_pct,
                    sparks,
                }
            }
            ParticleKind::ExplosionHeart => {
                let count = ParticleKind::ExplosionHeart
                    .batch()
                    .map(|b| b.count)
                    .unwrap_or(1);
                ParticleAttrs::ExplosionHeart {
                    angle: 2.0 * PI * spawn.index as f64 / count as f64,
                    distance_px: rng.range(200.0, 500.0),
                    left_pct: 50.0,
                    top_pct: 50.0,
                }
            }
            ParticleKind::Sparkle => ParticleAttrs::Sparkle {
                left_vw: rng.range(0.0, 100.0),
                size_rem: rng.range(1.0, 3.0),
                delay_s: rng.range(0.0, 2.0),
            },
            // Never scheduled as a batch.
            ParticleKind::LikeHeart => ParticleAttrs::LikeHeart { x: 0.0, y: 0.0 },
        }
    }
}
