//! The "will you be my Valentine" celebration.
//!
//! [`Celebration`] ties a [`StageSequencer`] to an [`EffectEmitter`] behind
//! the page's three affordances: the Yes button, the decorative No button,
//! and the Close button on the finale.

mod effects;
mod sequencer;
mod stage;
mod timers;

pub use effects::{
    BatchSpec, BatchTicket, EffectEmitter, EffectFrame, EmitterStats, Particle, ParticleAttrs,
    ParticleId, ParticleKind, Spark, CELEBRATION_BATCHES, CONFETTI_PALETTE, FIREWORK_POSITIONS,
    FIREWORK_SPARKS, LIKE_HEART_LIFETIME_MS,
};
pub use sequencer::{StageSequencer, STAGE_SCHEDULE_MS};
pub use stage::{CelebrationStage, StageEntry, StagePresentation, StageStatus};
pub use timers::{TimerId, TimerQueue};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::random::RandomSource;

/// The two answer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    /// Decorative. Pressing it never does anything.
    No,
}

/// Sequencer plus emitter, driven by one caller clock.
#[derive(Debug, Clone)]
pub struct Celebration<R> {
    sequencer: StageSequencer,
    effects: EffectEmitter<R>,
}

impl<R: RandomSource> Celebration<R> {
    pub fn new(rng: R) -> Self {
        Self {
            sequencer: StageSequencer::new(),
            effects: EffectEmitter::new(rng),
        }
    }

    pub fn stage(&self) -> CelebrationStage {
        self.sequencer.stage()
    }

    pub fn sequencer(&self) -> &StageSequencer {
        &self.sequencer
    }

    pub fn effects(&self) -> &EffectEmitter<R> {
        &self.effects
    }

    /// Handle an answer button. Yes starts the celebration if idle and
    /// launches all four particle batches in the same call.
    pub fn answer(&mut self, answer: Answer, now_ms: u64) -> Vec<Event> {
        match answer {
            Answer::No => Vec::new(),
            Answer::Yes => self.trigger(now_ms),
        }
    }

    pub fn trigger(&mut self, now_ms: u64) -> Vec<Event> {
        let Some(started) = self.sequencer.trigger(now_ms) else {
            return Vec::new();
        };
        let mut events = vec![
            started,
            Event::StageEntered {
                stage: CelebrationStage::Burst,
                at_ms: now_ms,
            },
        ];
        for ticket in self.effects.launch_celebration(now_ms) {
            events.push(Event::BatchLaunched {
                kind: ticket.spec.kind,
                count: ticket.spec.count,
                last_spawn_ms: ticket.last_spawn_ms(),
                at_ms: now_ms,
            });
        }
        events
    }

    /// Close button on the finale.
    pub fn dismiss(&mut self, now_ms: u64) -> Option<Event> {
        self.sequencer.reset(now_ms)
    }

    /// Abort before the finale. Particles already launched keep expiring
    /// on their own schedule.
    pub fn cancel(&mut self, now_ms: u64) -> Option<Event> {
        self.sequencer.cancel(now_ms)
    }

    /// Like-button micro-interaction.
    pub fn like(&mut self, x: f64, y: f64, now_ms: u64) -> Event {
        self.effects.emit_like_heart(x, y, now_ms);
        Event::LikeHeartEmitted { x, y, at_ms: now_ms }
    }

    /// Advance both halves to `now_ms`. Particle changes are summarized per kind.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = self.sequencer.tick(now_ms);
        let frame = self.effects.tick(now_ms);
        if frame.is_empty() {
            return events;
        }

        let mut spawned: BTreeMap<ParticleKind, usize> = BTreeMap::new();
        for id in &frame.spawned {
            // Spawned and expired within the same frame: look in `expired`.
            let kind = self
                .effects
                .get(*id)
                .map(|p| p.kind)
                .or_else(|| frame.expired.iter().find(|p| p.id == *id).map(|p| p.kind));
            if let Some(kind) = kind {
                *spawned.entry(kind).or_insert(0) += 1;
            }
        }
        let mut expired: BTreeMap<ParticleKind, usize> = BTreeMap::new();
        for particle in &frame.expired {
            *expired.entry(particle.kind).or_insert(0) += 1;
        }

        events.extend(spawned.into_iter().map(|(kind, count)| Event::ParticlesSpawned {
            kind,
            count,
            at_ms: now_ms,
        }));
        events.extend(expired.into_iter().map(|(kind, count)| Event::ParticlesExpired {
            kind,
            count,
            at_ms: now_ms,
        }));
        events
    }

    /// No stage transition pending and no particle scheduled or on screen.
    pub fn is_settled(&self) -> bool {
        self.sequencer.pending_transitions() == 0 && self.effects.is_idle()
    }

    /// Earliest time at which `tick` would produce something.
    pub fn next_change_ms(&self) -> Option<u64> {
        match (self.sequencer.next_transition_ms(), self.effects.next_change_ms()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn snapshot(&self, now_ms: u64) -> Event {
        Event::StateSnapshot {
            stage: self.sequencer.stage(),
            pending_transitions: self.sequencer.pending_transitions(),
            live_particles: self.effects.live_count(),
            pending_spawns: self.effects.pending_spawns(),
            at_ms: now_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    fn celebration() -> Celebration<SeededRandom> {
        Celebration::new(SeededRandom::new(3))
    }

    #[test]
    fn yes_starts_everything() {
        let mut c = celebration();
        let events = c.answer(Answer::Yes, 0);
        assert_eq!(c.stage(), CelebrationStage::Burst);
        let launched = events
            .iter()
            .filter(|e| matches!(e, Event::BatchLaunched { .. }))
            .count();
        assert_eq!(launched, 4);
        assert_eq!(c.effects().pending_spawns(), 300 + 5 + 50 + 100);
    }

    #[test]
    fn no_is_inert() {
        let mut c = celebration();
        assert!(c.answer(Answer::No, 0).is_empty());
        assert_eq!(c.stage(), CelebrationStage::Idle);
        assert!(c.is_settled());
    }

    #[test]
    fn second_yes_does_not_relaunch() {
        let mut c = celebration();
        c.answer(Answer::Yes, 0);
        assert!(c.answer(Answer::Yes, 10).is_empty());
        assert_eq!(c.sequencer().pending_transitions(), 3);
        assert_eq!(c.effects().pending_spawns(), 455);
    }

    #[test]
    fn tick_summarizes_particles() {
        let mut c = celebration();
        c.answer(Answer::Yes, 0);
        let events = c.tick(0);
        let spawned: usize = events
            .iter()
            .map(|e| match e {
                Event::ParticlesSpawned { count, .. } => *count,
                _ => 0,
            })
            .sum();
        assert_eq!(spawned, 4);
    }

    #[test]
    fn runs_to_settled_then_dismisses() {
        let mut c = celebration();
        c.answer(Answer::Yes, 0);
        let mut now = 0;
        while !c.is_settled() {
            now = c.next_change_ms().unwrap();
            c.tick(now);
        }
        assert_eq!(c.stage(), CelebrationStage::Finale);
        assert_eq!(now, 299 * 15 + 6000);
        assert!(c.dismiss(now).is_some());
        assert_eq!(c.stage(), CelebrationStage::Idle);
    }

    #[test]
    fn like_emits_single_heart() {
        let mut c = celebration();
        let event = c.like(5.0, 6.0, 100);
        assert_eq!(event, Event::LikeHeartEmitted { x: 5.0, y: 6.0, at_ms: 100 });
        assert_eq!(c.effects().live_count(), 1);
        c.tick(1_100);
        assert_eq!(c.effects().live_count(), 0);
    }
}
