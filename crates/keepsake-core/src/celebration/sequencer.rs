//! Celebration stage sequencer.
//!
//! A caller-clocked state machine. It never reads the wall clock and never
//! spawns anything: `trigger` schedules the three later transitions in a
//! [`TimerQueue`], and the caller is responsible for calling `tick(now_ms)`
//! to let them fire.
//!
//! ## Stage Transitions
//!
//! ```text
//! Idle -trigger-> Burst -+2000-> MessageA -+4500-> MessageB -+7000-> Finale -reset-> Idle
//!                   \____________________cancel____________________/ -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut seq = StageSequencer::new();
//! seq.trigger(now);
//! // In a loop:
//! for event in seq.tick(now) { /* render */ }
//! ```

use tracing::{debug, info, warn};

use super::stage::{CelebrationStage, StageEntry, StagePresentation, StageStatus};
use super::timers::TimerQueue;
use crate::events::Event;

/// Offsets from trigger time at which each later stage is entered.
pub const STAGE_SCHEDULE_MS: [(CelebrationStage, u64); 3] = [
    (CelebrationStage::MessageA, 2000),
    (CelebrationStage::MessageB, 4500),
    (CelebrationStage::Finale, 7000),
];

/// Drives one celebration at a time through its fixed schedule.
#[derive(Debug, Clone, Default)]
pub struct StageSequencer {
    stage: CelebrationStage,
    history: Vec<StageEntry>,
    triggered_at_ms: Option<u64>,
    pending: TimerQueue<CelebrationStage>,
}

impl StageSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn stage(&self) -> CelebrationStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != CelebrationStage::Idle
    }

    pub fn triggered_at_ms(&self) -> Option<u64> {
        self.triggered_at_ms
    }

    /// Stages entered since the last trigger, oldest first.
    pub fn history(&self) -> &[StageEntry] {
        &self.history
    }

    /// Scheduled transitions that have not fired yet.
    pub fn pending_transitions(&self) -> usize {
        self.pending.len()
    }

    pub fn next_transition_ms(&self) -> Option<u64> {
        self.pending.next_due()
    }

    /// Every stage from Burst up to the current one. The highest is active,
    /// the rest stay mounted as exited.
    pub fn presentation(&self) -> Vec<StagePresentation> {
        CelebrationStage::ALL
            .iter()
            .copied()
            .filter(|s| *s != CelebrationStage::Idle && *s <= self.stage)
            .map(|stage| StagePresentation {
                stage,
                status: if stage == self.stage {
                    StageStatus::Active
                } else {
                    StageStatus::Exited
                },
            })
            .collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a celebration. Only valid at Idle; anything else is ignored
    /// and leaves the pending schedule untouched.
    pub fn trigger(&mut self, now_ms: u64) -> Option<Event> {
        if self.stage != CelebrationStage::Idle {
            warn!(stage = ?self.stage, "celebration already running, trigger ignored");
            return None;
        }

        // A stale schedule can only survive here through misuse; never let
        // two timer chains overlap.
        self.pending.cancel_all();
        self.history.clear();
        self.triggered_at_ms = Some(now_ms);
        self.enter(CelebrationStage::Burst, now_ms);
        for (stage, offset) in STAGE_SCHEDULE_MS {
            self.pending.schedule(now_ms.saturating_add(offset), stage);
        }
        info!(at_ms = now_ms, "celebration triggered");
        Some(Event::CelebrationStarted { at_ms: now_ms })
    }

    /// Call periodically. Returns one `StageEntered` per transition that fired.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for (due_ms, next) in self.pending.pop_due(now_ms) {
            if next <= self.stage {
                debug!(?next, current = ?self.stage, "dropping non-advancing transition");
                continue;
            }
            self.enter(next, due_ms);
            events.push(Event::StageEntered {
                stage: next,
                at_ms: due_ms,
            });
        }
        events
    }

    /// Dismiss from the finale. Elsewhere this is a no-op.
    pub fn reset(&mut self, now_ms: u64) -> Option<Event> {
        if !self.stage.is_terminal() {
            warn!(stage = ?self.stage, "reset ignored outside the finale");
            return None;
        }
        self.clear();
        info!(at_ms = now_ms, "celebration dismissed");
        Some(Event::CelebrationReset { at_ms: now_ms })
    }

    /// Abort a celebration before it reaches the finale, dropping the
    /// remaining transitions.
    pub fn cancel(&mut self, now_ms: u64) -> Option<Event> {
        let from = self.stage;
        if from == CelebrationStage::Idle || from.is_terminal() {
            return None;
        }
        let dropped = self.clear();
        info!(?from, dropped, "celebration cancelled");
        Some(Event::CelebrationCancelled {
            from,
            dropped_transitions: dropped,
            at_ms: now_ms,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter(&mut self, stage: CelebrationStage, at_ms: u64) {
        debug!(?stage, at_ms, "stage entered");
        self.stage = stage;
        self.history.push(StageEntry {
            stage,
            entered_at_ms: at_ms,
        });
    }

    fn clear(&mut self) -> usize {
        let dropped = self.pending.cancel_all();
        self.stage = CelebrationStage::Idle;
        self.triggered_at_ms = None;
        self.history.clear();
        dropped
    }
}
