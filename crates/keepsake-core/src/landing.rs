//! Landing page choreography around the celebration: the typed greeting,
//! ambient petals and hearts, and the gallery like buttons.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::celebration::{EffectEmitter, ParticleId};
use crate::random::RandomSource;

pub const TYPE_INTERVAL_MS: u64 = 100;
pub const SUBTITLE_DELAY_MS: u64 = 300;
pub const BUTTON_DELAY_MS: u64 = 800;

pub const ROSE_PETALS: usize = 30;
pub const BACKGROUND_HEARTS: usize = 15;

/// Greeting typed out one character at a time, followed by the subtitle
/// and the call-to-action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypewriterReveal {
    text: String,
}

/// What the hero section shows at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealFrame {
    pub typed: String,
    pub subtitle_visible: bool,
    pub button_visible: bool,
    pub complete: bool,
}

impl TypewriterReveal {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Time at which the last character appears.
    pub fn typed_by_ms(&self) -> u64 {
        self.text.chars().count() as u64 * TYPE_INTERVAL_MS
    }

    /// Time at which nothing changes anymore.
    pub fn settled_by_ms(&self) -> u64 {
        self.typed_by_ms() + BUTTON_DELAY_MS
    }

    pub fn frame(&self, elapsed_ms: u64) -> RevealFrame {
        // Character i appears at (i + 1) * interval.
        let shown = (elapsed_ms / TYPE_INTERVAL_MS) as usize;
        let typed: String = self.text.chars().take(shown).collect();
        let done_at = self.typed_by_ms();
        let subtitle_visible = elapsed_ms >= done_at + SUBTITLE_DELAY_MS;
        let button_visible = elapsed_ms >= done_at + BUTTON_DELAY_MS;
        RevealFrame {
            typed,
            subtitle_visible,
            button_visible,
            complete: button_visible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosePetal {
    pub left_pct: f64,
    pub delay_s: f64,
    pub duration_s: f64,
    pub size_px: f64,
    pub rotation_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingHeart {
    pub left_pct: f64,
    pub delay_s: f64,
    pub duration_s: f64,
}

/// Looping background decoration, generated once per page load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenery {
    pub petals: Vec<RosePetal>,
    pub hearts: Vec<FloatingHeart>,
}

impl Scenery {
    pub fn generate(rng: &mut impl RandomSource) -> Self {
        let petals = (0..ROSE_PETALS)
            .map(|_| RosePetal {
                left_pct: rng.range(0.0, 100.0),
                delay_s: rng.range(0.0, 5.0),
                duration_s: rng.range(8.0, 15.0),
                size_px: rng.range(15.0, 35.0),
                rotation_deg: rng.range(0.0, 360.0),
            })
            .collect();
        let hearts = (0..BACKGROUND_HEARTS)
            .map(|_| FloatingHeart {
                left_pct: rng.range(0.0, 100.0),
                delay_s: rng.range(0.0, 8.0),
                duration_s: rng.range(8.0, 12.0),
            })
            .collect();
        Self { petals, hearts }
    }
}

/// Liked gallery items, by index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeBoard {
    liked: BTreeSet<usize>,
}

impl LikeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_liked(&self, index: usize) -> bool {
        self.liked.contains(&index)
    }

    pub fn liked(&self) -> impl Iterator<Item = usize> + '_ {
        self.liked.iter().copied()
    }

    /// Flip the like state. Liking pops a heart at the click position;
    /// unliking is silent. Returns the heart, if one was emitted.
    pub fn toggle<R: RandomSource>(
        &mut self,
        index: usize,
        x: f64,
        y: f64,
        now_ms: u64,
        effects: &mut EffectEmitter<R>,
    ) -> Option<ParticleId> {
        if self.liked.remove(&index) {
            None
        } else {
            self.liked.insert(index);
            Some(effects.emit_like_heart(x, y, now_ms))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};

    #[test]
    fn typewriter_reveals_in_order() {
        let reveal = TypewriterReveal::new("Hey!");
        assert_eq!(reveal.frame(0).typed, "");
        assert_eq!(reveal.frame(100).typed, "H");
        assert_eq!(reveal.frame(399).typed, "Hey");

        let typed = reveal.frame(400);
        assert_eq!(typed.typed, "Hey!");
        assert!(!typed.subtitle_visible);

        assert!(reveal.frame(700).subtitle_visible);
        assert!(!reveal.frame(700).button_visible);
        assert!(reveal.frame(1_200).complete);
        assert_eq!(reveal.settled_by_ms(), 1_200);
    }

    #[test]
    fn typewriter_counts_characters_not_bytes() {
        let reveal = TypewriterReveal::new("Hi 🖤");
        assert_eq!(reveal.typed_by_ms(), 400);
        assert_eq!(reveal.frame(400).typed, "Hi 🖤");
    }

    #[test]
    fn scenery_sizes_and_bounds() {
        let scenery = Scenery::generate(&mut SeededRandom::new(9));
        assert_eq!(scenery.petals.len(), ROSE_PETALS);
        assert_eq!(scenery.hearts.len(), BACKGROUND_HEARTS);
        for petal in &scenery.petals {
            assert!((8.0..15.0).contains(&petal.duration_s));
            assert!((15.0..35.0).contains(&petal.size_px));
        }
        for heart in &scenery.hearts {
            assert!((0.0..8.0).contains(&heart.delay_s));
        }
    }

    #[test]
    fn like_toggle_emits_only_when_liking() {
        let mut board = LikeBoard::new();
        let mut fx = EffectEmitter::new(ScriptedRandom::constant(0.0));

        assert!(board.toggle(2, 1.0, 2.0, 0, &mut fx).is_some());
        assert!(board.is_liked(2));
        assert_eq!(fx.live_count(), 1);

        assert!(board.toggle(2, 1.0, 2.0, 10, &mut fx).is_none());
        assert!(!board.is_liked(2));
        assert_eq!(fx.live_count(), 1);
    }
}
