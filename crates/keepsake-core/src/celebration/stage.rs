use serde::{Deserialize, Serialize};

/// Checkpoint in the celebration sequence.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CelebrationStage {
    #[default]
    Idle,
    /// "YES!" explosion.
    Burst,
    /// First romantic message.
    MessageA,
    /// Second romantic message.
    MessageB,
    /// Victory card; waits here until dismissed.
    Finale,
}

impl CelebrationStage {
    pub const ALL: [CelebrationStage; 5] = [
        CelebrationStage::Idle,
        CelebrationStage::Burst,
        CelebrationStage::MessageA,
        CelebrationStage::MessageB,
        CelebrationStage::Finale,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            CelebrationStage::Idle => 0,
            CelebrationStage::Burst => 1,
            CelebrationStage::MessageA => 2,
            CelebrationStage::MessageB => 3,
            CelebrationStage::Finale => 4,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    pub fn is_terminal(self) -> bool {
        self == CelebrationStage::Finale
    }

    /// Headline text shown while this stage is active.
    pub fn headline(self) -> &'static str {
        match self {
            CelebrationStage::Idle => "",
            CelebrationStage::Burst => "YES!",
            CelebrationStage::MessageA => "You Just Made Me The Happiest Person Alive!",
            CelebrationStage::MessageB => {
                "I Promise To Make Every Single Day As Special As You Make Me Feel"
            }
            CelebrationStage::Finale => "Happy Valentine's Day!",
        }
    }
}

/// Whether a mounted stage is the current one or on its way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Active,
    Exited,
}

/// One mounted stage in the rendered celebration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePresentation {
    pub stage: CelebrationStage,
    pub status: StageStatus,
}

/// A stage entered during the current celebration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEntry {
    pub stage: CelebrationStage,
    pub entered_at_ms: u64,
}
