//! Daily mood entries and the month calendar built from them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{de_id, null_as_default};
use crate::error::ValidationError;

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 5;
pub const DEFAULT_INTENSITY: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodType {
    Amazing,
    Happy,
    Calm,
    Meh,
    Sad,
    Anxious,
}

impl MoodType {
    pub const ALL: [MoodType; 6] = [
        MoodType::Amazing,
        MoodType::Happy,
        MoodType::Calm,
        MoodType::Meh,
        MoodType::Sad,
        MoodType::Anxious,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MoodType::Amazing => "amazing",
            MoodType::Happy => "happy",
            MoodType::Calm => "calm",
            MoodType::Meh => "meh",
            MoodType::Sad => "sad",
            MoodType::Anxious => "anxious",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoodType::Amazing => "Amazing",
            MoodType::Happy => "Happy",
            MoodType::Calm => "Calm",
            MoodType::Meh => "Meh",
            MoodType::Sad => "Sad",
            MoodType::Anxious => "Anxious",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MoodType::Amazing => "😄",
            MoodType::Happy => "😊",
            MoodType::Calm => "😌",
            MoodType::Meh => "😐",
            MoodType::Sad => "😢",
            MoodType::Anxious => "😰",
        }
    }

    /// Stored alongside the entry so old rows keep their color.
    pub fn color(self) -> &'static str {
        match self {
            MoodType::Amazing => "#ff6090",
            MoodType::Happy => "#ffb3c1",
            MoodType::Calm => "#b76e79",
            MoodType::Meh => "#909090",
            MoodType::Sad => "#6b8cae",
            MoodType::Anxious => "#8b7aa8",
        }
    }
}

impl FromStr for MoodType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoodType::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "mood_type".into(),
                message: format!("unknown mood '{s}'"),
            })
    }
}

impl fmt::Display for MoodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mood {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub mood_date: NaiveDate,
    pub mood_type: MoodType,
    pub mood_intensity: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One day's mood as entered. Saving overwrites any entry for the same date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub mood_date: NaiveDate,
    pub mood_type: MoodType,
    pub mood_intensity: u8,
    pub note: String,
}

impl MoodEntry {
    pub fn new(mood_date: NaiveDate, mood_type: MoodType) -> Self {
        Self {
            mood_date,
            mood_type,
            mood_intensity: DEFAULT_INTENSITY,
            note: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_INTENSITY..=MAX_INTENSITY).contains(&self.mood_intensity) {
            return Err(ValidationError::OutOfRange {
                field: "mood_intensity",
                min: MIN_INTENSITY.into(),
                max: MAX_INTENSITY.into(),
                value: self.mood_intensity.into(),
            });
        }
        Ok(())
    }

    /// Columns to upsert: trimmed note plus the mood's color.
    pub(crate) fn to_fields(&self) -> serde_json::Value {
        serde_json::json!({
            "mood_date": self.mood_date.format("%Y-%m-%d").to_string(),
            "mood_type": self.mood_type,
            "mood_intensity": self.mood_intensity,
            "note": self.note.trim(),
            "color": self.mood_type.color(),
        })
    }
}

/// First and last day of a month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let out_of_range = || ValidationError::OutOfRange {
        field: "month",
        min: 1,
        max: 12,
        value: month.into(),
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next
        .and_then(|d| d.pred_opt())
        .ok_or_else(out_of_range)?;
    Ok((first, last))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub mood: Option<Mood>,
    pub is_today: bool,
}

/// A Sunday-first month grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodCalendar {
    pub year: i32,
    pub month: u32,
    /// Empty cells before the 1st.
    pub leading_blanks: u32,
    pub cells: Vec<CalendarCell>,
    pub tallies: BTreeMap<MoodType, usize>,
    pub average_intensity: Option<f64>,
}

impl MoodCalendar {
    /// Lay out `moods` over the month. Moods outside the month are ignored.
    pub fn build(
        year: i32,
        month: u32,
        moods: &[Mood],
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let (first, last) = month_bounds(year, month)?;

        let cells: Vec<CalendarCell> = first
            .iter_days()
            .take_while(|d| *d <= last)
            .map(|date| CalendarCell {
                date,
                mood: moods.iter().find(|m| m.mood_date == date).cloned(),
                is_today: date == today,
            })
            .collect();

        let mut tallies = BTreeMap::new();
        let mut intensity_sum = 0u32;
        let mut recorded = 0u32;
        for mood in cells.iter().filter_map(|c| c.mood.as_ref()) {
            *tallies.entry(mood.mood_type).or_insert(0) += 1;
            intensity_sum += u32::from(mood.mood_intensity);
            recorded += 1;
        }

        Ok(Self {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_sunday(),
            cells,
            tallies,
            average_intensity: (recorded > 0)
                .then(|| f64::from(intensity_sum) / f64::from(recorded)),
        })
    }

    pub fn recorded_days(&self) -> usize {
        self.cells.iter().filter(|c| c.mood.is_some()).count()
    }

    /// Most frequent mood; ties go to the earlier option.
    pub fn dominant(&self) -> Option<MoodType> {
        let mut best: Option<(MoodType, usize)> = None;
        for mood in MoodType::ALL {
            let count = self.tallies.get(&mood).copied().unwrap_or(0);
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((mood, count));
            }
        }
        best.map(|(mood, _)| mood)
    }
}
