use chrono::{Datelike, Local, NaiveDate};
use clap::Subcommand;
use keepsake_core::records::{MoodEntry, MoodType};
use keepsake_core::{Gateway, Store};
use serde_json::json;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum MoodAction {
    /// Record how a day felt (overwrites that day's entry)
    Log {
        /// amazing, happy, calm, meh, sad or anxious
        mood: MoodType,
        /// yyyy-mm-dd, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// 1 (barely) to 5 (very)
        #[arg(long, default_value_t = 3)]
        intensity: u8,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Show one day's entry
    Show {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List entries, newest first
    List {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Month grid with tallies
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Available moods
    Options,
}

pub async fn run<G: Gateway>(action: MoodAction, store: &Store<G>) -> CliResult {
    let today = Local::now().date_naive();
    match action {
        MoodAction::Log {
            mood,
            date,
            intensity,
            note,
        } => {
            let mut entry = MoodEntry::new(date.unwrap_or(today), mood);
            entry.mood_intensity = intensity;
            entry.note = note;
            print_json(&store.save_mood(&entry).await?)?;
        }
        MoodAction::Show { date } => {
            let date = date.unwrap_or(today);
            match store.mood_on(date).await? {
                Some(mood) => print_json(&mood)?,
                None => println!("no mood recorded for {date}"),
            }
        }
        MoodAction::List { from, to } => print_json(&store.list_moods(from, to).await?)?,
        MoodAction::Calendar { year, month } => {
            let calendar = store
                .mood_calendar(
                    year.unwrap_or(today.year()),
                    month.unwrap_or(today.month()),
                    today,
                )
                .await?;
            print_json(&calendar)?;
        }
        MoodAction::Options => {
            let options: Vec<_> = MoodType::ALL
                .iter()
                .map(|m| {
                    json!({
                        "type": m,
                        "label": m.label(),
                        "emoji": m.emoji(),
                        "color": m.color(),
                    })
                })
                .collect();
            print_json(&options)?;
        }
    }
    Ok(())
}
