//! Plays the celebration in real time and prints one JSON event per line.

use std::time::{Duration, Instant};

use clap::Args;
use keepsake_core::celebration::{Answer, Celebration};
use keepsake_core::landing::{Scenery, TypewriterReveal};
use keepsake_core::random::SeededRandom;
use keepsake_core::storage::LandingConfig;
use keepsake_core::{Config, Event};
use serde_json::json;
use tokio::time::MissedTickBehavior;

use super::{print_json, CliResult};

#[derive(Args)]
pub struct CelebrateArgs {
    /// Fixed seed for particle attributes (overrides celebration.seed)
    #[arg(long)]
    seed: Option<u64>,
    /// Playback speed; 2 plays twice as fast
    #[arg(long, default_value_t = 1.0)]
    speed: f64,
    /// Print only the final summary
    #[arg(long)]
    quiet: bool,
    /// Type out the landing greeting before answering
    #[arg(long)]
    intro: bool,
    /// Abort this many milliseconds after answering, before the finale
    #[arg(long)]
    cancel_after: Option<u64>,
    /// Real milliseconds between frames
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
}

/// Scaled milliseconds since construction.
struct Clock {
    start: Instant,
    speed: f64,
}

impl Clock {
    fn start(speed: f64) -> Self {
        Self {
            start: Instant::now(),
            speed,
        }
    }

    fn now_ms(&self) -> u64 {
        (self.start.elapsed().as_secs_f64() * 1000.0 * self.speed) as u64
    }
}

fn emit(events: impl IntoIterator<Item = Event>, quiet: bool) -> CliResult {
    for event in events {
        if !quiet {
            println!("{}", serde_json::to_string(&event)?);
        }
    }
    Ok(())
}

fn frame_interval(frame_ms: u64) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(Duration::from_millis(frame_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn play_intro(landing: &LandingConfig, args: &CelebrateArgs) -> CliResult {
    let mut rng = SeededRandom::from_optional(args.seed);
    let scenery = Scenery::generate(&mut rng);
    if !args.quiet {
        println!("{}", json!({ "type": "scenery", "scenery": scenery }));
    }

    let reveal = TypewriterReveal::new(landing.greeting.as_str());
    let clock = Clock::start(args.speed);
    let mut interval = frame_interval(args.frame_ms);
    let mut last = None;
    loop {
        interval.tick().await;
        let frame = reveal.frame(clock.now_ms());
        if last.as_ref() != Some(&frame) {
            if !args.quiet {
                println!(
                    "{}",
                    json!({ "type": "reveal", "recipient": landing.recipient, "frame": frame })
                );
            }
            last = Some(frame.clone());
        }
        if frame.complete {
            return Ok(());
        }
    }
}

pub async fn run(args: CelebrateArgs) -> CliResult {
    if !(args.speed.is_finite() && args.speed > 0.0) {
        return Err(format!("speed must be a positive number, got {}", args.speed).into());
    }
    let config = Config::load()?;
    if args.intro {
        play_intro(&config.landing, &args).await?;
    }

    let seed = args.seed.or(config.celebration.seed);
    let mut celebration = Celebration::new(SeededRandom::from_optional(seed));
    let clock = Clock::start(args.speed);
    emit(celebration.answer(Answer::Yes, clock.now_ms()), args.quiet)?;

    let mut interval = frame_interval(args.frame_ms);
    let mut cancel_at = args.cancel_after;
    let mut cancelled_history = None;
    loop {
        interval.tick().await;
        let now = clock.now_ms();
        if cancel_at.is_some_and(|at| now >= at) {
            cancel_at = None;
            let entered = celebration.sequencer().history().to_vec();
            if let Some(event) = celebration.cancel(now) {
                cancelled_history = Some(entered);
                emit([event], args.quiet)?;
            }
        }
        emit(celebration.tick(now), args.quiet)?;
        if celebration.is_settled() {
            break;
        }
    }

    // Cancelling and dismissing both clear the stage history.
    let history =
        cancelled_history.unwrap_or_else(|| celebration.sequencer().history().to_vec());
    let now = clock.now_ms();
    emit(celebration.dismiss(now), args.quiet)?;
    print_json(&json!({
        "summary": celebration.snapshot(now),
        "stats": celebration.effects().stats(),
        "history": history,
    }))
}
