use clap::Subcommand;
use keepsake_core::random::SeededRandom;
use keepsake_core::{Gateway, Store};

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum PromptAction {
    /// Pick an unused writing prompt
    Random {
        /// Fixed seed for the pick
        #[arg(long)]
        seed: Option<u64>,
        /// Mark the picked prompt as used
        #[arg(long = "use")]
        mark_used: bool,
    },
    /// Mark a prompt as used
    Used { id: String },
}

pub async fn run<G: Gateway>(action: PromptAction, store: &Store<G>) -> CliResult {
    match action {
        PromptAction::Random { seed, mark_used } => {
            let mut rng = SeededRandom::from_optional(seed);
            match store.random_prompt(&mut rng).await? {
                Some(prompt) => {
                    if mark_used {
                        store.mark_prompt_used(&prompt.id).await?;
                    }
                    print_json(&prompt)?;
                }
                None => println!("no unused prompts left"),
            }
        }
        PromptAction::Used { id } => {
            store.mark_prompt_used(&id).await?;
            println!("marked {id} as used");
        }
    }
    Ok(())
}
