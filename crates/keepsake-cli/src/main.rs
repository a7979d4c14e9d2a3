use clap::{CommandFactory, Parser, Subcommand};
use keepsake_core::{Config, MemoryGateway, RestGateway, Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "keepsake", version, about = "Keepsake CLI")]
struct Cli {
    /// Use a throwaway in-memory gateway instead of the configured service
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the Valentine celebration and print its events
    Celebrate(commands::celebrate::CelebrateArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    #[command(flatten)]
    Records(commands::RecordCommand),
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("KEEPSAKE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run_records(offline: bool, command: commands::RecordCommand) -> commands::CliResult {
    let config = Config::load()?;
    if offline {
        tracing::info!("using in-memory gateway");
        let store = Store::new(MemoryGateway::new()).with_buckets(&config.gateway);
        commands::run_records(command, &store).await
    } else {
        let gateway = RestGateway::from_config(&config.gateway)?;
        let store = Store::new(gateway).with_buckets(&config.gateway);
        commands::run_records(command, &store).await
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Celebrate(args) => commands::celebrate::run(args).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "keepsake", &mut std::io::stdout());
            Ok(())
        }
        Commands::Records(command) => run_records(cli.offline, command).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
