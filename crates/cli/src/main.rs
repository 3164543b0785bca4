use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "p47h")]
#[command(version, about = "P47H Rule Manifest CLI", long_about = None)]
struct Cli {
    /// Log rule evaluation at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rule manifest validation and inspection
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
}

#[derive(Subcommand)]
enum RulesCommands {
    /// Validate a rule manifest
    Check {
        /// Path to the manifest TOML file
        file: String,
    },
    /// Show how every rule of a manifest treats one action/subject pair
    Explain {
        /// Path to the manifest TOML file
        file: String,

        /// Action to check
        #[arg(short, long)]
        action: String,

        /// Path to the subject TOML file
        #[arg(short, long)]
        subject: String,

        /// Check the subject's type only, ignoring its attributes
        #[arg(long)]
        type_only: bool,
    },
    /// Print the association joins of every rule as JSON
    Joins {
        /// Path to the manifest TOML file
        file: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Rules { command } => match command {
            RulesCommands::Check { file } => {
                commands::rules::check(&file)?;
            }
            RulesCommands::Explain {
                file,
                action,
                subject,
                type_only,
            } => {
                commands::rules::explain(&file, &action, &subject, type_only)?;
            }
            RulesCommands::Joins { file } => {
                commands::rules::joins(&file)?;
            }
        },
    }

    Ok(())
}
