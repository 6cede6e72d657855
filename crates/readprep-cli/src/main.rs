//! CLI application for turning IELTS reading PDFs into practice pages.

mod commands;
mod telegram;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, convert, prompt, serve};

/// IELTS reading practice - Turn reading-test PDFs into interactive HTML pages
#[derive(Parser)]
#[command(name = "readprep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single PDF into a practice page
    Convert(convert::ConvertArgs),

    /// Convert many PDFs
    Batch(batch::BatchArgs),

    /// Print the generation prompt or segmentation without calling the API
    Prompt(prompt::PromptArgs),

    /// Run the Telegram bot
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Convert(args) => convert::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Prompt(args) => prompt::run(args, config_path).await,
        Commands::Serve(args) => serve::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
