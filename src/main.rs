mod chat;
mod cli;
mod color;
mod config;
mod persona;
mod providers;
mod session;
mod utils;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use cli::{chat::chat_cmd, examples::examples_cmd, ColorMode};
use tracing_subscriber::EnvFilter;

pub(crate) const NAME: &str = "advisor";
pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Default, Clone, Copy, ValueEnum, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum RequestedColorMode {
    #[default]
    Auto,
    On,
    Off,
}

#[derive(Parser)]
#[command(name = NAME)]
#[command(
    about = "Expert guidance on NIST, FedRAMP, FISMA, OMB Circulars and federal compliance",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[arg(long, global = true, default_value_t = RequestedColorMode::default())]
    color: RequestedColorMode,
    /// Read the configuration from this file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log more detail to standard error (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the advisor questions
    Chat(ChatArgs),
    /// List the example questions or the supported frameworks
    Examples(ExamplesArgs),
}

#[derive(Parser, Default)]
pub(crate) struct ChatArgs {
    /// Specifies the model to be used during the chat
    #[arg(short, long)]
    model: Option<String>,
    /// Maximum number of tokens in each answer
    #[arg(long)]
    max_tokens: Option<u32>,
    /// Ask example question N first (see `examples`)
    #[arg(short, long, value_name = "N")]
    example: Option<usize>,
    /// Stay in interactive mode after the initial question
    #[arg(short, long)]
    interactive: bool,
    /// Specify the initial question
    prompt: Option<String>,
}

/// Possible listings
#[derive(Subcommand, Clone, Copy, Default)]
pub(crate) enum ExampleListing {
    /// Canned example questions
    #[default]
    Questions,
    /// Compliance frameworks the advisor covers
    Frameworks,
}

/// Output formats
#[derive(ValueEnum, Default, Clone, Copy, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum ListingFormat {
    /// Format the output as a table
    #[default]
    Table,
    /// Format the output as JSON
    Json,
    /// Format the output as a table without a header
    HeaderlessTable,
}

#[derive(Parser)]
pub(crate) struct ExamplesArgs {
    /// Output the listing with the specified format
    #[arg(short, long, default_value_t = ListingFormat::default())]
    format: ListingFormat,
    /// List the specified object
    #[command(subcommand)]
    object: Option<ExampleListing>,
}

fn init_tracing(verbose: u8, color: ColorMode) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}={}", NAME, level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(matches!(color, ColorMode::On))
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let color = ColorMode::resolve_auto(cli.color);

    color::configure_color(color);

    init_tracing(cli.verbose, color);

    match &cli.command {
        Some(Commands::Chat(args)) => chat_cmd(cli.config.clone(), args).await,
        Some(Commands::Examples(args)) => examples_cmd(args),
        None => chat_cmd(cli.config.clone(), &ChatArgs::default()).await,
    }
}
