mod platform;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use platform::{AppConfig, Mode};

#[derive(Parser)]
#[command(name = "scribe", version, about = "Submit audio for transcription and follow it live")]
struct Cli {
    /// Configuration file (RON). Missing file means defaults.
    #[arg(long, global = true, default_value = "scribe.ron")]
    config: PathBuf,

    /// Override the server base URL from the config file.
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive session reading commands from stdin (default).
    Run,
    /// Transcribe a single file and print the transcript.
    Transcribe {
        file: PathBuf,
        #[arg(short, long, default_value = "en")]
        language: String,
        /// Write the transcript here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    platform::initialize_logging(
        config.log_destination,
        scribe_logging::parse_level(&config.log_level),
    );

    let mode = match cli.command.unwrap_or(Command::Run) {
        Command::Run => Mode::Interactive,
        Command::Transcribe {
            file,
            language,
            output,
        } => Mode::OneShot {
            file,
            language,
            output,
        },
    };
    platform::run_app(&config, mode)
}
