use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canvascribe::llm::ProviderKind;

#[derive(Parser)]
#[command(name = "canvascribe")]
#[command(
    version,
    about = "LLM-assisted Canvas discussion replies and announcement scheduling"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, help = "Configuration file (default: canvascribe.toml)")]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a validated reply to a student discussion post
    Discussion {
        #[arg(help = "Course selector: document key or Canvas course id")]
        course: String,
        #[arg(long, short, help = "Course week (resolved from today when omitted)")]
        week: Option<u32>,
        #[arg(long, short, value_enum, help = "LLM provider (auto-detected when omitted)")]
        provider: Option<ProviderKind>,
        #[arg(long, help = "Student post text (stdin when omitted)")]
        post: Option<String>,
    },

    /// Print the announcement publish schedule for a course
    Announcement {
        #[arg(help = "Course selector: document key or Canvas course id")]
        course: String,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mCanvaScribe encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            canvascribe::cli::Output::new().error(&format!("{}", e));
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> canvascribe::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Discussion {
            course,
            week,
            provider,
            post,
        } => {
            canvascribe::cli::commands::discussion::run(
                config_file,
                canvascribe::cli::commands::discussion::DiscussionArgs {
                    course,
                    week,
                    provider,
                    post,
                },
            )?;
        }
        Commands::Announcement { course } => {
            canvascribe::cli::commands::announcement::run(
                config_file,
                canvascribe::cli::commands::announcement::AnnouncementArgs { course },
            )?;
        }
    }

    Ok(())
}
