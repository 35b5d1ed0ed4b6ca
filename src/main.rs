use clap::{Parser, Subcommand};
use delaylens::cli::companies::CompaniesArgs;
use delaylens::cli::fetch_logs::FetchLogsArgs;
use delaylens::cli::schedule_delay::ScheduleDelayArgs;
use delaylens::cli::signup_delay::SignupDelayArgs;
use delaylens::cli::{self, CommandError};
use delaylens::config::{load_or_default, resolve_config_path};
use std::error::Error as _;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "delaylens")]
#[command(about = "Incident analysis tools for scheduling and sync delays", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plot signup-to-CRM-sync delay from a company export CSV
    SignupDelay {
        #[arg(default_value = cli::signup_delay::DEFAULT_INPUT)]
        input: PathBuf,

        /// Chart path (default: <input stem>_graph.svg)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Open the chart after saving it
        #[arg(long)]
        show: bool,
    },
    /// Analyze scheduled message pickup delay from fetched reader logs
    ScheduleDelay {
        #[arg(short, long, default_value = cli::schedule_delay::DEFAULT_INPUT)]
        input: PathBuf,

        #[arg(short, long, default_value = cli::schedule_delay::DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Keep every pickup line instead of the first per message
        #[arg(long)]
        no_dedup: bool,

        #[arg(long)]
        show: bool,
    },
    /// Fetch sampled reader logs from the search backend
    FetchLogs {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long, default_value = cli::fetch_logs::DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Histogram of companies created per day from a CRM export CSV
    Companies {
        #[arg(short, long, default_value = cli::companies::DEFAULT_INPUT)]
        input: PathBuf,

        #[arg(short, long, default_value = cli::companies::DEFAULT_OUTPUT)]
        output: PathBuf,

        #[arg(long)]
        show: bool,
    },
    /// Generate or validate the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration
    Init {
        #[arg(long)]
        stdout: bool,
    },
    /// Load and validate the resolved config file
    Validate,
}

#[tokio::main]
async fn main() {
    // Reports go to stdout; diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "delaylens=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        match e.missing_path() {
            Some(path) => eprintln!("Error: File not found: {}", path.display()),
            None => {
                eprintln!("Error: {e}");
                let mut source = e.source();
                while let Some(cause) = source {
                    eprintln!("  caused by: {cause}");
                    source = cause.source();
                }
            }
        }
        std::process::exit(1);
    }
}

async fn dispatch(args: Cli) -> Result<(), CommandError> {
    let config_path = resolve_config_path(args.config.as_deref());
    let load = || load_or_default(config_path.as_deref());

    match args.command {
        Commands::SignupDelay {
            input,
            output,
            show,
        } => cli::signup_delay::run(
            &SignupDelayArgs {
                input,
                output,
                show,
            },
            &load()?.signup_delay,
        ),
        Commands::ScheduleDelay {
            input,
            output,
            no_dedup,
            show,
        } => cli::schedule_delay::run(
            &ScheduleDelayArgs {
                input,
                output,
                dedup: !no_dedup,
                show,
            },
            &load()?.schedule_delay,
        ),
        Commands::FetchLogs {
            username,
            password,
            output,
        } => {
            let config = load()?;
            cli::fetch_logs::run(
                &FetchLogsArgs {
                    username,
                    password,
                    output,
                },
                &config.fetch,
            )
            .await
        }
        Commands::Companies {
            input,
            output,
            show,
        } => cli::companies::run(
            &CompaniesArgs {
                input,
                output,
                show,
            },
            &load()?.companies,
        ),
        Commands::Config { action } => match action {
            ConfigAction::Init { stdout } => cli::config::init(stdout),
            ConfigAction::Validate => cli::config::validate(config_path.as_deref()),
        },
    }
}
