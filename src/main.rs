use clap::Parser;
use networth_tracker::args::{Args, Command};
use networth_tracker::commands::{self, Backend};
use networth_tracker::{Config, Mode, Result, Session};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();
    let session = Session::parse(args.common().owner())?;

    // This allows for running the program without hitting the Google APIs. When
    // NETWORTH_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Testing,
    // otherwise it will be Mode::Google.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(
            home,
            init_args.client_secret(),
            init_args.sheet_url(),
            init_args.multi_user(),
        )
        .await?
        .print(),

        Command::Auth(auth_args) => {
            let config = Config::load(home).await?;
            if auth_args.verify() {
                commands::auth_verify(&config).await?.print()
            } else {
                commands::auth(&config).await?.print()
            }
        }

        Command::Dashboard => {
            let backend = backend(home, mode).await?;
            commands::dashboard(&backend, &session).await?.print_json()?
        }

        Command::Trend => {
            let backend = backend(home, mode).await?;
            commands::trend(&backend, &session).await?.print_json()?
        }

        Command::Mom(mom_args) => {
            let backend = backend(home, mode).await?;
            commands::mom(&backend, &session, mom_args)
                .await?
                .print_json()?
        }

        Command::Allocation(kind_args) => {
            let backend = backend(home, mode).await?;
            commands::allocation(&backend, &session, kind_args)
                .await?
                .print_json()?
        }

        Command::Categories(kind_args) => {
            let backend = backend(home, mode).await?;
            commands::categories(&backend, &session, kind_args)
                .await?
                .print_json()?
        }

        Command::Add(add_args) => {
            let backend = backend(home, mode).await?;
            let entry = add_args.entry();
            commands::add_entry(&backend, &session, entry.kind(), entry.args())
                .await?
                .print_json()?
        }

        Command::Backup => {
            let backend = backend(home, mode).await?;
            commands::backup(&backend, &session).await?.print()
        }

        Command::Mcp => commands::mcp(Config::load(home).await?, mode, session)
            .await?
            .print(),
    };
    Ok(())
}

async fn backend(home: &Path, mode: Mode) -> Result<Backend> {
    Ok(Backend::new(Config::load(home).await?, mode))
}

/// Initializes the tracing subscriber. Logs go to stderr so that stdout only carries command
/// output and, for `networth mcp`, the MCP protocol.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use the given level for the library and the binary only.
            EnvFilter::new(format!(
                "{}={level},{}={level}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                env!("CARGO_BIN_NAME"),
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
