//! # carman: Command-Line Shell for the Carman Valet Client
//!
//! Thin front-end over `carman-client`: every subcommand builds a
//! [`CarmanContext`], calls one library operation and prints the result.
//!
//! ```text
//! carman login --email ana@carman.app            # password via CARMAN_PASSWORD
//! carman status
//! carman shift show --establishment e1
//! carman shift open --establishment e1 tarde
//! carman shift close --establishment e1
//! carman establishments
//! carman vehicles --establishment e1
//! carman logout
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use carman_client::{CarmanContext, ClientConfig, ClientError, CloseOutcome};
use carman_core::{CoreError, ShiftPeriod};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Parser)]
#[command(name = "carman", version, about = "Valet parking client for the Carman API")]
struct Cli {
    /// Config file path (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate and persist the session.
    Login {
        #[arg(long)]
        email: String,
        /// Password; prefer the environment variable over the flag.
        #[arg(long, env = "CARMAN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session and clear persisted credentials.
    Logout,
    /// Show the current session and establishment selection.
    Status,
    /// Inspect or transition the active shift.
    Shift {
        #[command(subcommand)]
        command: ShiftCommand,
    },
    /// List the establishments visible to the current user.
    Establishments,
    /// List vehicle entries for an establishment, grouped by urgency.
    Vehicles {
        #[arg(long)]
        establishment: String,
    },
}

#[derive(Subcommand)]
enum ShiftCommand {
    /// Show the active shift, if any.
    Show {
        #[arg(long)]
        establishment: String,
    },
    /// Open a shift for today.
    Open {
        #[arg(long)]
        establishment: String,
        /// Period of day: manana, mediodia, tarde, noche, madrugada.
        period: String,
    },
    /// Close the active shift (closing an already-closed shift succeeds).
    Close {
        #[arg(long)]
        establishment: String,
    },
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// One distinct message per error category, so "the backend said no" never
/// reads like "the network is down".
fn render_error(err: &CliError) -> String {
    match err {
        CliError::Client(err) if err.is_transport() => {
            format!("Cannot reach the Carman API: {}", err)
        }
        CliError::Client(err) if err.is_service_unavailable() => {
            format!("Service unavailable: {}", err)
        }
        CliError::Client(ClientError::Rejected { message, status }) => {
            format!("Request rejected by the server: {} (HTTP {})", message, status)
        }
        other => other.to_string(),
    }
}

// =============================================================================
// Entry Point
// =============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {}", render_error(&err));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig::load_or_default(cli.config).validated()?;
    debug!(base_url = %config.base_url, "Client configured");
    let ctx = CarmanContext::open(config).await?;
    ctx.session.initialize().await?;

    match cli.command {
        Command::Login { email, password } => {
            let snapshot = ctx.session.login(&email, &password).await?;
            match snapshot.user {
                Some(user) => println!("Logged in as {}", user.display_name()),
                None => println!("Logged in (profile unavailable)"),
            }
        }

        Command::Logout => {
            ctx.session.logout().await;
            println!("Logged out");
        }

        Command::Status => {
            let snapshot = ctx.session.snapshot().await;
            if snapshot.is_authenticated {
                match &snapshot.user {
                    Some(user) => println!("Session: {}", user.display_name()),
                    None => println!("Session: authenticated (no profile)"),
                }
            } else {
                println!("Session: not logged in");
            }
            match ctx.masters.selected_establishment().await? {
                Some(est) => println!("Establishment: {} ({})", est.nombre, est.id),
                None => println!("Establishment: none selected"),
            }
        }

        Command::Shift { command } => run_shift(&ctx, command).await?,

        Command::Establishments => {
            for est in ctx.masters.establishments().await? {
                let sectors = est
                    .sectores
                    .iter()
                    .map(|s| s.nombre.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{}  {}  [{}]", est.id, est.nombre, sectors);
            }
        }

        Command::Vehicles { establishment } => {
            let board = ctx.vehicles.board(&establishment).await?;
            for (label, bucket) in [
                ("ARRIVING", &board.red),
                ("WAITING", &board.yellow),
                ("DONE", &board.green),
            ] {
                println!("{} ({})", label, bucket.len());
                for v in bucket {
                    println!(
                        "  {}  {}  {}  {}",
                        v.patente,
                        v.estado,
                        v.sector,
                        v.hora_ingreso.format("%H:%M")
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_shift(ctx: &CarmanContext, command: ShiftCommand) -> Result<(), CliError> {
    match command {
        ShiftCommand::Show { establishment } => {
            match ctx.shifts.active_shift(&establishment).await? {
                Some(shift) => println!("Active shift: {} ({})", shift.nombre, shift.turno),
                None => println!("No active shift"),
            }
        }
        ShiftCommand::Open {
            establishment,
            period,
        } => {
            let period: ShiftPeriod = period.parse()?;
            let shift = ctx.shifts.open_shift(&establishment, period).await?;
            println!("Opened shift: {}", shift.nombre);
        }
        ShiftCommand::Close { establishment } => {
            match ctx.shifts.close_shift(&establishment).await? {
                CloseOutcome::Closed(shift) => println!("Closed shift: {}", shift.nombre),
                CloseOutcome::AlreadyClosed => println!("Shift was already closed"),
            }
        }
    }
    Ok(())
}
