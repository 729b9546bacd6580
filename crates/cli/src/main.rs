// Miseventos CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Support text/json/yaml output formats for scripting.
// Design Decision: Drafts and the session cookie live in a workspace directory,
// so a record can be added in one invocation and pushed in a later one.

mod commands;
mod output;
mod workspace;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use miseventos_client::{Client, ClientConfig, DEFAULT_API_URL};

use commands::drafts::DraftCommand;
use workspace::Workspace;

#[derive(Parser)]
#[command(name = "miseventos")]
#[command(about = "Miseventos CLI - Manage events, speakers, sessions, and registrations")]
#[command(version)]
pub struct Cli {
    /// API base URL
    #[arg(long, env = "MISEVENTOS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Directory holding drafts and the session cookie
    #[arg(long, env = "MISEVENTOS_WORKSPACE", default_value = ".miseventos")]
    pub workspace: String,

    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub output: String,

    /// Suppress non-essential output
    #[arg(long, short)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage events
    Events {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// Manage speakers
    Speakers {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// Manage sessions
    Sessions {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// Manage event schedules (time slots)
    Schedules {
        #[command(subcommand)]
        command: commands::schedules::SchedulesCommand,
    },

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// Check speaker-to-session assignments
    Assignments {
        #[command(subcommand)]
        command: commands::assignments::AssignmentsCommand,
    },

    /// Sign in, sign out, or show the current user
    Auth {
        #[command(subcommand)]
        command: commands::auth::AuthCommand,
    },

    /// Create an attendee account
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long, env = "MISEVENTOS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Browse published events and their sessions
    Discover {
        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Register for a session
    Attend {
        #[arg(long)]
        event: String,

        #[arg(long)]
        session: String,
    },

    /// Cancel a session registration
    Leave {
        #[arg(long)]
        session: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "miseventos=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let output_format = output::OutputFormat::from_str(&cli.output);

    let config = ClientConfig::from_env().with_base_url(&cli.api_url);
    let client = Client::new(&config).context("Failed to build HTTP client")?;

    let mut workspace = Workspace::open(&cli.workspace)?;
    if let Some(cookies) = workspace.cookies() {
        client.restore_cookies(&cookies);
    }
    tracing::debug!(api_url = %client.base_url(), workspace = %workspace.dir().display(), "Starting");

    let result = run(cli.command, &client, &mut workspace, output_format, cli.quiet).await;

    // Drafts are saved even when the command failed: validation errors are
    // recorded on the records themselves
    finish(result, workspace.save())
}

/// The command's own error wins; a save failure is attached to it
fn finish(result: Result<()>, saved: Result<()>) -> Result<()> {
    match (result, saved) {
        (Err(err), Err(save_err)) => {
            Err(err.context(format!("Workspace could not be saved either: {save_err:#}")))
        }
        (result, saved) => result.and(saved),
    }
}

async fn run(
    command: Commands,
    client: &Client,
    workspace: &mut Workspace,
    output: output::OutputFormat,
    quiet: bool,
) -> Result<()> {
    let drafts = &mut workspace.drafts;

    match command {
        Commands::Events { command } => {
            commands::drafts::run(command, &mut drafts.events, client, output, quiet).await
        }
        Commands::Speakers { command } => {
            commands::drafts::run(command, &mut drafts.speakers, client, output, quiet).await
        }
        Commands::Sessions { command } => {
            commands::drafts::run(command, &mut drafts.sessions, client, output, quiet).await
        }
        Commands::Schedules { command } => {
            commands::schedules::run(command, &mut drafts.schedules, client, output, quiet).await
        }
        Commands::Users { command } => {
            commands::drafts::run(command, &mut drafts.users, client, output, quiet).await
        }
        Commands::Assignments { command } => commands::assignments::run(command, output, quiet),
        Commands::Auth { command } => {
            commands::auth::run(command, client, workspace, output, quiet).await
        }
        Commands::Signup { email, password } => {
            commands::auth::signup(client, &email, &password, output, quiet).await
        }
        Commands::Discover { page, limit } => {
            commands::attendee::discover(client, &mut drafts.registrations, page, limit, output)
                .await
        }
        Commands::Attend { event, session } => {
            commands::attendee::attend(
                client,
                &mut drafts.registrations,
                &event,
                &session,
                output,
                quiet,
            )
            .await
        }
        Commands::Leave { session } => {
            commands::attendee::leave(client, &mut drafts.registrations, &session, output, quiet)
                .await
        }
    }
}
