// Authentication and signup commands

use anyhow::Result;
use clap::Subcommand;

use miseventos_client::Client;

use super::sync_error;
use crate::output::{print_field, OutputFormat};
use crate::workspace::Workspace;

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Sign in and keep the session cookie in the workspace
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "MISEVENTOS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the session cookie
    Logout,

    /// Show the signed-in user
    Me,
}

pub async fn run(
    command: AuthCommand,
    client: &Client,
    workspace: &Workspace,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    match command {
        AuthCommand::Login { email, password } => {
            let user = client.login(&email, &password).await.map_err(sync_error)?;
            if let Some(header) = client.cookie_header() {
                workspace.save_cookies(&header)?;
            }
            if output.is_text() {
                if !quiet {
                    println!("Logged in as {} ({})", user.email, user.role);
                }
            } else {
                output.print_value(&user)?;
            }
            Ok(())
        }
        AuthCommand::Logout => {
            let result = client.logout().await;
            // The local session is dropped even when the backend call fails
            workspace.clear_cookies()?;
            result.map_err(sync_error)?;
            if output.is_text() && !quiet {
                println!("Logged out");
            }
            Ok(())
        }
        AuthCommand::Me => {
            let user = client.me().await.map_err(sync_error)?;
            if !output.is_text() {
                return output.print_value(&user);
            }
            match user {
                Some(user) => {
                    print_field("ID", &user.id);
                    print_field("Email", &user.email);
                    print_field("Role", user.role.as_str());
                }
                None => println!("Not logged in"),
            }
            Ok(())
        }
    }
}

/// Create an attendee account
pub async fn signup(
    client: &Client,
    email: &str,
    password: &str,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let id = client.signup(email, password).await.map_err(sync_error)?;
    if output.is_text() {
        if !quiet {
            match &id {
                Some(id) => println!("Account created: {}", id),
                None => println!("Account created"),
            }
        }
    } else {
        output.print_value(&serde_json::json!({ "email": email.trim(), "id": id }))?;
    }
    Ok(())
}
