use std::io::{self, BufRead, Write};

use clap::Subcommand;
use serde_json::{json, Value};

use crate::auth::{verify_status, ApiClient, FetchError, FetchOptions, Navigation, Session};
use crate::cli::config::{load_session_file_from, save_session_file_to, SessionFile};
use crate::cli::utils::{fetch_error_code, output_error, output_navigation, output_success};
use crate::cli::{CliContext, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the backend and store the session token")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (read from stdin if not provided; input is echoed)")]
        password: Option<String>,
    },

    #[command(about = "Send a token to the backend and use it as the session token")]
    Token {
        #[arg(help = "Token value")]
        token: String,
    },

    #[command(about = "Ask the backend whether the stored session is still valid")]
    Status,

    #[command(about = "Forget the stored session token")]
    Logout,
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password: ")?,
            };
            login(ctx, &username, &password).await
        }
        AuthCommands::Token { token } => store_token(ctx, token).await,
        AuthCommands::Status => status(ctx).await,
        AuthCommands::Logout => {
            let mut file = load_session_file_from(&ctx.config_dir)?;
            file.forget();
            save_session_file_to(&ctx.config_dir, &file)?;
            output_success(&ctx.output_format, "Logged out", None)
        }
    }
}

async fn login(ctx: &CliContext, username: &str, password: &str) -> anyhow::Result<()> {
    let client = ApiClient::from_config(&ctx.config)?;
    let mut file = load_session_file_from(&ctx.config_dir)?;
    let mut session = file.session();

    let body = json!({ "username": username, "password": password });
    let result: Result<Value, FetchError> = client
        .fetch_with_auth(&mut session, "/api/auth", FetchOptions::post(&body)?)
        .await;

    let response = match result {
        Ok(response) => response,
        Err(err) => return fail(ctx, &mut file, &session, err),
    };

    match response.get("token").and_then(Value::as_str) {
        Some(token) => {
            session.set_token(token);
            file.remember(&session, &ctx.config.backend.base_url);
            save_session_file_to(&ctx.config_dir, &file)?;
            tracing::info!(username, "session token stored");
            output_success(
                &ctx.output_format,
                &format!("Logged in as {}", username),
                Some(json!({ "authenticated": true })),
            )
        }
        None => output_success(
            &ctx.output_format,
            "Backend accepted the credentials but returned no token",
            Some(json!({ "response": response })),
        ),
    }
}

async fn store_token(ctx: &CliContext, token: String) -> anyhow::Result<()> {
    let client = ApiClient::from_config(&ctx.config)?;
    let mut file = load_session_file_from(&ctx.config_dir)?;
    let mut session = Session::new(token.clone());

    let body = json!({ "token": token });
    let result: Result<Value, FetchError> = client
        .fetch_with_auth(&mut session, "/api/token", FetchOptions::post(&body)?)
        .await;

    match result {
        Ok(response) => {
            file.remember(&session, &ctx.config.backend.base_url);
            save_session_file_to(&ctx.config_dir, &file)?;
            output_success(&ctx.output_format, "Token saved", Some(json!({ "response": response })))
        }
        Err(err) => fail(ctx, &mut file, &session, err),
    }
}

async fn status(ctx: &CliContext) -> anyhow::Result<()> {
    let client = ApiClient::from_config(&ctx.config)?;
    let mut file = load_session_file_from(&ctx.config_dir)?;
    let mut session = file.session();

    let navigation = verify_status(&client, &mut session).await;

    // A 401 during the check already cleared the token
    if session != file.session() {
        file.remember(&session, &ctx.config.backend.base_url);
        save_session_file_to(&ctx.config_dir, &file)?;
    }

    output_navigation(&ctx.output_format, "session", &navigation)?;
    if navigation == Navigation::Proceed {
        return Ok(());
    }
    Err(anyhow::anyhow!("not authenticated"))
}

/// Report a failed call, persisting a cleared token on 401.
/// Text output is left to the binary's error printer.
fn fail(ctx: &CliContext, file: &mut SessionFile, session: &Session, err: FetchError) -> anyhow::Result<()> {
    let message = match err.redirect_target() {
        Some(login_path) => {
            if file.token.is_some() {
                file.remember(session, &ctx.config.backend.base_url);
                save_session_file_to(&ctx.config_dir, file)?;
            }
            format!("not authorized, log in again ({})", login_path)
        }
        None => err.to_string(),
    };

    if let OutputFormat::Json = ctx.output_format {
        output_error(&ctx.output_format, &message, Some(fetch_error_code(&err)))?;
    }

    Err(anyhow::Error::new(err).context(message))
}

fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
