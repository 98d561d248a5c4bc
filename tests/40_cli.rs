mod common;

use std::path::Path;

use anyhow::Result;

use authgate::auth::Session;
use authgate::cli::commands::auth::{handle, AuthCommands};
use authgate::cli::config::{load_session_file_from, save_session_file_to, SessionFile};
use authgate::cli::{CliContext, OutputFormat};

/// CLI context talking to `backend_url` with its session file in a fresh directory
fn context(name: &str, backend_url: &str) -> Result<CliContext> {
    let dir = std::env::temp_dir().join(format!("authgate-cli-{}-{}", name, std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
    }
    std::fs::create_dir_all(&dir)?;

    Ok(CliContext {
        output_format: OutputFormat::Text,
        config: common::gate_config(backend_url)?,
        config_dir: dir,
    })
}

fn stored_token(dir: &Path) -> Result<Option<String>> {
    Ok(load_session_file_from(dir)?.token)
}

fn store(dir: &Path, token: &str, api_url: &str) -> Result<()> {
    let mut file = SessionFile::default();
    file.remember(&Session::new(token), api_url);
    save_session_file_to(dir, &file)
}

fn login(username: &str, password: &str) -> AuthCommands {
    AuthCommands::Login {
        username: username.to_string(),
        password: Some(password.to_string()),
    }
}

#[tokio::test]
async fn login_stores_returned_token() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let ctx = context("login-ok", &backend.base_url)?;

    handle(login("ivan", "secret"), &ctx).await?;

    let file = load_session_file_from(&ctx.config_dir)?;
    assert_eq!(file.token.as_deref(), Some("abc123"));
    assert_eq!(file.api_url.as_deref(), Some(backend.base_url.as_str()));
    assert!(file.saved_at.is_some());
    Ok(())
}

#[tokio::test]
async fn rejected_login_stores_nothing() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let ctx = context("login-rejected", &backend.base_url)?;

    let err = handle(login("ivan", "wrong"), &ctx).await.expect_err("403 must fail");
    assert!(err.to_string().contains("bad credentials"), "error {}", err);
    assert_eq!(stored_token(&ctx.config_dir)?, None);
    Ok(())
}

#[tokio::test]
async fn expired_session_is_cleared_from_disk_on_401() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let ctx = context("login-expired", &backend.base_url)?;
    store(&ctx.config_dir, "stale", &backend.base_url)?;

    let err = handle(login("ivan", "secret"), &ctx).await.expect_err("401 must fail");
    assert!(err.to_string().contains("/login"), "error {}", err);

    assert_eq!(backend.seen.authorizations(), vec![Some("Bearer stale".to_string())]);
    assert_eq!(stored_token(&ctx.config_dir)?, None);
    Ok(())
}

#[tokio::test]
async fn token_is_stored_only_when_backend_accepts_it() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let ctx = context("token", &backend.base_url)?;

    handle(AuthCommands::Token { token: "fresh".to_string() }, &ctx).await?;
    assert_eq!(stored_token(&ctx.config_dir)?.as_deref(), Some("fresh"));

    // Bare 500 from the backend: previous token stays
    let result = handle(AuthCommands::Token { token: "boom".to_string() }, &ctx).await;
    assert!(result.is_err());
    assert_eq!(stored_token(&ctx.config_dir)?.as_deref(), Some("fresh"));
    Ok(())
}

#[tokio::test]
async fn status_keeps_valid_session() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let ctx = context("status-ok", &backend.base_url)?;
    store(&ctx.config_dir, "abc123", &backend.base_url)?;

    handle(AuthCommands::Status, &ctx).await?;

    assert_eq!(stored_token(&ctx.config_dir)?.as_deref(), Some("abc123"));
    Ok(())
}

#[tokio::test]
async fn status_clears_session_the_backend_expired() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let ctx = context("status-expired", &backend.base_url)?;
    store(&ctx.config_dir, "stale", &backend.base_url)?;

    let result = handle(AuthCommands::Status, &ctx).await;

    assert!(result.is_err());
    assert_eq!(stored_token(&ctx.config_dir)?, None);
    Ok(())
}

#[tokio::test]
async fn status_keeps_token_when_merely_unauthenticated() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let ctx = context("status-nobody", &backend.base_url)?;
    store(&ctx.config_dir, "nobody", &backend.base_url)?;

    let result = handle(AuthCommands::Status, &ctx).await;

    assert!(result.is_err());
    assert_eq!(stored_token(&ctx.config_dir)?.as_deref(), Some("nobody"));
    Ok(())
}

#[tokio::test]
async fn logout_forgets_stored_token() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let ctx = context("logout", &backend.base_url)?;
    store(&ctx.config_dir, "abc123", &backend.base_url)?;

    handle(AuthCommands::Logout, &ctx).await?;

    assert_eq!(stored_token(&ctx.config_dir)?, None);
    assert_eq!(backend.seen.count(), 0);
    Ok(())
}
