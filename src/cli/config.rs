use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Session;

const SESSION_FILE: &str = "session.json";

/// Session token persisted between CLI invocations; the terminal's cookie jar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub saved_at: Option<DateTime<Utc>>,
}

impl SessionFile {
    pub fn session(&self) -> Session {
        match &self.token {
            Some(token) => Session::new(token.clone()),
            None => Session::anonymous(),
        }
    }

    pub fn remember(&mut self, session: &Session, api_url: &str) {
        self.token = session.token().map(str::to_string);
        self.api_url = Some(api_url.to_string());
        self.saved_at = Some(Utc::now());
    }

    pub fn forget(&mut self) {
        self.token = None;
        self.saved_at = Some(Utc::now());
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("AUTHGATE_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("authgate").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session_file_from(dir: &Path) -> anyhow::Result<SessionFile> {
    let path = dir.join(SESSION_FILE);

    if !path.exists() {
        return Ok(SessionFile::default());
    }

    let content = fs::read_to_string(path)?;
    let file: SessionFile = serde_json::from_str(&content)?;
    Ok(file)
}

pub fn save_session_file_to(dir: &Path, file: &SessionFile) -> anyhow::Result<()> {
    let path = dir.join(SESSION_FILE);

    let content = serde_json::to_string_pretty(file)?;
    fs::write(&path, content)?;
    restrict_permissions(&path)?;
    Ok(())
}

// Token is a credential: owner read/write only
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
