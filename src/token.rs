use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorKind, Result, ResultExt};

/// The user's OAuth token as cached between runs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuthorizationToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

/// Obtains a fresh token when none is cached.
#[async_trait(?Send)]
pub trait AuthorizationFlow {
    async fn authorize(&mut self) -> Result<AuthorizationToken>;
}

/// Returns the cached token, or `None` if the file is missing or not a token.
pub fn load(path: &Path) -> Option<AuthorizationToken> {
    let file = File::open(path).ok()?;
    match serde_json::from_reader(BufReader::new(file)) {
        Ok(token) => Some(token),
        Err(e) => {
            log::warn!("Ignoring unreadable token cache {}: {}", path.display(), e);
            None
        }
    }
}

pub fn save(path: &Path, token: &AuthorizationToken) -> Result<()> {
    println!("Saving credential file to: {}", path.display());

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .chain_err(|| ErrorKind::TokenSave(path.display().to_string()))?;
    serde_json::to_writer_pretty(&mut file, token)
        .chain_err(|| ErrorKind::TokenSave(path.display().to_string()))?;
    writeln!(file).chain_err(|| ErrorKind::TokenSave(path.display().to_string()))?;
    Ok(())
}

/// Loads the token cached at `path`, falling back to `flow` and caching its result.
pub async fn load_or_authorize<F>(path: &Path, flow: &mut F) -> Result<AuthorizationToken>
where
    F: AuthorizationFlow + ?Sized,
{
    if let Some(token) = load(path) {
        log::info!("Using cached token from {}", path.display());
        return Ok(token);
    }

    let token = flow.authorize().await?;
    save(path, &token)?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    struct CountingFlow {
        calls: usize,
        token: AuthorizationToken,
    }

    #[async_trait(?Send)]
    impl AuthorizationFlow for CountingFlow {
        async fn authorize(&mut self) -> Result<AuthorizationToken> {
            self.calls += 1;
            Ok(self.token.clone())
        }
    }

    struct FailingFlow;

    #[async_trait(?Send)]
    impl AuthorizationFlow for FailingFlow {
        async fn authorize(&mut self) -> Result<AuthorizationToken> {
            Err(ErrorKind::AuthorizationExchange("invalid_grant".to_string()).into())
        }
    }

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("csv-to-drive-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn token(access: &str) -> AuthorizationToken {
        AuthorizationToken {
            access_token: access.to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: "1//refresh".to_string(),
            expiry: None,
        }
    }

    #[tokio::test]
    async fn cached_token_skips_flow() {
        let dir = scratch_dir();
        let path = dir.join("token.json");
        save(&path, &token("cached")).unwrap();
        let mut flow = CountingFlow { calls: 0, token: token("fresh") };

        let loaded = load_or_authorize(&path, &mut flow).await.unwrap();

        assert_eq!(loaded.access_token, "cached");
        assert_eq!(flow.calls, 0);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn missing_cache_runs_flow_once_and_persists() {
        let dir = scratch_dir();
        let path = dir.join("token.json");
        let mut flow = CountingFlow { calls: 0, token: token("fresh") };

        let obtained = load_or_authorize(&path, &mut flow).await.unwrap();

        assert_eq!(flow.calls, 1);
        assert_eq!(obtained.access_token, "fresh");
        assert_eq!(load(&path), Some(obtained));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn unparsable_cache_is_replaced() {
        let dir = scratch_dir();
        let path = dir.join("token.json");
        std::fs::write(&path, "{ not json").unwrap();
        let mut flow = CountingFlow { calls: 0, token: token("fresh") };

        load_or_authorize(&path, &mut flow).await.unwrap();

        assert_eq!(flow.calls, 1);
        assert_eq!(load(&path).unwrap().access_token, "fresh");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn failed_flow_writes_nothing() {
        let dir = scratch_dir();
        let path = dir.join("token.json");

        let err = load_or_authorize(&path, &mut FailingFlow).await.unwrap_err();

        assert!(matches!(err.kind(), ErrorKind::AuthorizationExchange(_)));
        assert!(!path.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn parses_token_written_by_other_oauth_clients() {
        let json = r#"{"access_token":"ya29.a0","token_type":"Bearer","refresh_token":"1//0g","expiry":"2024-03-01T10:15:00.5+01:00"}"#;

        let token: AuthorizationToken = serde_json::from_str(json).unwrap();

        assert_eq!(token.refresh_token, "1//0g");
        assert_eq!(
            token.expiry.unwrap().to_rfc3339(),
            "2024-03-01T09:15:00.500+00:00"
        );
    }

    #[test]
    fn token_without_refresh_token_is_not_loaded() {
        let dir = scratch_dir();
        let path = dir.join("token.json");
        std::fs::write(&path, r#"{"access_token":"ya29","token_type":"Bearer"}"#).unwrap();

        assert_eq!(load(&path), None);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn saved_token_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = scratch_dir();
        let path = dir.join("token.json");
        save(&path, &token("x")).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let err = save(Path::new("/nonexistent/dir/token.json"), &token("x")).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TokenSave(_)));
    }
}
