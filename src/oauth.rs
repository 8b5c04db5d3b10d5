use std::io::BufRead;
use std::path::Path;

use async_trait::async_trait;
use oauth2::basic::{BasicClient, BasicTokenType};
use oauth2::reqwest::async_http_client;
use oauth2::url::Url;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use serde::Deserialize;

use crate::errors::{ErrorKind, Result, ResultExt};
use crate::token::{AuthorizationFlow, AuthorizationToken};

/// Full read/write access to the user's Drive.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

const STATE_TOKEN: &str = "state-token";
const FALLBACK_REDIRECT_URI: &str = "http://localhost";

#[derive(Deserialize, Debug)]
struct ClientSecretFile {
    installed: Option<ClientCredentials>,
    web: Option<ClientCredentials>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

impl ClientCredentials {
    /// Reads a client secret file as downloaded from the Google Cloud console.
    pub fn read(path: &Path) -> Result<ClientCredentials> {
        let json = std::fs::read_to_string(path)
            .chain_err(|| ErrorKind::Credentials(path.display().to_string()))?;
        ClientCredentials::parse(&json)
            .chain_err(|| ErrorKind::Credentials(path.display().to_string()))
    }

    pub fn parse(json: &str) -> Result<ClientCredentials> {
        let file: ClientSecretFile = serde_json::from_str(json)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "client secret file has no `installed` or `web` section".into())
    }
}

impl ClientCredentials {
    fn oauth_client(&self) -> Result<BasicClient> {
        let redirect_uri =
            self.redirect_uris.first().map(String::as_str).unwrap_or(FALLBACK_REDIRECT_URI);

        let client = BasicClient::new(
            ClientId::new(self.client_id.clone()),
            Some(ClientSecret::new(self.client_secret.clone())),
            AuthUrl::new(self.auth_uri.clone()).chain_err(|| "invalid auth_uri")?,
            Some(TokenUrl::new(self.token_uri.clone()).chain_err(|| "invalid token_uri")?),
        )
        .set_redirect_uri(
            RedirectUrl::new(redirect_uri.to_string()).chain_err(|| "invalid redirect uri")?,
        )
        .set_auth_type(AuthType::RequestBody);
        Ok(client)
    }
}

fn authorization_url(client: &BasicClient) -> Url {
    let (url, _) = client
        .authorize_url(|| CsrfToken::new(STATE_TOKEN.to_string()))
        .add_scope(Scope::new(DRIVE_SCOPE.to_string()))
        .add_extra_param("access_type", "offline")
        .url();
    url
}

/// Prints the consent URL and reads the returned authorization code from `input`.
///
/// The OAuth client is only built once `authorize` runs.
pub struct ConsoleAuthorization<R> {
    credentials: ClientCredentials,
    input: R,
}

impl<R: BufRead> ConsoleAuthorization<R> {
    pub fn new(credentials: &ClientCredentials, input: R) -> ConsoleAuthorization<R> {
        ConsoleAuthorization { credentials: credentials.clone(), input }
    }

    pub fn authorization_url(&self) -> Result<Url> {
        Ok(authorization_url(&self.client()?))
    }

    fn client(&self) -> Result<BasicClient> {
        self.credentials
            .oauth_client()
            .chain_err(|| ErrorKind::Credentials(self.credentials.client_id.clone()))
    }

    fn read_code(&mut self) -> Result<String> {
        let mut line = String::new();
        self.input.read_line(&mut line).chain_err(|| {
            ErrorKind::AuthorizationExchange("unable to read authorization code".to_string())
        })?;
        let code = line.trim();
        if code.is_empty() {
            let reason = "no authorization code entered".to_string();
            return Err(ErrorKind::AuthorizationExchange(reason).into());
        }
        Ok(code.to_string())
    }
}

#[async_trait(?Send)]
impl<R: BufRead> AuthorizationFlow for ConsoleAuthorization<R> {
    async fn authorize(&mut self) -> Result<AuthorizationToken> {
        let client = self.client()?;
        println!(
            "Go to the following link in your browser then type the authorization code: \n{}",
            authorization_url(&client)
        );

        let code = self.read_code()?;
        let response = client
            .exchange_code(AuthorizationCode::new(code))
            .request_async(async_http_client)
            .await
            .chain_err(|| ErrorKind::AuthorizationExchange("code exchange rejected".to_string()))?;

        let refresh_token = response.refresh_token().ok_or_else(|| {
            ErrorKind::AuthorizationExchange("response carried no refresh token".to_string())
        })?;
        let token_type = match response.token_type() {
            BasicTokenType::Bearer => "Bearer".to_string(),
            BasicTokenType::Mac => "MAC".to_string(),
            BasicTokenType::Extension(other) => other.clone(),
        };
        log::info!("Authorization code exchanged for a {} token", token_type);

        Ok(AuthorizationToken {
            access_token: response.access_token().secret().clone(),
            token_type,
            refresh_token: refresh_token.secret().clone(),
            expiry: response
                .expires_in()
                .and_then(|lifetime| chrono::Duration::from_std(lifetime).ok())
                .map(|lifetime| chrono::Utc::now() + lifetime),
        })
    }
}
