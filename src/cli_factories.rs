use std::io::Write;

use env_logger::Env;
use yup_oauth2::authorized_user::AuthorizedUserSecret;

use crate::oauth::ClientCredentials;
use crate::token::AuthorizationToken;

pub fn create_aus(
    credentials: &ClientCredentials,
    token: &AuthorizationToken,
) -> AuthorizedUserSecret {
    AuthorizedUserSecret {
        client_id: credentials.client_id.clone(),
        client_secret: credentials.client_secret.clone(),
        refresh_token: token.refresh_token.clone(),
        key_type: "authorized_user".to_string(),
    }
}

pub fn set_up_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combines_client_secret_with_cached_refresh_token() {
        let credentials = ClientCredentials {
            client_id: "id.apps.googleusercontent.com".to_string(),
            client_secret: "secret".to_string(),
            auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            redirect_uris: vec![],
        };
        let token = AuthorizationToken {
            access_token: "ya29".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: "1//refresh".to_string(),
            expiry: None,
        };

        let aus = create_aus(&credentials, &token);

        assert_eq!(aus.client_id, "id.apps.googleusercontent.com");
        assert_eq!(aus.client_secret, "secret");
        assert_eq!(aus.refresh_token, "1//refresh");
    }
}
