use error_chain::error_chain;


error_chain! {

    types {
        Error, ErrorKind, ResultExt, Result;
    }

    foreign_links {
        GoogleAPI(google_drive3::Error);
        Io(std::io::Error);
        Json(serde_json::Error);
    }

    errors {
        ConfigLoad(path: String) {
            description("configuration could not be read")
            display("Unable to read configuration file {}", path)
        }
        Credentials(source: String) {
            description("client credentials unusable")
            display("Unable to use client credentials from {}", source)
        }
        AuthorizationExchange(reason: String) {
            description("authorization code exchange failed")
            display("Unable to retrieve token from web: {}", reason)
        }
        TokenSave(path: String) {
            description("token could not be cached")
            display("Unable to cache oauth token to {}", path)
        }
        LocalFile(path: String) {
            description("local file could not be opened")
            display("Unable to open {}", path)
        }
        RemoteApi(operation: String) {
            description("drive API call failed")
            display("Drive request failed: {}", operation)
        }
    }
}
