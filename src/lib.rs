use std::io;

use errors::Result;

pub use cli_factories::{create_aus, set_up_logging};
pub use config::Settings;
pub use upload::{run, DriveStore, RunSummary};

pub mod cli_factories;
pub mod config;
pub mod drive;
pub mod errors;
pub mod oauth;
pub mod token;
pub mod upload;

/// Authenticates, then creates `folder_name` and uploads the configured CSVs into it.
pub async fn upload_csv_files(settings: &Settings, folder_name: &str) -> Result<RunSummary> {
    let credentials = oauth::ClientCredentials::read(&settings.credentials_path)?;

    let mut console = oauth::ConsoleAuthorization::new(&credentials, io::stdin().lock());
    let token = token::load_or_authorize(&settings.token_path, &mut console).await?;

    let hub = drive::create_drive_hub(create_aus(&credentials, &token)).await?;
    let drive = drive::Drive::new(hub);

    run(&drive, settings, folder_name).await
}
