use clap::Parser;
use error_chain::ChainedError;
use log::{error, info};

use csv_to_drive::config::DEFAULT_CONFIG_FILE;
use csv_to_drive::{errors::Result, set_up_logging, upload_csv_files, Settings};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name of the Drive folder created for this run; also the middle part of every CSV file name
    #[arg()]
    folder: String,
}

async fn upload(folder: &str) -> Result<()> {
    let settings = Settings::load(DEFAULT_CONFIG_FILE)?;
    let summary = upload_csv_files(&settings, folder).await?;
    info!("Done: {} files in folder {}", summary.uploaded.len(), summary.folder.id);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    set_up_logging();
    info!("Starting");

    let result = upload(&args.folder).await;
    if let Err(ref e) = result {
        error!("{}", e.display_chain());
        ::std::process::exit(1);
    }
    Ok(())
}
