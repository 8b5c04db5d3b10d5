use std::fs::File;

use async_trait::async_trait;

use crate::config::Settings;
use crate::errors::{ErrorKind, Result, ResultExt};

pub const SOURCE_MIME_TYPE: &str = "text/csv";
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFolder {
    pub id: String,
    pub name: String,
    pub parent_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub source_path: String,
    pub destination_name: String,
    pub parent_folder_ids: Vec<String>,
    pub source_mime_type: &'static str,
    pub target_mime_type: &'static str,
}

impl UploadRequest {
    /// Builds the request for `entry`, which lives at `<source_dir><entry>.<folder_name>.csv`.
    pub fn for_entry(
        source_dir: &str,
        entry: &str,
        folder_name: &str,
        folder_id: &str,
    ) -> UploadRequest {
        let destination_name = format!("{entry}.{folder_name}.csv");
        UploadRequest {
            source_path: format!("{source_dir}{destination_name}"),
            destination_name,
            parent_folder_ids: vec![folder_id.to_string()],
            source_mime_type: SOURCE_MIME_TYPE,
            target_mime_type: SPREADSHEET_MIME_TYPE,
        }
    }
}

/// The two Drive operations a run needs.
#[async_trait(?Send)]
pub trait DriveStore {
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<RemoteFolder>;

    async fn upload(&self, request: &UploadRequest, content: File) -> Result<RemoteFile>;
}

#[derive(Debug)]
pub struct RunSummary {
    pub folder: RemoteFolder,
    pub uploaded: Vec<RemoteFile>,
}

pub async fn upload_to_drive<S>(store: &S, request: &UploadRequest) -> Result<RemoteFile>
where
    S: DriveStore + ?Sized,
{
    let content = File::open(&request.source_path)
        .chain_err(|| ErrorKind::LocalFile(request.source_path.clone()))?;

    let file = store.upload(request, content).await?;
    println!(" {}, {}, {}", file.name, file.id, file.mime_type);
    Ok(file)
}

/// Creates `folder_name` under the configured parent and uploads every configured file into it.
///
/// Stops at the first failure. Files uploaded before it stay in the new folder.
pub async fn run<S>(store: &S, settings: &Settings, folder_name: &str) -> Result<RunSummary>
where
    S: DriveStore + ?Sized,
{
    let folder = store.create_folder(folder_name, &settings.upload_folder_id).await?;
    log::info!("Created folder {} ({})", folder.name, folder.id);

    let total = settings.file_names.len();
    let mut uploaded = Vec::with_capacity(total);
    for (i, entry) in settings.file_names.iter().enumerate() {
        println!("{} {}", i, entry);
        let request =
            UploadRequest::for_entry(&settings.source_dir, entry, folder_name, &folder.id);
        match upload_to_drive(store, &request).await {
            Ok(file) => uploaded.push(file),
            Err(e) => {
                log::error!(
                    "Aborting: folder {} holds {} of {} files, {} failed",
                    folder.id,
                    uploaded.len(),
                    total,
                    request.destination_name
                );
                return Err(e);
            }
        }
    }

    log::info!("Uploaded {} files into {}", uploaded.len(), folder.id);
    Ok(RunSummary { folder, uploaded })
}
