use std::fs::File as LocalFile;
use std::io::Cursor;

use async_trait::async_trait;
use google_drive3::api::File;
use google_drive3::hyper::client::HttpConnector;
use google_drive3::hyper_rustls::HttpsConnector;
use google_drive3::{hyper, hyper_rustls, DriveHub};
use google_drive3::{oauth2, oauth2::authorized_user::AuthorizedUserSecret};

use crate::errors::{ErrorKind, Result, ResultExt};
use crate::upload::{DriveStore, RemoteFile, RemoteFolder, UploadRequest, FOLDER_MIME_TYPE};

const RESPONSE_FIELDS: &str = "id,name,mimeType,parents";
const EMPTY_BODY_MIME_TYPE: &str = "application/octet-stream";

pub struct Drive {
    hub: DriveHub<HttpsConnector<HttpConnector>>,
}

impl Drive {
    pub fn new(hub: DriveHub<HttpsConnector<HttpConnector>>) -> Drive {
        Drive { hub }
    }
}

fn folder_metadata(name: &str, parent_id: &str) -> File {
    File {
        name: Some(name.to_string()),
        mime_type: Some(FOLDER_MIME_TYPE.to_string()),
        parents: Some(vec![parent_id.to_string()]),
        ..Default::default()
    }
}

fn file_metadata(request: &UploadRequest) -> File {
    File {
        name: Some(request.destination_name.clone()),
        mime_type: Some(request.target_mime_type.to_string()),
        parents: Some(request.parent_folder_ids.clone()),
        ..Default::default()
    }
}

/// Parses a media type into the `mime` version `DriveHub` uploads take.
fn media_type(raw: &str) -> Result<mime::Mime> {
    raw.parse::<mime::Mime>()
        .map_err(|_| ErrorKind::RemoteApi(format!("invalid media type {raw}")).into())
}

#[async_trait(?Send)]
impl DriveStore for Drive {
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<RemoteFolder> {
        // Folders carry no content; the create call still goes out as an upload.
        let created = self
            .hub
            .files()
            .create(folder_metadata(name, parent_id))
            .param("fields", RESPONSE_FIELDS)
            .upload(Cursor::new(Vec::new()), media_type(EMPTY_BODY_MIME_TYPE)?)
            .await
            .chain_err(|| ErrorKind::RemoteApi(format!("create folder {name} in {parent_id}")))?
            .1;
        println!("{:?}", created);

        Ok(RemoteFolder {
            id: created.id.ok_or_else(|| {
                ErrorKind::RemoteApi(format!("folder {name} created without an id"))
            })?,
            name: created.name.unwrap_or_else(|| name.to_string()),
            parent_ids: created.parents.unwrap_or_else(|| vec![parent_id.to_string()]),
        })
    }

    async fn upload(&self, request: &UploadRequest, content: LocalFile) -> Result<RemoteFile> {
        let source_mime = media_type(request.source_mime_type)?;

        log::info!("Uploading {} as {}", request.source_path, request.destination_name);
        let created = self
            .hub
            .files()
            .create(file_metadata(request))
            .param("fields", RESPONSE_FIELDS)
            .upload(content, source_mime)
            .await
            .chain_err(|| ErrorKind::RemoteApi(format!("upload {}", request.destination_name)))?
            .1;

        Ok(RemoteFile {
            id: created.id.ok_or_else(|| {
                ErrorKind::RemoteApi(format!("{} uploaded without an id", request.destination_name))
            })?,
            name: created.name.unwrap_or_else(|| request.destination_name.clone()),
            mime_type: created.mime_type.unwrap_or_default(),
        })
    }
}

pub async fn create_drive_hub(
    aus: AuthorizedUserSecret,
) -> Result<DriveHub<HttpsConnector<HttpConnector>>> {
    let authenticator = oauth2::AuthorizedUserAuthenticator::builder(aus)
        .build()
        .await
        .chain_err(|| ErrorKind::Credentials("authorized user secret".to_string()))?;

    Ok(DriveHub::new(
        hyper::Client::builder().build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()
                .https_or_http()
                .enable_http1()
                .enable_http2()
                .build(),
        ),
        authenticator,
    ))
}
