use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use crate::config::DriveConfig;

use super::{StorageError, WorkbookStore};

const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Workbook hosted in Google Drive, addressed by a fixed file name and
/// accessed with a service account. Tokens are minted per persistence
/// attempt; contact-form traffic is far too sparse to warrant caching.
pub struct DriveStore {
    config: DriveConfig,
    client: reqwest::Client,
    /// File id discovered by `load`, reused by the `store` of the same
    /// write cycle so we overwrite rather than re-search.
    file_id: Mutex<Option<String>>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(Deserialize)]
struct FileRef {
    id: String,
}

impl DriveStore {
    pub fn new(config: DriveConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build reqwest client"),
            file_id: Mutex::new(None),
        }
    }

    /// Exchange an RS256-signed service-account assertion for an access
    /// token at the OAuth token endpoint.
    async fn access_token(&self) -> Result<String, StorageError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.config.client_email,
            scope: DRIVE_SCOPE,
            aud: &self.config.token_uri,
            iat: now,
            exp: now + 3600,
        };

        let key = EncodingKey::from_rsa_pem(self.config.private_key.as_bytes())
            .map_err(|e| StorageError::Remote(format!("Invalid service account key: {e}")))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| StorageError::Remote(format!("Failed to sign assertion: {e}")))?;

        let resp = self
            .client
            .post(&self.config.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StorageError::Remote(format!("Token request failed: {e}")))?;

        let resp = check(resp, "Token endpoint").await?;
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| StorageError::Remote(format!("Malformed token response: {e}")))?;
        Ok(token.access_token)
    }

    async fn find_file(&self, token: &str) -> Result<Option<String>, StorageError> {
        let query = match &self.config.folder_id {
            Some(folder) => format!(
                "name = '{}' and '{}' in parents and trashed = false",
                self.config.file_name, folder
            ),
            None => format!("name = '{}' and trashed = false", self.config.file_name),
        };

        let resp = self
            .client
            .get(format!("{}/drive/v3/files", self.config.api_base))
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("fields", "files(id, name)")])
            .send()
            .await
            .map_err(|e| StorageError::Remote(format!("File search failed: {e}")))?;

        let resp = check(resp, "File search").await?;
        let list: FileList = resp
            .json()
            .await
            .map_err(|e| StorageError::Remote(format!("Malformed file list: {e}")))?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn download(&self, token: &str, file_id: &str) -> Result<Vec<u8>, StorageError> {
        let resp = self
            .client
            .get(format!("{}/drive/v3/files/{file_id}", self.config.api_base))
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| StorageError::Remote(format!("Download failed: {e}")))?;

        let resp = check(resp, "Download").await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| StorageError::Remote(format!("Download body failed: {e}")))?;
        Ok(bytes.to_vec())
    }

    /// Create the file as metadata only; content follows via the media
    /// upload below. Two plain requests instead of one multipart upload.
    async fn create_file(&self, token: &str) -> Result<String, StorageError> {
        let mut metadata = json!({
            "name": self.config.file_name,
            "mimeType": XLSX_MIME,
        });
        if let Some(folder) = &self.config.folder_id {
            metadata["parents"] = json!([folder]);
        }

        let resp = self
            .client
            .post(format!("{}/drive/v3/files", self.config.api_base))
            .bearer_auth(token)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| StorageError::Remote(format!("File create failed: {e}")))?;

        let resp = check(resp, "File create").await?;
        let file: FileRef = resp
            .json()
            .await
            .map_err(|e| StorageError::Remote(format!("Malformed create response: {e}")))?;
        Ok(file.id)
    }

    async fn upload_content(
        &self,
        token: &str,
        file_id: &str,
        bytes: &[u8],
    ) -> Result<(), StorageError> {
        let resp = self
            .client
            .patch(format!(
                "{}/upload/drive/v3/files/{file_id}",
                self.config.api_base
            ))
            .bearer_auth(token)
            .query(&[("uploadType", "media")])
            .header("Content-Type", XLSX_MIME)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| StorageError::Remote(format!("Upload failed: {e}")))?;

        check(resp, "Upload").await?;
        Ok(())
    }
}

#[async_trait]
impl WorkbookStore for DriveStore {
    fn name(&self) -> &'static str {
        "drive"
    }

    async fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        let token = self.access_token().await?;
        let found = self.find_file(&token).await?;
        *self.file_id.lock().await = found.clone();

        match found {
            Some(id) => Ok(Some(self.download(&token, &id).await?)),
            None => Ok(None),
        }
    }

    async fn store(&self, bytes: &[u8]) -> Result<(), StorageError> {
        let token = self.access_token().await?;

        let cached = self.file_id.lock().await.clone();
        let id = match cached {
            Some(id) => id,
            None => match self.find_file(&token).await? {
                Some(id) => id,
                None => self.create_file(&token).await?,
            },
        };

        self.upload_content(&token, &id, bytes).await?;
        *self.file_id.lock().await = Some(id);
        Ok(())
    }
}

async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response, StorageError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(256)
        .collect::<String>();
    Err(StorageError::Remote(format!("{what} returned {status}: {body}")))
}
