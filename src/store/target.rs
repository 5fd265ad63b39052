//! Read and write access to the target store: paginated listings, the asset
//! upload endpoint, and entry updates. All calls are bearer-token
//! authenticated and go through the retry primitive.

use crate::error::MigrateError;
use crate::model::{Category, ContentEntry};
use crate::retry::{run_with_retry, truncate_body, AttemptError, RetryClient, RetryPolicy};
use bytes::Bytes;
use reqwest::multipart;
use serde::Deserialize;
use serde_json::{json, Value};

const PAGE_SIZE: u32 = 100;

/// Asset descriptor returned by the upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedAsset {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListPage {
    #[serde(default)]
    data: Vec<ContentEntry>,
    meta: PageMeta,
}

#[derive(Debug, Deserialize)]
struct PageMeta {
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(rename = "pageCount")]
    page_count: u32,
}

#[derive(Clone)]
pub struct TargetStore {
    client: RetryClient,
    base: String,
    token: String,
}

impl TargetStore {
    pub fn new(client: RetryClient, base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into(),
            token: token.into(),
        }
    }

    /// Pages through `GET {base}/api/{category}` with `populate=*` until the
    /// reported page count is reached. A failure on any page aborts the
    /// category as `TargetUnavailable`; entries from earlier pages are
    /// discarded rather than returned as a silently-partial listing.
    pub async fn list_entries(&self, category: Category) -> Result<Vec<ContentEntry>, MigrateError> {
        let url = format!("{}/api/{}", self.base, category.endpoint());
        let mut all = Vec::new();
        let mut page = 1u32;
        loop {
            let query = [
                ("pagination[page]", page.to_string()),
                ("pagination[pageSize]", PAGE_SIZE.to_string()),
                ("populate", "*".to_string()),
            ];
            let parsed: ListPage = self
                .client
                .get_json(&url, &query, Some(&self.token), RetryPolicy::fetch())
                .await
                .map_err(|e| MigrateError::TargetUnavailable {
                    page,
                    source: Box::new(e),
                })?;
            all.extend(parsed.data);
            if page >= parsed.meta.pagination.page_count {
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    /// `POST {base}/api/upload`, multipart form field `files`. The form is
    /// rebuilt for every attempt. Returns the first created descriptor.
    pub async fn upload_asset(
        &self,
        payload: Bytes,
        file_name: &str,
        mime: &str,
    ) -> Result<UploadedAsset, MigrateError> {
        let url = format!("{}/api/upload", self.base);
        run_with_retry(&url, RetryPolicy::upload(), || {
            self.attempt_upload(&url, &payload, file_name, mime)
        })
        .await
    }

    async fn attempt_upload(
        &self,
        url: &str,
        payload: &Bytes,
        file_name: &str,
        mime: &str,
    ) -> Result<UploadedAsset, AttemptError> {
        let part = multipart::Part::stream(payload.clone())
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = multipart::Form::new().part("files", part);
        let resp = self
            .client
            .http()
            .post(url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(AttemptError::Status {
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }
        let assets: Vec<UploadedAsset> = serde_json::from_str(&text).map_err(|_| {
            AttemptError::Decode {
                body: truncate_body(&text),
            }
        })?;
        assets.into_iter().next().ok_or_else(|| AttemptError::Decode {
            body: "empty upload response".into(),
        })
    }

    /// `PUT {base}/api/{category}/{documentId}` with `{ "data": patch }`.
    /// A final non-success response surfaces as `UpdateFailed` with the
    /// target's status and truncated body.
    pub async fn update_entry(
        &self,
        category: Category,
        document_id: &str,
        data: &Value,
    ) -> Result<(), MigrateError> {
        let url = format!("{}/api/{}/{}", self.base, category.endpoint(), document_id);
        let body = json!({ "data": data });
        match run_with_retry(&url, RetryPolicy::upload(), || {
            self.attempt_update(&url, &body)
        })
        .await
        {
            Ok(()) => Ok(()),
            Err(MigrateError::ExhaustedRetries {
                status: Some(status),
                body,
                ..
            }) => Err(MigrateError::UpdateFailed {
                category: category.endpoint().to_string(),
                document_id: document_id.to_string(),
                status,
                body,
            }),
            Err(other) => Err(other),
        }
    }

    async fn attempt_update(&self, url: &str, body: &Value) -> Result<(), AttemptError> {
        let resp = self
            .client
            .http()
            .put(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await?;
            return Err(AttemptError::Status {
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }
        Ok(())
    }
}
