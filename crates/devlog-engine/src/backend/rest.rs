use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::backend::{ObjectStorage, Page, PageRange, PostStore, StorageError, StoreError};
use crate::model::{Document, PostId, PostSummary};

const DOCUMENT_COLUMNS: &str = "title,raw_elements,savedAt";
const SUMMARY_COLUMNS: &str = "id,title,savedAt";

/// Where the hosted backend lives and which table and bucket to use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub bucket: String,
}

/// Posts and images on a Supabase-style service: PostgREST for the table,
/// the storage API for the bucket.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    settings: BackendSettings,
}

#[derive(Deserialize)]
struct InsertedRow {
    id: PostId,
}

impl RestBackend {
    pub fn new(mut settings: BackendSettings) -> Self {
        settings.base_url = settings.base_url.trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.settings.base_url, self.settings.table)
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.settings.base_url, self.settings.bucket, path
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.settings.api_key)
            .header("Authorization", format!("Bearer {}", self.settings.api_key))
    }

    fn by_id(request: RequestBuilder, id: &PostId) -> RequestBuilder {
        request.query(&[("id", format!("eq.{id}"))])
    }
}

/// Turn a non-success response into its status and body text
async fn error_body(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    (status, body)
}

async fn checked(response: Response) -> Result<Response, StoreError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let (status, body) = error_body(response).await;
    error!("Post store returned {status}: {body}");
    Err(StoreError::Status { status, body })
}

/// Total row count from a `Content-Range` header such as `0-9/25` or `*/0`
fn content_range_total(header: Option<&str>) -> Option<usize> {
    header?.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl PostStore for RestBackend {
    async fn fetch(&self, id: &PostId) -> Result<Document, StoreError> {
        debug!("Fetching post {id}");
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", DOCUMENT_COLUMNS)])
            .header("Accept", "application/vnd.pgrst.object+json");
        let response = self
            .authorized(Self::by_id(request, id))
            .send()
            .await?;

        // single-object requests answer 406 when no row matched
        if response.status() == StatusCode::NOT_ACCEPTABLE {
            return Err(StoreError::NotFound(id.clone()));
        }
        let body = checked(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_page(&self, range: PageRange) -> Result<Page<PostSummary>, StoreError> {
        debug!("Fetching posts {}-{}", range.from, range.to);
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", SUMMARY_COLUMNS), ("order", "savedAt.desc")])
            .header("Range-Unit", "items")
            .header("Range", format!("{}-{}", range.from, range.to))
            .header("Prefer", "count=exact");
        let response = self.authorized(request).send().await?;

        let total = content_range_total(
            response
                .headers()
                .get("Content-Range")
                .and_then(|value| value.to_str().ok()),
        );
        // asking past the end of the table is not an error for the list
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(Page {
                total: total.unwrap_or(0),
                rows: Vec::new(),
            });
        }

        let body = checked(response).await?.text().await?;
        let rows: Vec<PostSummary> = serde_json::from_str(&body)?;
        Ok(Page {
            total: total.unwrap_or(rows.len()),
            rows,
        })
    }

    async fn insert(&self, document: &Document) -> Result<PostId, StoreError> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(document);
        let response = self.authorized(request).send().await?;

        let body = checked(response).await?.text().await?;
        let rows: Vec<InsertedRow> = serde_json::from_str(&body)?;
        let id = rows
            .into_iter()
            .next()
            .map(|row| row.id)
            .ok_or(StoreError::MissingId)?;
        debug!("Inserted post {id}");
        Ok(id)
    }

    async fn update(&self, id: &PostId, document: &Document) -> Result<(), StoreError> {
        let request = self.client.patch(self.table_url()).json(document);
        let response = self
            .authorized(Self::by_id(request, id))
            .send()
            .await?;
        checked(response).await?;
        debug!("Updated post {id}");
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<(), StoreError> {
        let request = self.client.delete(self.table_url());
        let response = self
            .authorized(Self::by_id(request, id))
            .send()
            .await?;
        checked(response).await?;
        debug!("Deleted post {id}");
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for RestBackend {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let request = self
            .client
            .post(self.object_url(path))
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes);
        let response = self.authorized(request).send().await?;

        if !response.status().is_success() {
            let (status, body) = error_body(response).await;
            return Err(StorageError::Status { status, body });
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.settings.base_url, self.settings.bucket, path
        )
    }
}
