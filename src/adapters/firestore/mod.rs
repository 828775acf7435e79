pub mod value;

use crate::domain::model::{Document, FieldFilter, Fields, FilterOp};
use crate::domain::ports::DocumentStore;
use crate::utils::error::{BookingError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE: &str = "(default)";

const PAGE_SIZE: &str = "300";

#[derive(Debug, Clone)]
pub struct FirestoreSettings {
    pub base_url: String,
    pub project_id: String,
    pub database: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Cloud Firestore REST v1 客戶端
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: Client,
    settings: FirestoreSettings,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl RawDocument {
    fn into_document(self) -> Result<Document> {
        // name 形如 projects/p/databases/d/documents/reservations/{id}
        let id = self
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| BookingError::malformed(&self.name, "document name has no id"))?
            .to_string();
        let fields =
            value::decode_fields(&self.fields).map_err(|reason| BookingError::malformed(&id, reason))?;
        Ok(Document::new(id, fields))
    }
}

fn operator_name(op: FilterOp) -> &'static str {
    match op {
        FilterOp::LessThan => "LESS_THAN",
    }
}

impl FirestoreStore {
    pub fn new(settings: FirestoreSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &FirestoreSettings {
        &self.settings
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.project_id,
            self.settings.database
        )
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.settings.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });
        Err(BookingError::store(status.as_u16(), message))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        let url = format!("{}/{}", self.documents_url(), collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .with_key(self.client.get(&url))
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            tracing::debug!("Listing '{}' from Firestore", collection);
            let page: ListResponse = Self::check(request.send().await?).await?.json().await?;
            for raw in page.documents {
                documents.push(raw.into_document()?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String> {
        let url = format!("{}/{}", self.documents_url(), collection);
        let body = json!({ "fields": value::encode_fields(&fields) });

        let response = self
            .with_key(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        let created: RawDocument = Self::check(response).await?.json().await?;
        Ok(created.into_document()?.id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let url = format!("{}/{}/{}", self.documents_url(), collection, id);
        let response = self.with_key(self.client.delete(&url)).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_where(&self, collection: &str, filter: &FieldFilter) -> Result<Vec<Document>> {
        let url = format!("{}:runQuery", self.documents_url());
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": filter.field },
                        "op": operator_name(filter.op),
                        "value": value::encode_value(&filter.value),
                    }
                }
            }
        });

        let response = self
            .with_key(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        let items: Vec<RunQueryItem> = Self::check(response).await?.json().await?;

        // 沒有結果時只會回傳帶 readTime 的項目
        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(RawDocument::into_document)
            .collect()
    }
}
