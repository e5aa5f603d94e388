use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body sent on create and update. Absent fields are omitted from the JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl RecordInput {
    pub fn new(name: &str, email: &str, phone_number: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            phone_number: Some(phone_number.to_string()),
        }
    }
}

/// A record as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub created_at: String,
}

/// The service's response envelope, with `data` left as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeView {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl EnvelopeView {
    /// Decode `data` as a single record.
    pub fn record(&self) -> Option<RecordView> {
        self.data.clone().and_then(|v| serde_json::from_value(v).ok())
    }

    /// Decode `data` as a list of records.
    pub fn records(&self) -> Option<Vec<RecordView>> {
        self.data.clone().and_then(|v| serde_json::from_value(v).ok())
    }
}

/// HTTP status plus decoded envelope.
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub status: u16,
    pub body: EnvelopeView,
}

pub struct RecordsClient {
    client: Client,
    base_url: String,
}

impl RecordsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET /api/test
    pub async fn ping(&self) -> Result<ApiReply, Box<dyn std::error::Error>> {
        let resp = self.client.get(self.url("/api/test")).send().await?;
        decode(resp).await
    }

    /// GET /api/records
    pub async fn list(&self) -> Result<ApiReply, Box<dyn std::error::Error>> {
        let resp = self.client.get(self.url("/api/records")).send().await?;
        decode(resp).await
    }

    /// POST /api/records
    pub async fn create(&self, input: &RecordInput) -> Result<ApiReply, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .post(self.url("/api/records"))
            .json(input)
            .send()
            .await?;
        decode(resp).await
    }

    /// POST /api/records with an arbitrary body, for malformed-input cases.
    pub async fn create_raw(&self, body: &str) -> Result<ApiReply, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .post(self.url("/api/records"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await?;
        decode(resp).await
    }

    /// GET /api/records/{id}
    pub async fn get(&self, id: &str) -> Result<ApiReply, Box<dyn std::error::Error>> {
        let resp = self.client.get(self.record_url(id)).send().await?;
        decode(resp).await
    }

    /// PUT /api/records/{id}
    pub async fn update(
        &self,
        id: &str,
        input: &RecordInput,
    ) -> Result<ApiReply, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .put(self.record_url(id))
            .json(input)
            .send()
            .await?;
        decode(resp).await
    }

    /// DELETE /api/records/{id}
    pub async fn delete(&self, id: &str) -> Result<ApiReply, Box<dyn std::error::Error>> {
        let resp = self.client.delete(self.record_url(id)).send().await?;
        decode(resp).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/api/records/{}", self.base_url, id)
    }
}

async fn decode(resp: Response) -> Result<ApiReply, Box<dyn std::error::Error>> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;

    match serde_json::from_str::<EnvelopeView>(&text) {
        Ok(body) => Ok(ApiReply { status, body }),
        Err(e) => Err(format!("Service returned status {} with non-envelope body {:?}: {}", status, text, e).into()),
    }
}
