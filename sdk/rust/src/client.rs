use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// JSON envelope wrapping every API response.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// Decoded response plus the transport details callers usually assert on.
#[derive(Debug)]
pub struct ApiReply<T> {
    pub status: StatusCode,
    pub request_id: Option<String>,
    pub body: Envelope<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSubscription {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Partial update; `end_date: Some("")` clears the end date.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateSubscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SumQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_to: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Created {
    pub id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionRecord {
    pub id: String,
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Total {
    pub total: i64,
}

pub struct SubscriptionsClient {
    client: Client,
    base_url: String,
}

impl SubscriptionsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Use a preconfigured `reqwest::Client` (proxies, timeouts, pooling).
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET /health
    pub async fn health(&self) -> Result<ApiReply<serde_json::Value>, reqwest::Error> {
        let resp = self.send(Method::GET, "/health", None::<&()>).await?;
        decode(resp).await
    }

    /// POST /api/v1/subscription
    pub async fn create(&self, req: &CreateSubscription) -> Result<ApiReply<Created>, reqwest::Error> {
        let resp = self.send(Method::POST, "/api/v1/subscription", Some(req)).await?;
        decode(resp).await
    }

    /// GET /api/v1/subscription/{id}
    pub async fn get(&self, id: &str) -> Result<ApiReply<SubscriptionRecord>, reqwest::Error> {
        let resp = self
            .send(Method::GET, &format!("/api/v1/subscription/{id}"), None::<&()>)
            .await?;
        decode(resp).await
    }

    /// PATCH /api/v1/subscription/{id}
    pub async fn update(
        &self,
        id: &str,
        req: &UpdateSubscription,
    ) -> Result<ApiReply<SubscriptionRecord>, reqwest::Error> {
        let resp = self
            .send(Method::PATCH, &format!("/api/v1/subscription/{id}"), Some(req))
            .await?;
        decode(resp).await
    }

    /// DELETE /api/v1/subscription/{id}
    pub async fn delete(&self, id: &str) -> Result<ApiReply<serde_json::Value>, reqwest::Error> {
        let resp = self
            .send(Method::DELETE, &format!("/api/v1/subscription/{id}"), None::<&()>)
            .await?;
        decode(resp).await
    }

    /// POST /api/v1/subscription/sum
    pub async fn sum(&self, query: &SumQuery) -> Result<ApiReply<Total>, reqwest::Error> {
        let resp = self.send(Method::POST, "/api/v1/subscription/sum", Some(query)).await?;
        decode(resp).await
    }

    /// Send an arbitrary body to `path`, e.g. to exercise validation.
    pub async fn raw(
        &self,
        method: Method,
        path: &str,
        body: impl Into<reqwest::Body>,
        request_id: Option<&str>,
    ) -> Result<ApiReply<serde_json::Value>, reqwest::Error> {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Content-Type", "application/json")
            .body(body);
        if let Some(request_id) = request_id {
            builder = builder.header("X-Request-ID", request_id);
        }
        decode(builder.send().await?).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, reqwest::Error> {
        let mut builder = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.send().await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<ApiReply<T>, reqwest::Error> {
    let status = resp.status();
    let request_id = resp
        .headers()
        .get("X-Request-ID")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = resp.json::<Envelope<T>>().await?;
    Ok(ApiReply {
        status,
        request_id,
        body,
    })
}
