//! HTTP-backed remote store
//!
//! Thin JSON transport over the store's REST routes. Every response is the
//! standard [`ApiResponse`] envelope; rows are decoded into typed models
//! right here so malformed remote data fails fast at the boundary.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::{BackfillResult, RemoteStore};
use shared::ApiResponse;
use shared::models::{
    DeliveryZone, OpenItem, OpenItemStatus, OrderDraft, OrderReceipt, Settlement, SettlementCreate,
};

/// HTTP client for the remote store
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRemoteStore {
    /// Create a new HTTP store client from configuration
    pub fn new(config: &StoreConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        }
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Make a GET request with optional query parameters
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> StoreResult<T> {
        let mut request = self.client.get(self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(path, response).await
    }

    /// Make a POST request with JSON body
    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> StoreResult<T> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(path, response).await
    }

    /// Make a POST request without body
    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> StoreResult<T> {
        let mut request = self.client.post(self.url(path));
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(path, response).await
    }

    /// Make a POST request whose success response carries no data row
    async fn post_unit<B: serde::Serialize>(&self, path: &str, body: &B) -> StoreResult<()> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(path, %status, "store call failed");
            return match status {
                StatusCode::UNAUTHORIZED => Err(StoreError::Unauthorized),
                StatusCode::FORBIDDEN => Err(StoreError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(StoreError::NotFound(text)),
                _ => Err(StoreError::Rejected(text)),
            };
        }

        let envelope: ApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        if !envelope.is_success() {
            return Err(StoreError::Rejected(envelope.message));
        }
        Ok(())
    }

    /// Map the HTTP status, unwrap the envelope, decode the data row
    async fn handle_response<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> StoreResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(path, %status, "store call failed");
            return match status {
                StatusCode::UNAUTHORIZED => Err(StoreError::Unauthorized),
                StatusCode::FORBIDDEN => Err(StoreError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(StoreError::NotFound(text)),
                _ => Err(StoreError::Rejected(text)),
            };
        }

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        if !envelope.is_success() {
            return Err(StoreError::Rejected(envelope.message));
        }

        envelope
            .data
            .ok_or_else(|| StoreError::Decode(format!("missing data in response from {}", path)))
    }
}

// ========== Response rows ==========

#[derive(Debug, Deserialize)]
struct PriceRow {
    unit_price: f64,
}

#[derive(Debug, Deserialize)]
struct DiscountRow {
    discount_percent: f64,
}

#[derive(Debug, Deserialize)]
struct CreatedId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AutoSettleRow {
    settlement_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PermissionRow {
    granted: bool,
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn get_item_price(
        &self,
        item_id: &str,
        customer_id: Option<&str>,
        quantity: f64,
    ) -> StoreResult<f64> {
        let mut query = vec![("quantity", quantity.to_string())];
        if let Some(cid) = customer_id {
            query.push(("customer_id", cid.to_string()));
        }
        let row: PriceRow = self
            .get(&format!("/api/items/{}/price", item_id), &query)
            .await?;
        Ok(row.unit_price)
    }

    async fn get_item_discount(
        &self,
        item_id: &str,
        customer_id: Option<&str>,
        quantity: f64,
    ) -> StoreResult<f64> {
        let mut query = vec![("quantity", quantity.to_string())];
        if let Some(cid) = customer_id {
            query.push(("customer_id", cid.to_string()));
        }
        let row: DiscountRow = self
            .get(&format!("/api/items/{}/discount", item_id), &query)
            .await?;
        Ok(row.discount_percent)
    }

    async fn list_delivery_zones(&self) -> StoreResult<Vec<DeliveryZone>> {
        self.get("/api/zones", &[]).await
    }

    async fn create_order(&self, draft: &OrderDraft) -> StoreResult<OrderReceipt> {
        self.post("/api/orders", draft).await
    }

    async fn list_party_open_items(
        &self,
        party_id: &str,
        currency: Option<&str>,
        status: Option<OpenItemStatus>,
    ) -> StoreResult<Vec<OpenItem>> {
        let mut query = Vec::new();
        if let Some(c) = currency {
            query.push(("currency", c.to_string()));
        }
        if let Some(s) = status {
            let s = serde_json::to_string(&s)?.trim_matches('"').to_string();
            query.push(("status", s));
        }
        self.get(&format!("/api/parties/{}/open-items", party_id), &query)
            .await
    }

    async fn backfill_party_open_items(&self, party_id: &str) -> StoreResult<BackfillResult> {
        self.post_empty(&format!("/api/parties/{}/open-items/backfill", party_id))
            .await
    }

    async fn create_settlement(&self, req: &SettlementCreate) -> StoreResult<String> {
        let row: CreatedId = self.post("/api/settlements", req).await?;
        Ok(row.id)
    }

    async fn void_settlement(&self, settlement_id: &str, reason: &str) -> StoreResult<()> {
        #[derive(serde::Serialize)]
        struct VoidRequest<'a> {
            reason: &'a str,
        }

        self.post_unit(
            &format!("/api/settlements/{}/void", settlement_id),
            &VoidRequest { reason },
        )
        .await
    }

    async fn auto_settle_party_items(&self, party_id: &str) -> StoreResult<Option<String>> {
        let row: AutoSettleRow = self
            .post_empty(&format!("/api/parties/{}/auto-settle", party_id))
            .await?;
        Ok(row.settlement_id)
    }

    async fn list_party_settlements(&self, party_id: &str) -> StoreResult<Vec<Settlement>> {
        self.get(&format!("/api/parties/{}/settlements", party_id), &[])
            .await
    }

    async fn has_permission(&self, capability: &str) -> StoreResult<bool> {
        let row: PermissionRow = self
            .get("/api/permissions/check", &[("capability", capability.to_string())])
            .await?;
        Ok(row.granted)
    }
}
