//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`mock_transport`] to get a [`Transport`] implementation and a
//! receiver, then drive a client in a spawned task while asserting and
//! answering each captured request with [`expect_request`].
//!
//! # Testing Strategy
//! In tests we don't want a live backend. Instead, the mock transport sends
//! every request to a channel we control, paired with a oneshot responder.
//! The test inspects the request and decides the response, so server
//! behavior (success, rejection, expiry, delays) is simulated
//! deterministically.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};

use crate::api::{ApiClient, ApiRequest, ApiResponse, Method, Transport};
use crate::error::ApiError;
use crate::session::Tokens;

/// A request captured by the mock transport, paired with the channel used
/// to answer it.
pub struct RecordedRequest {
    pub request: ApiRequest,
    respond_to: oneshot::Sender<Result<ApiResponse, ApiError>>,
}

impl RecordedRequest {
    /// Answers with a status code and JSON body.
    pub fn respond(self, status: u16, body: Value) {
        let _ = self.respond_to.send(Ok(ApiResponse { status, body }));
    }

    /// Fails the request at the transport level.
    pub fn fail(self, error: ApiError) {
        let _ = self.respond_to.send(Err(error));
    }
}

pub struct MockTransport {
    sender: mpsc::Sender<RecordedRequest>,
}

/// Creates a mock transport and a receiver for asserting requests.
pub fn mock_transport(buffer_size: usize) -> (MockTransport, mpsc::Receiver<RecordedRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (MockTransport { sender }, receiver)
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(RecordedRequest { request, respond_to })
            .await
            .map_err(|_| ApiError::Network("mock transport closed".to_string()))?;
        response
            .await
            .map_err(|_| ApiError::Network("mock responder dropped".to_string()))?
    }
}

/// An [`ApiClient`] over a mock transport with a token pair already
/// installed, as after a login.
pub async fn authed_client(buffer_size: usize) -> (ApiClient, mpsc::Receiver<RecordedRequest>) {
    let (transport, receiver) = mock_transport(buffer_size);
    let api = ApiClient::new(Arc::new(transport));
    api.set_tokens(Tokens {
        access: "access-token".to_string(),
        refresh: "refresh-token".to_string(),
    })
    .await;
    (api, receiver)
}

/// Receives the next request and asserts its method and path.
pub async fn expect_request(
    receiver: &mut mpsc::Receiver<RecordedRequest>,
    method: Method,
    path: &str,
) -> RecordedRequest {
    let recorded = receiver.recv().await.expect("expected another request");
    assert_eq!(
        recorded.request.method, method,
        "unexpected method for {}",
        recorded.request.path
    );
    assert_eq!(recorded.request.path, path);
    recorded
}

// =============================================================================
// WIRE FIXTURES
// =============================================================================

pub fn cart_item_json(id: u64, menu_item: u64, name: &str, price: f64, quantity: u32) -> Value {
    json!({
        "id": id,
        "menu_item": menu_item,
        "menu_item_name": name,
        "price": price,
        "quantity": quantity,
        "subtotal": price * f64::from(quantity),
    })
}

pub fn cart_json(items: &[Value]) -> Value {
    let total: f64 = items
        .iter()
        .map(|item| item["subtotal"].as_f64().unwrap_or(0.0))
        .sum();
    json!({ "items": items, "total": total })
}

pub fn order_json(id: u64, status: &str, crew: Option<&str>, order_date: &str, total: f64) -> Value {
    json!({
        "id": id,
        "customer_name": "alice",
        "restaurant_name": "Thai Garden",
        "delivery_crew_name": crew,
        "status": status,
        "total": total,
        "delivery_address": "1 Main St",
        "items": [],
        "order_date": order_date,
    })
}

pub fn crew_json(id: u64, username: &str, assigned_orders: u32) -> Value {
    json!({
        "id": id,
        "username": username,
        "first_name": "",
        "last_name": "",
        "assigned_orders": assigned_orders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_transport_round_trip() {
        let (transport, mut receiver) = mock_transport(4);
        let transport = Arc::new(transport);

        let send_task = {
            let transport = transport.clone();
            tokio::spawn(async move {
                transport
                    .execute(ApiRequest {
                        method: Method::Get,
                        path: "/api/cart/".to_string(),
                        body: None,
                        token: None,
                    })
                    .await
            })
        };

        let recorded = expect_request(&mut receiver, Method::Get, "/api/cart/").await;
        recorded.respond(200, cart_json(&[]));

        let response = send_task.await.unwrap().unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body["total"], 0.0);
    }
}
