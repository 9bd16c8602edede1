use thiserror::Error;

use crate::domain::OrderStatus;

/// Transport-level failures shared by every domain client.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Malformed response body: {0}")]
    Decode(String),
    #[error("Session expired")]
    Unauthorized,
    #[error("Request rejected: {detail}")]
    BadRequest { detail: String },
    #[error("Permission denied: {detail}")]
    Forbidden { detail: String },
    #[error("Not found: {path}")]
    NotFound { path: String },
    #[error("Unexpected status {status}: {detail}")]
    Status { status: u16, detail: String },
}

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Api error: {0}")]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Error)]
pub enum AccountError {
    #[error("Account validation error: {0}")]
    Validation(String),
    #[error("Api error: {0}")]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Error)]
pub enum RestaurantError {
    #[error("Restaurant not found: {0}")]
    NotFound(u64),
    #[error("Menu item not found: {0}")]
    ItemNotFound(u64),
    #[error("Menu validation error: {0}")]
    Validation(String),
    #[error("Api error: {0}")]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Delivery address is blank")]
    BlankAddress,
    #[error("Cart item not found: {0}")]
    ItemNotFound(u64),
    #[error("Cart rejected: {0}")]
    Rejected(String),
    #[error("Api error: {0}")]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(u64),
    #[error("Cannot {action} an order in status {from}")]
    InvalidTransition {
        from: OrderStatus,
        action: &'static str,
    },
    #[error("Crew member {crew} already has {active} active deliveries (capacity {capacity})")]
    CapacityExceeded { crew: u64, active: u32, capacity: u32 },
    #[error("Delivery crew member not found: {0}")]
    CrewNotFound(u64),
    #[error("Order {0} is not assigned to the current user")]
    NotAssigned(u64),
    #[error("Api error: {0}")]
    Api(#[from] ApiError),
}

impl From<AccountError> for OrderError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Api(api) => OrderError::Api(api),
            AccountError::Validation(detail) => OrderError::Api(ApiError::BadRequest { detail }),
        }
    }
}
