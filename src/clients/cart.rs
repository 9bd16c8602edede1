use std::sync::Arc;

use serde_json::json;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::api::ApiClient;
use crate::domain::{Cart, CartItem, Order, OrderCreate};
use crate::error::{ApiError, CartError};

/// Client for the customer's cart, mediating between the displayed snapshot
/// and the remote cart resource.
///
/// Every mutation follows command-then-reconcile: after the write is
/// confirmed, the authoritative cart is re-fetched and replaces the local
/// snapshot, so server-side pricing or rounding changes are absorbed instead
/// of diverging. Mutations serialize behind an operation lock; two
/// overlapping increment gestures cannot double-apply.
#[derive(Clone)]
pub struct CartClient {
    api: ApiClient,
    inner: Arc<CartState>,
}

struct CartState {
    snapshot: RwLock<Cart>,
    op_lock: Mutex<()>,
}

impl CartClient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            inner: Arc::new(CartState {
                snapshot: RwLock::new(Cart::default()),
                op_lock: Mutex::new(()),
            }),
        }
    }

    /// The current snapshot.
    pub async fn cart(&self) -> Cart {
        self.inner.snapshot.read().await.clone()
    }

    /// The current total, always recomputed from line items.
    pub async fn total(&self) -> f64 {
        self.inner.snapshot.read().await.computed_total()
    }

    /// Re-fetches the authoritative cart.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Cart, CartError> {
        let _op = self.inner.op_lock.lock().await;
        self.reconcile().await
    }

    /// Adds a menu item to the cart. If the item is already present, the
    /// existing line's quantity is raised instead of creating a duplicate.
    #[instrument(fields(menu_item = %menu_item_id, quantity = %quantity), skip(self))]
    pub async fn add_item(&self, menu_item_id: u64, quantity: u32) -> Result<Cart, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(i64::from(quantity)));
        }
        let _op = self.inner.op_lock.lock().await;

        let existing = self
            .inner
            .snapshot
            .read()
            .await
            .item_for_menu_item(menu_item_id)
            .cloned();
        match existing {
            Some(line) => {
                debug!(cart_item = line.id, "Menu item already in cart, raising quantity");
                self.api
                    .patch::<_, CartItem>(
                        &format!("/api/cart/items/{}/", line.id),
                        &json!({ "quantity": line.quantity + quantity }),
                    )
                    .await?;
            }
            None => {
                let body = json!({ "menu_item": menu_item_id, "quantity": quantity });
                match self.api.post::<_, CartItem>("/api/cart/items/", &body).await {
                    Ok(_) => {}
                    // The backend refuses mixing restaurants in one cart.
                    Err(ApiError::BadRequest { detail }) => return Err(CartError::Rejected(detail)),
                    Err(err) => return Err(err.into()),
                }
            }
        }
        self.reconcile().await
    }

    /// Applies a signed quantity delta to a cart line. A resulting quantity
    /// below one removes the line entirely; quantity zero is never stored.
    #[instrument(fields(cart_item = %cart_item_id, delta = %delta), skip(self))]
    pub async fn change_quantity(&self, cart_item_id: u64, delta: i64) -> Result<Cart, CartError> {
        let _op = self.inner.op_lock.lock().await;

        let line = self
            .inner
            .snapshot
            .read()
            .await
            .item(cart_item_id)
            .cloned()
            .ok_or(CartError::ItemNotFound(cart_item_id))?;

        let next = i64::from(line.quantity) + delta;
        if next < 1 {
            debug!("Quantity dropped below one, removing line");
            self.delete_line(cart_item_id).await?;
        } else {
            self.api
                .patch::<_, CartItem>(
                    &format!("/api/cart/items/{cart_item_id}/"),
                    &json!({ "quantity": next }),
                )
                .await
                .map_err(|err| match err {
                    ApiError::NotFound { .. } => CartError::ItemNotFound(cart_item_id),
                    err => CartError::from(err),
                })?;
        }
        self.reconcile().await
    }

    /// Removes a cart line. Removing a line that is already gone is a no-op
    /// success.
    #[instrument(fields(cart_item = %cart_item_id), skip(self))]
    pub async fn remove_item(&self, cart_item_id: u64) -> Result<Cart, CartError> {
        let _op = self.inner.op_lock.lock().await;
        self.delete_line(cart_item_id).await?;
        self.reconcile().await
    }

    /// Places an order from the current cart. Validation failures (empty
    /// cart, blank address) never reach the backend. The local cart is
    /// cleared only after the server confirms the order.
    #[instrument(skip(self, address))]
    pub async fn place_order(&self, address: &str) -> Result<Order, CartError> {
        let _op = self.inner.op_lock.lock().await;

        if self.inner.snapshot.read().await.is_empty() {
            return Err(CartError::EmptyCart);
        }
        if address.trim().is_empty() {
            return Err(CartError::BlankAddress);
        }

        let create = OrderCreate {
            delivery_address: address.to_string(),
        };
        let order: Order = match self.api.post("/api/orders/", &create).await {
            Ok(order) => order,
            Err(ApiError::BadRequest { detail }) => return Err(CartError::Rejected(detail)),
            Err(err) => return Err(err.into()),
        };

        // The server cleared the cart as part of order creation.
        *self.inner.snapshot.write().await = Cart::default();
        info!(order = order.id, total = order.total, "Order placed");
        Ok(order)
    }

    async fn delete_line(&self, cart_item_id: u64) -> Result<(), CartError> {
        match self.api.delete(&format!("/api/cart/items/{cart_item_id}/")).await {
            Ok(()) => Ok(()),
            Err(ApiError::NotFound { .. }) => {
                debug!("Cart line already removed");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetches the authoritative cart and installs it as the new snapshot,
    /// recomputing the total from line items.
    async fn reconcile(&self) -> Result<Cart, CartError> {
        let mut cart: Cart = self.api.get("/api/cart/").await?;
        let computed = cart.computed_total();
        if (cart.total - computed).abs() > f64::EPSILON {
            warn!(stored = cart.total, computed, "Cart total drifted from line items, recomputing");
        }
        cart.total = computed;
        *self.inner.snapshot.write().await = cart.clone();
        Ok(cart)
    }

    #[cfg(test)]
    pub(crate) async fn seed(&self, cart: Cart) {
        *self.inner.snapshot.write().await = cart;
    }
}
