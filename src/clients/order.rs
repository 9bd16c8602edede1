use std::sync::Arc;

use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::api::ApiClient;
use crate::clients::AccountClient;
use crate::domain::{CrewMember, Order, OrderStatus};
use crate::error::{ApiError, OrderError};

/// Maximum concurrent out-for-delivery orders a crew member may hold before
/// further assignments are refused.
pub const DEFAULT_CREW_CAPACITY: u32 = 3;

/// Client driving the order fulfillment lifecycle.
///
/// Orders advance `Pending -> OutForDelivery -> Delivered`, with
/// `Pending -> Cancelled` as the one side exit. Every transition is guarded
/// before the remote call; a refused transition mutates nothing, locally or
/// remotely. Crew assignment additionally checks the candidate's current
/// load against the capacity threshold, looked up fresh from the crew
/// directory at assignment time.
#[derive(Clone)]
pub struct OrderClient {
    api: ApiClient,
    account: AccountClient,
    current_user: String,
    capacity: u32,
    inner: Arc<OrderState>,
}

struct OrderState {
    orders: RwLock<Vec<Order>>,
}

impl OrderClient {
    pub fn new(api: ApiClient, account: AccountClient, current_user: impl Into<String>) -> Self {
        Self {
            api,
            account,
            current_user: current_user.into(),
            capacity: DEFAULT_CREW_CAPACITY,
            inner: Arc::new(OrderState {
                orders: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Overrides the crew capacity threshold.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Re-fetches the orders visible to the current user.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let orders: Vec<Order> = self.api.get("/api/orders/").await?;
        *self.inner.orders.write().await = orders.clone();
        Ok(orders)
    }

    /// The current snapshot of known orders.
    pub async fn orders(&self) -> Vec<Order> {
        self.inner.orders.read().await.clone()
    }

    /// Known orders in the given status. Pure read over the snapshot.
    pub async fn filter_by_status(&self, status: OrderStatus) -> Vec<Order> {
        self.inner
            .orders
            .read()
            .await
            .iter()
            .filter(|order| order.status == status)
            .cloned()
            .collect()
    }

    /// The delivery queue for the current crew member: their out-for-delivery
    /// orders, oldest first. Pure read over the snapshot.
    pub async fn crew_queue(&self) -> Vec<Order> {
        let mut queue: Vec<Order> = self
            .inner
            .orders
            .read()
            .await
            .iter()
            .filter(|order| {
                order.status == OrderStatus::OutForDelivery
                    && order.delivery_crew_name.as_deref() == Some(self.current_user.as_str())
            })
            .cloned()
            .collect();
        queue.sort_by_key(|order| order.order_date);
        queue
    }

    /// Assigns a crew member to a pending order, moving it out for delivery.
    #[instrument(fields(order = %order_id, crew = %crew_id), skip(self))]
    pub async fn assign_delivery_crew(&self, order_id: u64, crew_id: u64) -> Result<Order, OrderError> {
        let order = self.known_order(order_id).await?;
        if order.status != OrderStatus::Pending {
            error!(status = %order.status, "Order is not awaiting assignment");
            return Err(OrderError::InvalidTransition {
                from: order.status,
                action: "assign",
            });
        }
        let member = self.check_capacity(crew_id).await?;
        info!(crew = %member.username, "Crew member accepted for assignment");
        self.patch_assignment(order_id, crew_id).await
    }

    /// Moves an out-for-delivery order to a different crew member. The
    /// status does not change; the same capacity check applies to the new
    /// member.
    #[instrument(fields(order = %order_id, crew = %crew_id), skip(self))]
    pub async fn reassign_delivery_crew(
        &self,
        order_id: u64,
        crew_id: u64,
    ) -> Result<Order, OrderError> {
        let order = self.known_order(order_id).await?;
        if order.status != OrderStatus::OutForDelivery {
            error!(status = %order.status, "Order is not out for delivery");
            return Err(OrderError::InvalidTransition {
                from: order.status,
                action: "reassign",
            });
        }
        self.check_capacity(crew_id).await?;
        self.patch_assignment(order_id, crew_id).await
    }

    /// Marks an out-for-delivery order as delivered. Only the assigned crew
    /// member may do this; delivered is terminal.
    #[instrument(fields(order = %order_id), skip(self))]
    pub async fn mark_delivered(&self, order_id: u64) -> Result<Order, OrderError> {
        let order = self.known_order(order_id).await?;
        if order.status != OrderStatus::OutForDelivery {
            error!(status = %order.status, "Order is not out for delivery");
            return Err(OrderError::InvalidTransition {
                from: order.status,
                action: "mark delivered",
            });
        }
        if order.delivery_crew_name.as_deref() != Some(self.current_user.as_str()) {
            error!("Order is assigned to someone else");
            return Err(OrderError::NotAssigned(order_id));
        }

        let delivered: Order = self
            .api
            .patch(
                &format!("/api/orders/{order_id}/mark-delivered/"),
                &json!({ "status": "delivered" }),
            )
            .await
            .map_err(|err| Self::map_order_error(order_id, err))?;
        info!("Order delivered");
        self.install(delivered).await
    }

    /// Cancels a pending order. Cancelled is terminal.
    #[instrument(fields(order = %order_id), skip(self))]
    pub async fn cancel_order(&self, order_id: u64) -> Result<Order, OrderError> {
        let order = self.known_order(order_id).await?;
        if order.status != OrderStatus::Pending {
            error!(status = %order.status, "Only pending orders can be cancelled");
            return Err(OrderError::InvalidTransition {
                from: order.status,
                action: "cancel",
            });
        }

        let cancelled: Order = self
            .api
            .patch(&format!("/api/orders/{order_id}/"), &json!({ "status": "cancelled" }))
            .await
            .map_err(|err| Self::map_order_error(order_id, err))?;
        info!("Order cancelled");
        self.install(cancelled).await
    }

    /// Looks the order up in the snapshot, falling back to the backend for
    /// orders not seen yet.
    async fn known_order(&self, order_id: u64) -> Result<Order, OrderError> {
        if let Some(order) = self
            .inner
            .orders
            .read()
            .await
            .iter()
            .find(|order| order.id == order_id)
        {
            return Ok(order.clone());
        }
        debug!(order = order_id, "Order not in snapshot, fetching");
        let order: Order = self
            .api
            .get(&format!("/api/orders/{order_id}/"))
            .await
            .map_err(|err| Self::map_order_error(order_id, err))?;
        self.install(order.clone()).await?;
        Ok(order)
    }

    /// Refuses candidates already loaded past the capacity threshold.
    async fn check_capacity(&self, crew_id: u64) -> Result<CrewMember, OrderError> {
        let crew = self.account.delivery_crew().await?;
        let member = crew
            .into_iter()
            .find(|member| member.id == crew_id)
            .ok_or(OrderError::CrewNotFound(crew_id))?;
        if member.assigned_orders > self.capacity {
            error!(
                active = member.assigned_orders,
                capacity = self.capacity,
                "Crew member is over capacity"
            );
            return Err(OrderError::CapacityExceeded {
                crew: crew_id,
                active: member.assigned_orders,
                capacity: self.capacity,
            });
        }
        Ok(member)
    }

    async fn patch_assignment(&self, order_id: u64, crew_id: u64) -> Result<Order, OrderError> {
        let order: Order = self
            .api
            .patch(
                &format!("/api/orders/{order_id}/assign-delivery/"),
                &json!({ "delivery_crew": crew_id }),
            )
            .await
            .map_err(|err| Self::map_order_error(order_id, err))?;
        info!(status = %order.status, "Assignment confirmed");
        self.install(order).await
    }

    /// Installs the authoritative order returned by a mutation into the
    /// snapshot.
    async fn install(&self, order: Order) -> Result<Order, OrderError> {
        if !order.items.is_empty() {
            let computed = order.computed_total();
            if (order.total - computed).abs() > f64::EPSILON {
                warn!(stored = order.total, computed, "Order total drifted from line items");
            }
        }
        let mut orders = self.inner.orders.write().await;
        match orders.iter_mut().find(|known| known.id == order.id) {
            Some(known) => *known = order.clone(),
            None => orders.push(order.clone()),
        }
        Ok(order)
    }

    fn map_order_error(order_id: u64, err: ApiError) -> OrderError {
        match err {
            ApiError::NotFound { .. } => OrderError::NotFound(order_id),
            err => OrderError::Api(err),
        }
    }

    #[cfg(test)]
    pub(crate) async fn seed(&self, orders: Vec<Order>) {
        *self.inner.orders.write().await = orders;
    }
}
