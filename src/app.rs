//! Application wiring: one login produces a session plus the domain clients.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::api::{ApiClient, HttpTransport, Transport};
use crate::clients::{AccountClient, CartClient, OrderClient, RestaurantClient};
use crate::config::Config;
use crate::error::SessionError;
use crate::session::Session;

/// A logged-in application instance.
///
/// Owns the shared API pipeline and hands out the domain clients wired to
/// it. The session context is built here once and injected where needed;
/// nothing reads identity from ambient global state. Dropping the app (or
/// calling [`App::logout`]) ends the session.
pub struct App {
    pub session: Session,
    pub account: AccountClient,
    pub restaurants: RestaurantClient,
    pub cart: CartClient,
    pub orders: OrderClient,
    api: ApiClient,
}

impl App {
    /// Authenticates against the configured backend and wires the clients.
    #[instrument(skip(config, password))]
    pub async fn login(config: &Config, username: &str, password: &str) -> Result<Self, SessionError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.api_url));
        Self::login_with_transport(transport, config.crew_capacity, username, password).await
    }

    /// Same wiring over an arbitrary transport; the tests use this with the
    /// mock transport.
    pub async fn login_with_transport(
        transport: Arc<dyn Transport>,
        crew_capacity: u32,
        username: &str,
        password: &str,
    ) -> Result<Self, SessionError> {
        let api = ApiClient::new(transport);
        let account = AccountClient::new(api.clone());
        let session = account.login(username, password).await?;
        info!(user = %session.username(), role = ?session.role, "Session established");

        let restaurants = RestaurantClient::new(api.clone());
        let cart = CartClient::new(api.clone());
        let orders = OrderClient::new(api.clone(), account.clone(), session.username())
            .with_capacity(crew_capacity);

        Ok(Self {
            session,
            account,
            restaurants,
            cart,
            orders,
            api,
        })
    }

    /// Tears the session down and consumes the app.
    #[instrument(skip(self))]
    pub async fn logout(self) {
        info!(user = %self.session.username(), "Logging out");
        self.api.clear_tokens().await;
    }
}

/// Configure tracing once at application startup for the entire process.
///
/// `RUST_LOG` controls verbosity, e.g. `RUST_LOG=cravings_client=debug`.
pub fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
