use tracing::{error, info, Instrument};

use cravings_client::app::{setup_tracing, App};
use cravings_client::catalog::{self, CatalogQuery};
use cravings_client::config::Config;
use cravings_client::domain::OrderStatus;

/// Demo driver: walks one customer session end to end against a configured
/// backend. Set `CRAVINGS_API_URL`, `CRAVINGS_USERNAME` and
/// `CRAVINGS_PASSWORD`; set `CRAVINGS_DEMO_ADDRESS` to actually place an
/// order at the end.
#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let config = Config::load();
    info!(api_url = %config.api_url, "Starting cravings client");

    let (username, password) = match (config.username.clone(), config.password.clone()) {
        (Some(username), Some(password)) => (username, password),
        _ => return Err("CRAVINGS_USERNAME and CRAVINGS_PASSWORD must be set".to_string()),
    };

    let app = App::login(&config, &username, &password)
        .await
        .map_err(|e| e.to_string())?;
    info!(user = %app.session.username(), role = ?app.session.role, "Logged in");

    let span = tracing::info_span!("browse");
    let menu = async {
        let restaurants = app.restaurants.list_restaurants().await.map_err(|e| e.to_string())?;
        info!(count = restaurants.len(), "Fetched restaurant directory");
        let first = restaurants
            .first()
            .ok_or_else(|| "no restaurants available".to_string())?;
        info!(restaurant = %first.name, "Browsing menu");
        app.restaurants.menu_items(first.id).await.map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    let groups = catalog::group_by_category(CatalogQuery::default().apply(&menu));
    for (category, items) in &groups {
        info!(category = %category, items = items.len(), "Menu section");
    }

    let span = tracing::info_span!("cart");
    async {
        let Some(item) = menu.iter().find(|item| item.is_available) else {
            info!("No available items to add, skipping cart demo");
            return Ok(());
        };
        let snapshot = app.cart.add_item(item.id, 1).await.map_err(|e| e.to_string())?;
        info!(items = snapshot.items.len(), total = snapshot.computed_total(), "Added to cart");

        match std::env::var("CRAVINGS_DEMO_ADDRESS") {
            Ok(address) => {
                let order = app.cart.place_order(&address).await.map_err(|e| e.to_string())?;
                info!(order = order.id, total = order.total, "Order placed");
            }
            Err(_) => {
                // Leave no trace behind when not actually ordering.
                let line = snapshot.item_for_menu_item(item.id).map(|line| line.id);
                if let Some(line) = line {
                    app.cart.remove_item(line).await.map_err(|e| e.to_string())?;
                    info!("Cart demo item removed again");
                }
            }
        }
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("orders");
    async {
        match app.orders.refresh().await {
            Ok(orders) => {
                info!(count = orders.len(), "Fetched order history");
                let pending = app.orders.filter_by_status(OrderStatus::Pending).await;
                info!(pending = pending.len(), "Orders awaiting assignment");
            }
            Err(e) => error!(error = %e, "Could not fetch orders"),
        }
    }
    .instrument(span)
    .await;

    app.logout().await;
    info!("Done");
    Ok(())
}
