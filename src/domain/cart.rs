use serde::{Deserialize, Serialize};

/// One line of a customer's cart. `price` and `menu_item_name` are
/// denormalized from the menu item so the cart renders without extra lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: u64,
    pub menu_item: u64,
    #[serde(default)]
    pub menu_item_name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub subtotal: f64,
}

impl CartItem {
    /// The line subtotal recomputed from price and quantity. The wire
    /// `subtotal` is advisory only.
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// A customer's in-progress cart. Created implicitly server-side on the
/// first add; cleared on successful order placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: f64,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The cart total recomputed from line items, never read from the
    /// stored `total` field.
    pub fn computed_total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn item(&self, cart_item_id: u64) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == cart_item_id)
    }

    /// The line holding the given menu item, if it is already in the cart.
    pub fn item_for_menu_item(&self, menu_item_id: u64) -> Option<&CartItem> {
        self.items.iter().find(|item| item.menu_item == menu_item_id)
    }
}
