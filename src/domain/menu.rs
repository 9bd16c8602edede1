use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of menu categories. Shared by the browsing filters and the
/// manager create/edit path so the two can never drift apart. Anything the
/// backend sends outside this set lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Appetizer,
    Main,
    Dessert,
    Beverage,
    #[serde(other)]
    Other,
}

impl Category {
    /// All categories in display order, which is also the grouping order.
    pub const ALL: [Category; 5] = [
        Category::Appetizer,
        Category::Main,
        Category::Dessert,
        Category::Beverage,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Appetizer => "Appetizer",
            Category::Main => "Main Course",
            Category::Dessert => "Dessert",
            Category::Beverage => "Beverage",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Represents a dish or drink on a restaurant's menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    pub restaurant: u64,
    #[serde(default)]
    pub restaurant_name: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default = "default_available")]
    pub is_available: bool,
    pub category: Category,
}

fn default_available() -> bool {
    true
}

/// Payload for creating a new menu item.
#[derive(Debug, Clone, Serialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub is_available: bool,
}

impl MenuItemCreate {
    pub fn new(name: impl Into<String>, price: f64, category: Category) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            category,
            is_available: true,
        }
    }
}

/// Payload for updating an existing menu item.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MenuItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_round_trips_wire_names() {
        let category: Category = serde_json::from_value(json!("beverage")).unwrap();
        assert_eq!(category, Category::Beverage);
        assert_eq!(serde_json::to_value(Category::Appetizer).unwrap(), "appetizer");
    }

    #[test]
    fn unknown_categories_bucket_into_other() {
        // Legacy rows may still carry retired categories such as "side".
        let category: Category = serde_json::from_value(json!("side")).unwrap();
        assert_eq!(category, Category::Other);
    }

    #[test]
    fn menu_item_defaults_to_available() {
        let item: MenuItem = serde_json::from_value(json!({
            "id": 1,
            "restaurant": 2,
            "name": "Pad Thai",
            "price": 11.5,
            "category": "main"
        }))
        .unwrap();
        assert!(item.is_available);
    }
}
