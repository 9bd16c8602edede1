use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Represents a restaurant in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub owner: u64,
    #[serde(default)]
    pub owner_name: String,
}

/// Payload for creating a new restaurant. The owner is taken from the
/// session on the server side.
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantCreate {
    pub name: String,
    pub description: String,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
}

impl RestaurantCreate {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        opening_time: NaiveTime,
        closing_time: NaiveTime,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            opening_time,
            closing_time,
        }
    }
}
