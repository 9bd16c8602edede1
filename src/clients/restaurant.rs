use tracing::{debug, info, instrument};

use crate::api::ApiClient;
use crate::domain::{MenuItem, MenuItemCreate, MenuItemPatch, Restaurant, RestaurantCreate};
use crate::error::{ApiError, RestaurantError};
use crate::impl_list_and_get;

/// Client for the restaurant directory and owner-side menu administration.
///
/// Customers use the read half to browse; owners additionally create and
/// edit their menu. Permission enforcement lives server-side; a non-owner
/// hitting a write path gets `Forbidden` back.
#[derive(Clone)]
pub struct RestaurantClient {
    api: ApiClient,
}

impl RestaurantClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(fields(name = %create.name), skip(self, create))]
    pub async fn create_restaurant(
        &self,
        create: &RestaurantCreate,
    ) -> Result<Restaurant, RestaurantError> {
        debug!("Sending request");
        match self.api.post("/api/restaurants/", create).await {
            Ok(restaurant) => {
                info!("Restaurant created");
                Ok(restaurant)
            }
            Err(ApiError::BadRequest { detail }) => Err(RestaurantError::Validation(detail)),
            Err(err) => Err(err.into()),
        }
    }

    /// The full menu of one restaurant; input for both the browsing and the
    /// management views.
    #[instrument(fields(restaurant = %restaurant_id), skip(self))]
    pub async fn menu_items(&self, restaurant_id: u64) -> Result<Vec<MenuItem>, RestaurantError> {
        debug!("Sending request");
        self.api
            .get(&format!("/api/restaurants/{restaurant_id}/menu-items/"))
            .await
            .map_err(|err| match err {
                ApiError::NotFound { .. } => RestaurantError::NotFound(restaurant_id),
                err => err.into(),
            })
    }

    #[instrument(fields(restaurant = %restaurant_id, name = %create.name), skip(self, create))]
    pub async fn create_menu_item(
        &self,
        restaurant_id: u64,
        create: &MenuItemCreate,
    ) -> Result<MenuItem, RestaurantError> {
        debug!("Sending request");
        match self
            .api
            .post(&format!("/api/restaurants/{restaurant_id}/menu-items/"), create)
            .await
        {
            Ok(item) => {
                info!("Menu item created");
                Ok(item)
            }
            Err(ApiError::BadRequest { detail }) => Err(RestaurantError::Validation(detail)),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(fields(restaurant = %restaurant_id, item = %item_id), skip(self, patch))]
    pub async fn update_menu_item(
        &self,
        restaurant_id: u64,
        item_id: u64,
        patch: &MenuItemPatch,
    ) -> Result<MenuItem, RestaurantError> {
        debug!("Sending request");
        match self
            .api
            .patch(
                &format!("/api/restaurants/{restaurant_id}/menu-items/{item_id}/"),
                patch,
            )
            .await
        {
            Ok(item) => Ok(item),
            Err(ApiError::NotFound { .. }) => Err(RestaurantError::ItemNotFound(item_id)),
            Err(ApiError::BadRequest { detail }) => Err(RestaurantError::Validation(detail)),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(fields(restaurant = %restaurant_id, item = %item_id), skip(self))]
    pub async fn delete_menu_item(
        &self,
        restaurant_id: u64,
        item_id: u64,
    ) -> Result<(), RestaurantError> {
        debug!("Sending request");
        self.api
            .delete(&format!("/api/restaurants/{restaurant_id}/menu-items/{item_id}/"))
            .await
            .map_err(|err| match err {
                ApiError::NotFound { .. } => RestaurantError::ItemNotFound(item_id),
                err => err.into(),
            })
    }
}

impl_list_and_get!(RestaurantClient, Restaurant, RestaurantError, restaurant, "/api/restaurants/");
