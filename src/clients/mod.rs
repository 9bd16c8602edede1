//! Domain clients over the shared API pipeline.
//!
//! Each client owns one slice of the backend surface: accounts and identity,
//! restaurant administration, the customer cart, and the order lifecycle.
//! They are cheap to clone and share the same [`crate::api::ApiClient`].

pub mod account;
pub mod cart;
pub mod macros;
pub mod order;
pub mod restaurant;

pub use account::AccountClient;
pub use cart::CartClient;
pub use order::{OrderClient, DEFAULT_CREW_CAPACITY};
pub use restaurant::RestaurantClient;
