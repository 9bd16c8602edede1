pub mod cart;
pub mod menu;
pub mod order;
pub mod restaurant;
pub mod user;

pub use cart::*;
pub use menu::*;
pub use order::*;
pub use restaurant::*;
pub use user::*;
