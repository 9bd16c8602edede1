//! Client library for the Cravings food-ordering backend.
//!
//! Customers browse restaurant menus, keep a cart against the remote source
//! of truth and check out; restaurant managers administer their menu and
//! hand orders to delivery crew; crew members work a FIFO delivery queue.
//! Every screen of a frontend maps onto one of the typed domain clients
//! here; rendering is someone else's job.
//!
//! # Architecture
//!
//! ```text
//! App (session lifecycle, wiring)
//!     |
//!     +-- ApiClient ---- Transport (trait)
//!     |       bearer attach,        |
//!     |       refresh-on-401        +-- HttpTransport (reqwest)
//!     |                             +-- MockTransport (tests)
//!     |
//!     +-- AccountClient      register / login / profile / crew directory
//!     +-- RestaurantClient   directory + owner menu administration
//!     +-- CartClient         command-then-reconcile cart mutations
//!     +-- OrderClient        fulfillment state machine + crew capacity
//!
//! catalog                    pure search / filter / group over menus
//! ```
//!
//! Every mutation returns the authoritative state of the affected aggregate
//! rather than trusting optimistic local math; totals are always recomputed
//! from line items.

pub mod api;
pub mod app;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod session;

#[cfg(test)]
mod mock_framework;

#[cfg(test)]
mod integration_tests;
