//! HTTP API handlers for ecomind-ui

pub mod buildinfo;
pub mod classify;
pub mod energy;
pub mod health;
pub mod session;
pub mod ui;

pub use buildinfo::get_build_info;
pub use classify::classify_upload;
pub use energy::energy_recommendation;
pub use health::health_routes;
pub use session::{end_session, get_session};
pub use ui::{serve_app_js, serve_index};
