//! REST API backing the LetsOrder QR-code table ordering platform.
pub mod constants;
pub mod db;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod settings;
pub mod state;
pub mod telemetry;
pub mod utils;
