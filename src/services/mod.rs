//! Business logic, called by the route handlers.
pub mod access;
pub mod auth;
pub mod managers;
pub mod menu;
pub mod ordering;
pub mod orders;
pub mod qr;
pub mod restaurants;
pub mod seed;
pub mod tables;
