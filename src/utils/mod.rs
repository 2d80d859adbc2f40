//! Small helpers shared by services and routes.
pub mod email;
pub mod extract;
pub mod html;
pub mod httperror;
pub mod random;
