//! Row models, one module per table.
pub mod apporder;
pub mod appuser;
pub mod invite;
pub mod manager;
pub mod menu_item;
pub mod menu_section;
pub mod order_item;
pub mod password;
pub mod restaurant;
pub mod table;
