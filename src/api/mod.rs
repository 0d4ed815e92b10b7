//! API module - form page, generation endpoint, and health

pub mod form;
pub mod handlers;
pub mod page;
pub mod routes;
