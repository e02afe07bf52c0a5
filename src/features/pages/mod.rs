//! Server-rendered admin UI

pub mod handlers;
pub mod routes;
pub mod state;
pub mod templates;
pub mod views;

pub use state::PagesState;
