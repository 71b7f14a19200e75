//! UI layer for the order form: app shell and status banner.

pub mod app;
pub mod banner;

pub use app::OrderFormApp;
