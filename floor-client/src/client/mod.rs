//! Client module - HTTP transport and the reservation API on top of it.

pub mod api;
pub mod http;

pub use api::{FloorApi, ReservationApi};
pub use http::{HttpClient, NetworkHttpClient};
