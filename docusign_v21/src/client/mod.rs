pub mod api;
pub mod models;

pub use api::EsignClient;
