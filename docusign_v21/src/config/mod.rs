pub mod env;

pub use env::{EsignConfig, DEFAULT_AUTH_SERVER, DEFAULT_BASE_PATH};
