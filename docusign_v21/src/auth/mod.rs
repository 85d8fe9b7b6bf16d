pub mod oauth;
pub mod token;
pub mod callback;

pub use oauth::AuthManager;
pub use token::{TokenRecord, TokenStore};
pub use callback::CallbackServer;
