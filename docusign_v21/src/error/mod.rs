pub mod esign_error;

pub use esign_error::{EsignError, EsignResult};
