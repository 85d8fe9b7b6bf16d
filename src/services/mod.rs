pub mod envelope_api;
pub mod fulfillment;

pub use envelope_api::EnvelopeApi;
pub use fulfillment::{FulfillmentReceipt, TemplateFulfillment};
