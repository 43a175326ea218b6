pub mod client;
pub mod error;
pub mod traits;

pub use client::{BitkubClient, sign_payload};
pub use error::ExchangeError;
pub use traits::ExchangeApi;
