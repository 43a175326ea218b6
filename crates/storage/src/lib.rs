pub mod db;
pub mod error;
pub mod repositories;

pub use error::StoreError;
pub use repositories::trades_repo::TradeStore;
