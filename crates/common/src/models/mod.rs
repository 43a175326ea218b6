pub mod notification;
pub mod portfolio;
pub mod trade;

pub use notification::Notification;
pub use portfolio::{AssetAllocation, PortfolioSnapshot};
pub use trade::{ExecutionMode, Side, TradeIntent, TradeRecord, TradeRecordInsert};
