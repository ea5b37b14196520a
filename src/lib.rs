//! Month-over-month sales trend classification for manager/client exports.

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod models;
pub mod periods;
pub mod report;

pub use classifier::classify;
pub use config::Config;
pub use error::{Error, InvalidInput, Result};
pub use models::{Classification, ClassifiedRow, SalesRow, Status};
