//! Asynchronous log shipping client
//!
//! Application threads emit leveled, attributed log events; a background
//! worker batches them and delivers each batch as one JSON document over HTTP.

pub mod batcher;
pub mod buffer;
pub mod config;
pub mod errors;
pub mod event;
pub mod passthrough;
pub mod payload;
pub mod sender;
pub mod shipper;
pub mod transport;

pub use batcher::BatcherState;
pub use config::ShipperConfig;
pub use errors::{Result, ShipperError};
pub use event::{Attribute, LogEvent, LogLevel};
pub use shipper::Shipper;
pub use transport::{HttpTransport, Transport};
