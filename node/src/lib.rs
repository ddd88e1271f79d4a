//! AnyFee Node
//!
//! Wires the exchange-rate engine into a node: configuration from the
//! environment, the operator request handlers, and startup loading.

pub mod config;
pub mod handlers;
pub mod node;

pub use config::NodeConfig;
pub use handlers::{HandlerError, RatesHandler};
pub use node::FeeRateNode;
