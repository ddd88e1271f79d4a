//! AnyFee Common Types
//!
//! This crate contains the types shared by the exchange-rate core and the
//! node: asset identifiers and the reference value unit fees are
//! normalized to.

pub mod identifiers;
pub mod monetary;

pub use identifiers::*;
pub use monetary::*;
