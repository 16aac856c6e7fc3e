//! Monetary and token quantities.
//!
//! One fixed-point type replaces ad hoc float/big-integer conversions. Parsing
//! and arithmetic report errors instead of substituting zero.

pub mod amount;

pub use amount::{Amount, AmountError, MAX_DECIMALS};
