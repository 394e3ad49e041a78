//! The constraint-propagation core: grid state, the constraint catalog,
//! and the fixed-point driver with its search fallback.

pub mod chess;
pub mod constraint;
pub mod constraints;
pub mod coords;
pub mod factoring;
pub mod grid;
pub mod puzzle;
pub mod stats;
pub mod symbols;
