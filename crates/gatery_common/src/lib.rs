//! Shared foundational types used across the gatery VHDL back-end crates.
//!
//! This crate provides interned identifiers, frequency values, 4-state
//! logic values, packed logic vectors, exact rational arithmetic, and the
//! common internal-error result type.

#![warn(missing_docs)]

pub mod frequency;
pub mod ident;
pub mod logic;
pub mod logic_vec;
pub mod rational;
pub mod result;

pub use frequency::{Frequency, ParseFrequencyError};
pub use ident::{Ident, Interner};
pub use logic::Logic;
pub use logic_vec::LogicVec;
pub use rational::Rational;
pub use result::{GateryResult, InternalError};
