#![doc = include_str!("../README.md")]
//! Document tree produced by the AEDT project file parser.
//!
//! A parsed file is a [`Document`]: an insertion-ordered map from block and
//! property names to [`Value`]s. Blocks nest as documents. A block name that
//! occurs several times at the same level collapses into a list of
//! documents, so code reading a block key should be ready for either shape
//! ([`Value::documents`] handles both).

mod json;
mod value;

pub use value::{Document, Value};
