//! Expected XML parser configuration and its comparison against live options.

pub mod compare;
pub mod expected;

pub use compare::{compare, Comparison};
pub use expected::{derive, ExpectedConfiguration, XML_PARSER_ID};
