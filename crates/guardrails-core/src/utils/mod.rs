//! Utility functions for rule implementations.

pub mod specifier;

#[doc(inline)]
pub use specifier::extract_specifiers;
