//! Email delivery adapters

pub mod smtp;

#[cfg(test)]
pub(crate) mod fake_smtp;
