//! Stripe-oriented column readers for variable-length (string, char and binary) columns.

pub mod read;

#[cfg(test)]
mod tests;
