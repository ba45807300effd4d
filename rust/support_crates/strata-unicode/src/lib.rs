//! UTF-8 helpers for values whose encoding has not been verified.

pub mod code_points;
