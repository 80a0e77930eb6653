//! Shared limits and small numeric helpers.

pub mod validation;
