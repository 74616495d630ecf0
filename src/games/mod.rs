//! Game implementations.

pub mod tombola;
