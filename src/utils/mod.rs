//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `echowire` application.
//!
//! This module centralizes reusable components, such as the store error type
//! and logging setup, to promote code consistency and reduce duplication.

pub mod error;
pub mod logging;
