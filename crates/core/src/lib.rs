//! Core business logic for ripple.

pub mod services;

pub use services::*;
