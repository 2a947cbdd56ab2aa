//! Order Engine - billing, lifecycle, measurements and message templates for a tailoring shop.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
