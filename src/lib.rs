//! Lead Verification API Library
//!
//! This library provides the core functionality for the lead verification
//! service: a single-endpoint API that decides whether an inbound marketing
//! lead is genuine, using time-on-page, IP reputation (proxy/VPN/Tor), and
//! geolocation consistency between the submitted U.S. state and the
//! IP-derived state.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `handlers`: HTTP request handlers.
//! - `models`: Request, response, and reputation-API data models.
//! - `reputation`: IPQualityScore client.
//! - `states`: U.S. state reference table and normalization.
//! - `verifier`: The verification decision pipeline.

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod handlers;
pub mod models;
pub mod reputation;
pub mod states;
pub mod verifier;
