//! License server configuration, column subscriptions and usage monitoring.
//!
//! A license server pairs a FlexLM `port@host` address with an optional
//! round-robin usage database. Operators pick which database columns to
//! follow through a checkbox form; usage reads return those columns over a
//! chosen period, and live reads ask the license manager who holds seats.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
