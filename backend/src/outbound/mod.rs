//! Outbound adapters implementing domain ports over infrastructure.

pub mod persistence;
