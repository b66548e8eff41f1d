//! SIM card activation orchestrator.
//!
//! Accepts activation requests for SIM cards, asks an external provisioning
//! actuator to activate each card at most once, and keeps a durable record
//! of every outcome that can be queried afterwards.

pub mod api;
pub mod clients;
pub mod config;
pub mod interfaces;
pub mod record;
pub mod services;
pub mod storage;
pub mod stub;
pub mod utils;
