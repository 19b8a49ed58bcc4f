//! Loan Eligibility & Postback Testing API Library
//!
//! This library provides the core functionality for the loan eligibility
//! API: a rule-table eligibility evaluator, SQLite-backed persistence of
//! submissions and postback attempts, and a background sequencer that
//! fires bounded runs of delayed postbacks to tracking endpoints.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `db`: Database connection, pool and schema management.
//! - `eligibility`: Loan eligibility evaluator.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `postback`: Outbound postback client and URL building.
//! - `registry`: Process-wide registry of active test runs.
//! - `sequencer`: Background postback test sequencer.
//! - `storage`: Database storage operations.

pub mod config;
pub mod db;
pub mod eligibility;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod postback;
pub mod registry;
pub mod sequencer;
pub mod storage;
