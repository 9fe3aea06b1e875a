//! tubestat: keyword search analytics for YouTube.
//!
//! The binary in `main.rs` is a thin clap front; everything it drives lives
//! here so integration tests can reach it.

pub mod analytics;
pub mod cli;
pub mod config;
pub mod export;
pub mod metrics;
pub mod pipeline;
pub mod record;
pub mod session;
pub mod summarizer;
pub mod web;
pub mod youtube;
