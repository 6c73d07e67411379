//! # MCF Stats Bot
//!
//! Answers leaderboard and player statistics queries for the weekly MCF
//! Minecraft tournaments over Discord slash commands.
//!
//! ## Architecture
//!
//! - **models**: Tournament weeks, results and aggregated statistics
//! - **storage**: Read-only snapshot access (MySQL, JSONL files)
//! - **calculate**: Leaderboards and per-player reports
//! - **resolver**: UUID to username lookups
//! - **format**: Reply rendering
//! - **commands**: Command parsing and execution
//! - **bot**: Discord gateway adapter
//! - **config**: Configuration loading and validation

pub mod bot;
pub mod calculate;
pub mod commands;
pub mod config;
pub mod format;
pub mod models;
pub mod resolver;
pub mod storage;

pub use models::*;
