//! webserve - build a web bundle, serve it, and live-reload connected browsers.
//!
//! # Architecture
//!
//! - [`document`] - Document Composer and Asset Inliner
//! - [`build`] - the Build Orchestrator: one build cycle end to end
//! - [`dev`] - HTTP server, reload broadcaster, signal client and watcher
//! - [`config`] - layered configuration resolved into [`config::BuildConfig`]
//! - [`error`] - error types with actionable messages
//! - [`logger`] / [`ui`] - structured logging and terminal output
//!
//! In development mode two processes cooperate: `serve` keeps the HTTP
//! server and the WebSocket clients, while a `watch` subprocess runs a fresh
//! `build` per change. A successful build POSTs to the server's signal
//! route, which pushes `reload` to every open client.

pub mod build;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod document;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{BuildError, CliError, ConfigError, Result};
