//! # Pilothouse Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces shared by every command:
//! - `config`: configuration loading, overrides and validation
//! - `error`: error types and the `Result` alias
//! - `site`: site naming, layout and the `nginx.conf` reader
//! - `stack`: shipped stack files and custom-config resolution
//! - `templating`: rendering of per-site Nginx server blocks
//!
pub mod config;
pub mod error;
pub mod site;
pub mod stack;
pub mod templating;
