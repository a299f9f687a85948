//! # Pilothouse Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per top-level verb. Each defines a clap `Args` struct and an
//! async `handle_*` function taking the parsed arguments and the loaded
//! `Config`; `main.rs` dispatches to them.
//!
//! ## Command Groups
//!
//! - Stack lifecycle: `up`, `down`, `restart`, `logs`, `compose`
//! - Sites: `create`, `delete`, `generate_ssl`, `list`
//! - Tools inside the stack: `mysql`, `wp_cli`
//!

pub mod compose;
/// `create <site>`: provision a site (directory, TLS, vhost, database, WordPress, hosts entry).
pub mod create;
/// `delete <site>`: tear down everything `create` set up.
pub mod delete;
pub mod down;
pub mod generate_ssl;
pub mod list;
pub mod logs;
pub mod mysql;
pub mod restart;
pub mod up;
pub mod wp_cli;
