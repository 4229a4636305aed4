// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |             exec / options
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |  TOML, LERNA_* env, CLI   |
//!              '-------------+-------------'
//!                            v
//!   +-----------------------------------------------+
//!   |  core::process   Launcher, ChildRegistry,     |
//!   |                  prefix wiring, signals       |
//!   +-----------------------------------------------+
//!   |  foundation      error, logging               |
//!   +-----------------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
