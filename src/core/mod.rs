// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core modules.
//!
//! ```text
//!        core
//!         |
//!         v
//!      process
//!         |
//!   Launcher  ChildRegistry
//!   prefix    signal
//! ```

pub mod process;
