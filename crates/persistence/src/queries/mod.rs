// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `users`: User and session queries, password verification
//! - `categories`: Category lookups and listings with item counts
//! - `hardware`: Hardware lookups, filtered listings, import duplicate detection
//! - `history`: Filtered history log
//! - `dashboard`: Inventory aggregation
//! - `backup`: Full-table reads for SQL backups
//!
//! ## Backend-Specific Functions
//!
//! All query functions are generated in backend-specific monomorphic versions:
//! - Functions suffixed with `_sqlite` for `SQLite`
//! - Functions suffixed with `_mysql` for `MySQL`/`MariaDB`
//!
//! The `Persistence` adapter in `lib.rs` dispatches to the appropriate version
//! based on the active backend connection.

pub mod backup;
pub mod categories;
pub mod dashboard;
pub mod hardware;
pub mod history;
pub mod users;

pub use users::verify_password;
