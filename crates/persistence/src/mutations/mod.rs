// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic mutation modules.
//!
//! This module contains all state-changing operations for the persistence layer.
//! Most mutations use Diesel DSL and are backend-agnostic, with minimal use of
//! backend-specific helpers (e.g., `last_insert_rowid()` for `SQLite`).
//!
//! ## Module Organization
//!
//! - `users`: User, presence, and session mutations
//! - `categories`: Category creation, renaming, and guarded deletion
//! - `hardware`: Hardware transitions with their history rows
//! - `restore`: Execution of validated backup statements
//!
//! ## Backend-Specific Code
//!
//! Backend-specific helpers (e.g., `get_last_insert_rowid()`) are reached
//! through the `PersistenceBackend` trait. Transaction wrappers that call
//! other generated functions are written out once per backend.

pub mod categories;
pub mod hardware;
pub mod restore;
pub mod users;
