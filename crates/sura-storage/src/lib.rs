// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite trending store for the Sura recipe backend.
//!
//! Provides WAL-mode SQLite with embedded migrations, a single-connection
//! concurrency model via `tokio-rusqlite`, and typed read queries for the
//! trending-recipe and trending-ingredient rankings.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::*;
