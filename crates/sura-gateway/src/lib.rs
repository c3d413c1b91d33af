// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Sura recipe backend.
//!
//! Exposes the streaming chat endpoint, its non-streaming sibling, and the
//! trending-recipe/ingredient REST reads. Every chat failure path resolves
//! to a well-formed (possibly error-flagged) body; nothing propagates to the
//! transport as an unhandled fault.

pub mod handlers;
pub mod server;
pub mod stream;

pub use server::{GatewayState, ServerConfig, router, start_server};
