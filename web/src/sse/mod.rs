//! SSE HTTP handler for the web layer.
//!
//! This module contains only the Axum handler for SSE endpoints.
//! The core SSE infrastructure (Manager, ConnectionRegistry, Frame)
//! lives in the `sse` crate so `domain` never depends on `web`.

pub mod handler;
