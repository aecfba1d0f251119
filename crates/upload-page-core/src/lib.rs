//! Host-side core of the upload page shell.
//!
//! Everything here is plain Rust so it can be exercised natively; the wasm shell in
//! `apps/upload-page/web-shell` binds these pieces to the browser.

pub mod bridge;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod events;
pub mod flags;
pub mod session;
pub mod storage;
pub mod version;
