//! Core types for HTTP 402 payment handshakes.
//!
//! This crate models the wire format a paying client consumes: the payment
//! requirements a server advertises, the 402 challenge body that carries
//! them, and the settlement receipt returned once a payment has been
//! accepted. It contains no I/O; the HTTP-side handling lives in
//! `paydoc-reqwest`.
//!
//! # Modules
//!
//! - [`amount`] - Token amounts in base units, decimal-string encoded
//! - [`network`] - Network identifiers and canonical-name rewriting
//! - [`proto`] - The 402 challenge body and its payment requirements
//! - [`receipt`] - Settlement receipts from the `X-Payment-Response` header
//! - [`timestamp`] - Unix timestamps for payment authorization windows
//! - [`util`] - Base64 helpers shared across the wire format

pub mod amount;
pub mod network;
pub mod proto;
pub mod receipt;
pub mod timestamp;
pub mod util;
