//! paydoc: parse documents through a pay-per-use HTTP 402 service.
//!
//! The library surface is one operation, [`parse::parse_document`], which
//! runs a single intercepted exchange against the parsing service: send the
//! request, settle the 402 challenge with a signed payment if one comes
//! back, and return the service's output together with the settlement
//! transaction id when a payment actually happened.
//!
//! The payment machinery itself lives in the `paydoc-reqwest` and
//! `paydoc-types` crates; this crate is the thin tool layer around them.

pub mod config;
pub mod parse;
pub mod run;
