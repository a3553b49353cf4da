//! Core types and trait definitions for Rollcall.
//!
//! No HTTP, image, or database dependencies.
//! Every other crate depends on it: the token encoder consumes
//! [`token::TokenPayload`], storage backends implement the traits in
//! [`store`], and the service layer orchestrates them behind a
//! [`session::SessionGate`].

// Native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod record;
pub mod roster;
pub mod session;
pub mod store;
pub mod token;

pub use error::{Error, Result};
