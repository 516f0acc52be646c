//! Bring `#[derive(Reflected)]` to [`structwire`]
//!
//! See the [`#[derive(Reflected)]`](derive@Reflected) documentation for more
//! information.

pub use structwire;
pub use structwire_derive_macros::*;
