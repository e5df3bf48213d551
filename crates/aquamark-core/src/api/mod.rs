//! Byte-buffer surface for front ends.
//!
//! Four operations: [`generate`], [`embed`], [`extract`] and
//! [`verify`]. The caller owns path and temp-file management; everything
//! here takes and returns in-memory values.

pub mod embed;
pub mod extract;
pub mod generate;
pub mod verify;
