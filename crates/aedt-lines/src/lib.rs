#![doc = include_str!("../README.md")]
//! Logical line reader for AEDT project files.
//!
//! AEDT writes projects (`.aedt`, `.aedtresults` metadata, archive manifests)
//! as line-oriented text, but large files routinely embed binary payloads
//! between the text blocks. This crate turns the raw bytes into the sequence
//! of *logical* lines the block parser works on:
//!
//! - every raw line is decoded as UTF-8; lines that fail are dropped and
//!   remembered in [`Lines::skipped`],
//! - the leading run of spaces and tabs is stripped,
//! - a line ending in `\` is joined with the line that follows it.
//!
//! A [`Cursor`] is the only position state. It is a plain index that callers
//! pass around explicitly, so a [`Lines`] buffer can be shared freely between
//! concurrent parses.

mod cursor;
pub use cursor::Cursor;

mod lines;
pub use lines::Lines;
