//! Foundation types for capshell.
//!
//! This crate contains the types shared by every capshell crate: the error
//! enum, the flag map handed to command handlers, platform-agnostic input
//! events, and the shell configuration.

pub mod config;
pub mod error;
pub mod flags;
pub mod input;
