//! quotify: a random quote screen for the Linux desktop.
//!
//! Fetches a quote from a ZenQuotes-compatible API and lets the user
//! speak it, copy it, or share it. The `session` controller holds the
//! screen's state; `platform` adapts speech, audio, clipboard, share and
//! notifications; `terminal` and the `quotify-gui` binary are front-ends.

pub mod client;
pub mod config;
pub mod error;
pub mod platform;
pub mod quote;
pub mod session;
pub mod terminal;

#[cfg(test)]
mod testing;
