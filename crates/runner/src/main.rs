//! Charforge - builds a character from bundled content and levels it up
//!
//! This crate is the *composition root*: it reads configuration, loads the
//! JSON content library, and drives a character through its levels while
//! logging every attribute sheet.

mod config;
mod content;
mod run;

fn main() -> anyhow::Result<()> {
    run::run()
}
