//! # Chain Callbacks
//!
//! Progress notifications emitted by chains. Callbacks are for display only and
//! never influence control flow.

use dyn_clone::DynClone;
use std::fmt::Debug;
use std::io::Write;
use tracing::{debug, info};

/// A styling hint attached to progress text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColor {
    Green,
    Yellow,
    Blue,
}

impl TextColor {
    fn ansi_code(self) -> &'static str {
        match self {
            TextColor::Green => "\x1b[32m",
            TextColor::Yellow => "\x1b[33m",
            TextColor::Blue => "\x1b[34m",
        }
    }
}

/// Receives progress text from a chain run.
pub trait ChainCallback: Send + Sync + Debug + DynClone {
    fn on_text(&self, text: &str, color: Option<TextColor>, verbose: bool);
}

dyn_clone::clone_trait_object!(ChainCallback);

/// Routes progress text to `tracing`: `info` when the chain is verbose, `debug` otherwise.
#[derive(Debug, Clone, Default)]
pub struct TracingCallback;

impl ChainCallback for TracingCallback {
    fn on_text(&self, text: &str, color: Option<TextColor>, verbose: bool) {
        if verbose {
            info!(?color, "{text}");
        } else {
            debug!(?color, "{text}");
        }
    }
}

/// Writes progress text to stdout, colored with ANSI escapes. Only active for verbose chains.
#[derive(Debug, Clone, Default)]
pub struct StdoutCallback;

impl ChainCallback for StdoutCallback {
    fn on_text(&self, text: &str, color: Option<TextColor>, verbose: bool) {
        if !verbose {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        // Display only; a closed stdout must not fail the chain.
        let _ = match color {
            Some(color) => write!(stdout, "{}{text}\x1b[0m", color.ansi_code()),
            None => write!(stdout, "{text}"),
        };
        let _ = stdout.flush();
    }
}
