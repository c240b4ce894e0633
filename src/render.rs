//! Terminal output for the chat application.
//!
//! Rendering goes through a small trait so the session can stream text to a
//! real terminal in production and to a capturing sink in tests.

use std::io::{self, Stdout, Write};

const ANSI_DIM: &str = "\x1b[2m";
const ANSI_RED: &str = "\x1b[31m";
const ANSI_RESET: &str = "\x1b[0m";

/// Sink for chat output.
pub trait Renderer: Send {
    /// Write a chunk of response text.
    ///
    /// Called once per delta while streaming, or once with the whole reply
    /// for a non-streaming exchange.
    fn print_text(&mut self, text: &str);

    /// Write an error message.
    fn print_error(&mut self, error: &str);

    /// Write an informational message.
    fn print_info(&mut self, info: &str);

    /// Called after the final chunk of a response.
    fn finish_response(&mut self);

    /// Called when the user interrupts a response mid-stream.
    fn print_interrupted(&mut self);
}

/// Renderer that writes to stdout, with errors on stderr.
///
/// ANSI styling can be switched off for piped output.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a renderer with ANSI styling enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a renderer with the given styling setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    // Streamed chunks rarely end in a newline, so flush after every write.
    fn write_and_flush(&mut self, text: &str) {
        let _ = self.stdout.write_all(text.as_bytes());
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_text(&mut self, text: &str) {
        self.write_and_flush(text);
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("\n{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("\nError: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        if self.use_color {
            self.write_and_flush(&format!("{ANSI_DIM}{info}{ANSI_RESET}\n"));
        } else {
            self.write_and_flush(&format!("{info}\n"));
        }
    }

    fn finish_response(&mut self) {
        self.write_and_flush("\n");
    }

    fn print_interrupted(&mut self) {
        self.write_and_flush("\n[interrupted]\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }
}
