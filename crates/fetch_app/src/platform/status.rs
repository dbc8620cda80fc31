use std::io::{self, Write};

use fetch_engine::StatusDisplay;

/// Single-line status display that rewrites itself in place.
pub(crate) struct TerminalStatus<W: Write + Send = io::Stderr> {
    out: W,
    last_len: usize,
    active: bool,
}

impl TerminalStatus {
    pub(crate) fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> TerminalStatus<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            last_len: 0,
            active: false,
        }
    }

    fn redraw(&mut self, message: &str) {
        let pad = self.last_len.saturating_sub(message.chars().count());
        // Status output is best effort; a closed terminal must not end the fetch.
        let _ = write!(self.out, "\r{message}{}", " ".repeat(pad));
        let _ = self.out.flush();
        self.last_len = message.chars().count();
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> StatusDisplay for TerminalStatus<W> {
    fn start(&mut self, message: &str) {
        self.active = true;
        self.redraw(message);
    }

    fn set_message(&mut self, message: &str) {
        if self.active {
            self.redraw(message);
        }
    }

    fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let _ = write!(self.out, "\r{}\r", " ".repeat(self.last_len));
        let _ = self.out.flush();
        self.last_len = 0;
    }
}
