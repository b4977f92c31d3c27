//! Terminal status indicator.

use std::io::{self, Write};
use std::sync::Mutex;

use rates_types::StatusIndicator;

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

/// Writes every status update as a block of lines to `out`.
pub struct ConsoleIndicator<W: Write + Send + 'static> {
    out: Mutex<W>,
}

impl ConsoleIndicator<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + 'static> ConsoleIndicator<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<W: Write + Send + 'static> StatusIndicator for ConsoleIndicator<W> {
    fn set_status(&self, status: &str, tooltip: &str) {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut text = format!("● {status}\n");
        for line in tooltip.lines() {
            text.push_str("  ");
            text.push_str(line);
            text.push('\n');
        }
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            tracing::warn!("Failed to write status: {}", e);
        }
    }

    fn set_icon(&self, icon: &[u8]) {
        if icon.starts_with(PNG_MAGIC) {
            tracing::debug!(bytes = icon.len(), "Icon set");
        } else {
            tracing::warn!(bytes = icon.len(), "Icon does not look like a PNG");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_block_layout() {
        let indicator = ConsoleIndicator::new(Vec::new());
        indicator.set_status(
            "USD: $1.0000 | BRL: R$5.4321",
            "USD: 1.0000 | BRL: 5.4321\nLast: 12:00 | Next: 2 hours",
        );

        let written = String::from_utf8(indicator.into_inner()).unwrap();
        assert_eq!(
            written,
            "● USD: $1.0000 | BRL: R$5.4321\n  USD: 1.0000 | BRL: 5.4321\n  Last: 12:00 | Next: 2 hours\n"
        );
    }
}
