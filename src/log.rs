//! Console progress logger handed to each component

use colored::Colorize;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Human-readable progress stream.
///
/// Cloning shares the sink; `scoped` adds a label shown before each line.
#[derive(Clone)]
pub struct Logger {
    sink: Sink,
    scope: Option<String>,
}

impl Logger {
    pub fn stdout() -> Self {
        Self::to_writer(io::stdout())
    }

    pub fn to_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
            scope: None,
        }
    }

    /// Logger writing into memory, plus a handle to read back what was written
    pub fn buffer() -> (Self, LogBuffer) {
        let buffer = LogBuffer::default();
        (Self::to_writer(buffer.clone()), buffer)
    }

    pub fn scoped(&self, label: &str) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            scope: Some(label.to_string()),
        }
    }

    pub fn line(&self, text: &str) {
        let text = match &self.scope {
            Some(scope) => format!("{} {}", format!("[{}]", scope).dimmed(), text),
            None => text.to_string(),
        };
        // A poisoned or closed sink only loses progress output
        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink, "{}", text);
            let _ = sink.flush();
        }
    }

    pub fn step(&self, text: &str) {
        self.line(&format!("{} {}", ">>".yellow(), text));
    }

    pub fn success(&self, text: &str) {
        self.line(&format!("  {} {}", "+".green(), text));
    }

    pub fn warn(&self, text: &str) {
        self.line(&format!("  {} {}", "!".yellow(), text));
    }

    pub fn error(&self, text: &str) {
        self.line(&format!("  {} {}", "x".red(), text));
    }

    pub fn rule(&self, width: usize) {
        self.line(&"=".repeat(width).dimmed().to_string());
    }
}

/// Shared in-memory sink
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        }
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut bytes) => {
                bytes.extend_from_slice(buf);
                Ok(buf.len())
            }
            Err(_) => Err(io::Error::new(io::ErrorKind::Other, "log buffer poisoned")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_captures_lines() {
        colored::control::set_override(false);
        let (logger, buffer) = Logger::buffer();
        logger.step("Scraping");
        logger.success("Found 3 flights");

        let out = buffer.contents();
        assert!(out.contains(">> Scraping"));
        assert!(out.contains("+ Found 3 flights"));
    }

    #[test]
    fn test_scoped_shares_sink() {
        colored::control::set_override(false);
        let (logger, buffer) = Logger::buffer();
        let site = logger.scoped("Bookme");
        site.error("timed out");
        logger.line("done");

        let out = buffer.contents();
        assert!(out.contains("[Bookme]"));
        assert!(out.contains("x timed out"));
        assert!(out.contains("done"));
    }
}
