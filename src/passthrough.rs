//! Synchronous local echo of log calls

use crate::event::{Attribute, LogLevel};
use parking_lot::Mutex;
use std::io::Write;

/// Writes `[LEVEL] message {key=value ...}` lines to a local stream
pub struct Passthrough {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Passthrough {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn write(&self, level: LogLevel, message: &str, attrs: &[Attribute]) {
        let line = format_line(level, message, attrs);
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "{}", line);
        let _ = writer.flush();
    }
}

impl std::fmt::Debug for Passthrough {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Passthrough").finish_non_exhaustive()
    }
}

/// Render a passthrough line; only caller-supplied attributes are shown
pub fn format_line(level: LogLevel, message: &str, attrs: &[Attribute]) -> String {
    let mut line = format!("[{}] {} {{", level, message);
    for attr in attrs {
        line.push_str(&attr.key);
        line.push('=');
        line.push_str(&attr.value);
        line.push(' ');
    }
    line.push('}');
    line
}
