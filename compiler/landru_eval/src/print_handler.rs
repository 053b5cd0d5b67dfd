//! Destination for `io.print` output.
//!
//! The CLI prints to stdout; tests and embedding hosts capture into a
//! buffer. Enum dispatch keeps the hot path free of vtables.

use std::sync::Arc;

use parking_lot::Mutex;

/// Where printed lines go.
#[derive(Debug)]
pub enum PrintHandler {
    Stdout,
    /// Captures output for later inspection.
    Buffer(Mutex<String>),
    /// Discards everything.
    Silent,
}

impl PrintHandler {
    /// Print a line (with newline).
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout => println!("{msg}"),
            Self::Buffer(buf) => {
                let mut buf = buf.lock();
                buf.push_str(msg);
                buf.push('\n');
            }
            Self::Silent => {}
        }
    }

    /// Captured output. Empty for handlers that don't capture.
    pub fn output(&self) -> String {
        match self {
            Self::Buffer(buf) => buf.lock().clone(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    /// Clear captured output.
    pub fn clear(&self) {
        if let Self::Buffer(buf) = self {
            buf.lock().clear();
        }
    }
}

/// Print handler shared between the engine and the `io` library.
pub type SharedPrintHandler = Arc<PrintHandler>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Stdout)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Buffer(Mutex::new(String::new())))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Silent)
}
