//! Console output seam.

use parking_lot::Mutex;
use std::io::Write;

/// Sink for rendered console output.
///
/// Writes must never fail the caller: diagnostics printing is best-effort by
/// design, so implementations swallow their own IO errors.
pub trait Console: Send + Sync {
    /// Emit one rendered message.
    fn write(&self, text: &str);
}

/// Console over locked stdout.
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn write(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

/// Console that captures output in memory, for tests and embedders that
/// redirect diagnostics.
#[derive(Default)]
pub struct BufferConsole {
    captured: Mutex<String>,
}

impl BufferConsole {
    /// Empty capture buffer.
    pub fn new() -> BufferConsole {
        BufferConsole::default()
    }

    /// Everything written so far.
    pub fn captured(&self) -> String {
        self.captured.lock().clone()
    }

    /// Drop captured output.
    pub fn reset(&self) {
        self.captured.lock().clear();
    }
}

impl Console for BufferConsole {
    fn write(&self, text: &str) {
        self.captured.lock().push_str(text);
    }
}
