//! In-memory writer for capturing debug-mode output.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Thread-safe byte buffer handed to `Logger::debug_to`.
///
/// Clones share the same storage, so a test keeps one clone and passes the
/// other to the logger.
#[derive(Clone, Default)]
pub struct SharedBuf {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuf {
    /// Return the captured output as UTF-8 text.
    #[allow(dead_code)]
    pub fn text(&self) -> String {
        String::from_utf8(self.buffer.lock().expect("SharedBuf mutex poisoned").clone())
            .expect("Buffer contains invalid UTF-8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .expect("SharedBuf mutex poisoned")
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
