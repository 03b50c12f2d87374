//! `tracing` output for the browser console.

use std::io;
use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wasm_bindgen::JsValue;

/// Collects one formatted event and hands it to the console method matching
/// its level when dropped.
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf);
        let msg = JsValue::from_str(line.trim_end());
        match self.level {
            Level::ERROR => web_sys::console::error_1(&msg),
            Level::WARN => web_sys::console::warn_1(&msg),
            Level::INFO => web_sys::console::info_1(&msg),
            _ => web_sys::console::debug_1(&msg),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: vec![],
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: vec![],
        }
    }
}

/// Install the console subscriber. Later calls are no-ops.
pub fn init_logging() {
    let console = fmt::layer()
        .with_writer(ConsoleMakeWriter)
        .with_ansi(false)
        // No clock source behind `SystemTime` in the browser.
        .without_time();

    if tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(console)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use std::io::Write;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_init_logging_twice_is_harmless() {
        init_logging();
        init_logging();
        tracing::info!(block = "b1", "logged to the console");
    }

    #[wasm_bindgen_test]
    fn test_writer_buffers_until_dropped() {
        let mut w = ConsoleWriter {
            level: Level::WARN,
            buf: vec![],
        };
        w.write_all(b"first ").expect("buffered");
        w.write_all(b"second\n").expect("buffered");
        assert_eq!(w.buf, b"first second\n");
    }
}
