use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::region::PixelBox;

/// Best-effort JSON-lines trace of the background pass. Write failures are
/// swallowed; tracing never aborts a conversion.
#[derive(Clone)]
pub struct DebugLogger {
    inner: Arc<Mutex<DebugState>>,
}

struct DebugState {
    writer: BufWriter<File>,
    counters: HashMap<String, u64>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(DebugState {
                writer: BufWriter::new(file),
                counters: HashMap::new(),
            })),
        })
    }

    pub fn log_page_background(&self, page_number: u32, bbox: &PixelBox, output_bytes: u64) {
        self.increment("background.pages", 1);
        self.increment("background.bytes", output_bytes);
        if let Ok(mut state) = self.inner.lock() {
            let _ = writeln!(
                state.writer,
                "{{\"type\":\"background.page\",\"page\":{},\"xmin\":{},\"ymin\":{},\"xmax\":{},\"ymax\":{},\"bytes\":{}}}",
                page_number, bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax, output_bytes
            );
        }
    }

    pub fn log_page_skip(&self, page_number: u32) {
        self.increment("background.skipped", 1);
        if let Ok(mut state) = self.inner.lock() {
            let _ = writeln!(
                state.writer,
                "{{\"type\":\"background.skip\",\"page\":{}}}",
                page_number
            );
        }
    }

    fn increment(&self, key: &str, amount: u64) {
        if let Ok(mut state) = self.inner.lock() {
            let entry = state.counters.entry(key.to_string()).or_insert(0);
            *entry = entry.saturating_add(amount);
        }
    }

    pub fn emit_summary(&self) {
        if let Ok(mut state) = self.inner.lock() {
            let mut counters: Vec<(String, u64)> = state.counters.drain().collect();
            counters.sort_by(|a, b| a.0.cmp(&b.0));
            let mut counts = String::from("{");
            for (idx, (key, value)) in counters.iter().enumerate() {
                if idx > 0 {
                    counts.push(',');
                }
                counts.push_str(&format!("\"{}\":{}", key, value));
            }
            counts.push('}');
            let _ = writeln!(
                state.writer,
                "{{\"type\":\"background.summary\",\"counts\":{}}}",
                counts
            );
        }
    }

    pub fn flush(&self) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = state.writer.flush();
        }
    }
}
