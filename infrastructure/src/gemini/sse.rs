//! Server-sent events decoder
//!
//! Network chunks do not respect line boundaries, so bytes are buffered until
//! a full line is available. An event is the `data:` lines up to the next
//! blank line, joined with `\n`. Comments and `event:`/`id:`/`retry:` fields
//! are skipped; Gemini only uses the data.

/// Incremental decoder yielding the data of each complete event
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning the data of all events completed by them
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(payload) = self.line(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush the last event when the body ends without a blank line
    pub fn finish(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.buffer);
        if !tail.is_empty() {
            // A non-empty line only accumulates
            let _ = self.line(&tail);
        }
        self.dispatch()
    }

    fn line(&mut self, raw: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            return self.dispatch();
        }
        if let Some(value) = data_value(line) {
            self.data.push(value.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        let payload = std::mem::take(&mut self.data).join("\n");
        if payload.is_empty() {
            None
        } else {
            Some(payload)
        }
    }
}

/// Value of a `data` field, with the single optional leading space removed
fn data_value(line: &str) -> Option<&str> {
    if line == "data" {
        return Some("");
    }
    let value = line.strip_prefix("data:")?;
    Some(value.strip_prefix(' ').unwrap_or(value))
}
