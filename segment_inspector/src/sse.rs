//! Incremental reader for the JIRA sync progress stream.
//!
//! The backend answers `/syncWithJira` with `text/event-stream` where every
//! event is a `data: N` line carrying the completed percentage.

const DATA_FIELD: &str = "data:";

#[derive(Debug, Default)]
pub struct ProgressParser {
    pending: String,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes a chunk of the stream and returns the progress values it completed.
    ///
    /// Chunks may split lines anywhere; an unfinished line is kept for the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<u8> {
        self.pending.push_str(&String::from_utf8_lossy(chunk));
        let mut progress = Vec::new();
        while let Some(end) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=end).collect();
            if let Some(value) = parse_data_line(&line) {
                progress.push(value);
            }
        }
        progress
    }

    /// Flushes a final line that arrived without a trailing newline.
    pub fn finish(&mut self) -> Option<u8> {
        let line = std::mem::take(&mut self.pending);
        parse_data_line(&line)
    }
}

fn parse_data_line(line: &str) -> Option<u8> {
    let value = line.trim_end_matches(['\r', '\n']).strip_prefix(DATA_FIELD)?;
    let percent: u32 = value.trim().parse().ok()?;
    Some(percent.min(100) as u8)
}
