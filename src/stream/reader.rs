// =============================================================================
// Record Reader — sentinel-delimited trade records from a line source
// =============================================================================
//
// Lines before the begin marker are ignored.  Lines after it are decoded as
// trade records until the end marker or until the input closes, whichever
// comes first.  Once finished the reader yields nothing, even if more input
// follows the end marker.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::error::IngestError;
use crate::types::TradeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingBegin,
    Streaming,
    Finished,
}

/// How the stream ended.  Only meaningful once the reader has returned `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The end marker was read.
    Marker,
    /// Input closed after the begin marker without an end marker.
    InputClosed,
    /// Input closed before the begin marker was ever seen.
    NeverBegan,
}

/// Lines are handled as raw bytes, so input that is not valid UTF-8 is
/// ignored before the begin marker and is a malformed record after it.
pub struct RecordReader<R> {
    input: R,
    buf: Vec<u8>,
    begin_marker: Vec<u8>,
    end_marker: Vec<u8>,
    phase: Phase,
    line_no: u64,
    end: Option<StreamEnd>,
}

impl<R: AsyncBufRead + Unpin> RecordReader<R> {
    pub fn new(input: R, begin_marker: impl Into<String>, end_marker: impl Into<String>) -> Self {
        Self {
            input,
            buf: Vec::new(),
            begin_marker: begin_marker.into().into_bytes(),
            end_marker: end_marker.into().into_bytes(),
            phase: Phase::AwaitingBegin,
            line_no: 0,
            end: None,
        }
    }

    /// Next item from the stream.
    ///
    /// `Ok(Some(Ok(record)))` is a decoded trade, `Ok(Some(Err(e)))` is a line
    /// that failed to decode (the caller decides whether to continue), and
    /// `Ok(None)` is end-of-stream.  The outer `Err` is an I/O failure.
    pub async fn next_record(
        &mut self,
    ) -> Result<Option<Result<TradeRecord, IngestError>>, IngestError> {
        loop {
            let streaming = match self.phase {
                Phase::Finished => return Ok(None),
                Phase::AwaitingBegin => false,
                Phase::Streaming => true,
            };

            self.buf.clear();
            if self.input.read_until(b'\n', &mut self.buf).await? == 0 {
                self.finish(if streaming {
                    StreamEnd::InputClosed
                } else {
                    StreamEnd::NeverBegan
                });
                return Ok(None);
            }
            self.line_no += 1;
            let line = strip_line_ending(&self.buf);

            if !streaming {
                if line == self.begin_marker.as_slice() {
                    debug!(line = self.line_no, "begin marker found");
                    self.phase = Phase::Streaming;
                }
                continue;
            }

            if line == self.end_marker.as_slice() {
                self.finish(StreamEnd::Marker);
                return Ok(None);
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                debug!(line = self.line_no, "blank line in stream, skipping");
                continue;
            }
            return Ok(Some(parse_record(line, self.line_no)));
        }
    }

    /// `None` while the stream is still open.
    pub fn stream_end(&self) -> Option<StreamEnd> {
        self.end
    }

    /// Number of input lines consumed so far, sentinels included.
    pub fn lines_read(&self) -> u64 {
        self.line_no
    }

    fn finish(&mut self, end: StreamEnd) {
        match end {
            StreamEnd::Marker => debug!(line = self.line_no, "end marker found"),
            StreamEnd::InputClosed => {
                warn!(line = self.line_no, "input closed without end marker, treating as end of stream")
            }
            StreamEnd::NeverBegan => info!("input closed before begin marker, no trades read"),
        }
        self.phase = Phase::Finished;
        self.end = Some(end);
    }
}

/// Drop a trailing `\n` or `\r\n`.
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Decode one stream line.  Missing fields, wrong types and bytes that are not
/// UTF-8 are all malformed.
fn parse_record(line: &[u8], line_no: u64) -> Result<TradeRecord, IngestError> {
    serde_json::from_slice(line).map_err(|e| IngestError::MalformedRecord {
        line: line_no,
        reason: e.to_string(),
    })
}
