//! `io::Read` adapter over the transcoder.

use std::io::{self, Read};

use crate::error::ParseError;
use crate::transcoder::Transcoder;

fn invalid_data(err: ParseError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

/// Wraps a reader that produces TOML; reading from the wrapper yields the
/// equivalent JSON.
///
/// Input is pulled on demand, so arbitrarily large documents stream
/// without being held in memory. Parse failures (including input that
/// ends inside an unterminated construct) surface as
/// [`io::ErrorKind::InvalidData`] errors carrying the [`ParseError`].
///
/// ```
/// use std::io::Read;
///
/// let toml = "hex = 0xdead_beef";
/// let mut json = String::new();
/// tomljson_core::JsonReader::new(toml.as_bytes())
///     .read_to_string(&mut json)
///     .unwrap();
/// assert_eq!(json, r#"{"hex":3735928559}"#);
/// ```
pub struct JsonReader<R> {
    inner: R,
    transcoder: Transcoder,
    input_done: bool,
}

impl<R: Read> JsonReader<R> {
    pub fn new(inner: R) -> Self {
        JsonReader {
            inner,
            transcoder: Transcoder::new(),
            input_done: false,
        }
    }
}

impl<R: Read> Read for JsonReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while !self.input_done && self.transcoder.buffered() < buf.len() {
            let mut chunk = [0u8; 4096];
            let n = self.inner.read(&mut chunk)?;
            if n == 0 {
                self.input_done = true;
                self.transcoder.end_input();
                break;
            }
            self.transcoder.feed(&chunk[..n]).map_err(invalid_data)?;
        }

        self.transcoder.drain(buf).map_err(invalid_data)
    }
}
