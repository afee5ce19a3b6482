//! Line-oriented text helpers shared by the persisted model readers.
//!
//! Persisted models are plain ASCII: one record per line, fields
//! separated by whitespace. Readers count lines so that
//! [`ModelError`](crate::error::ModelError) can point at the offending one.

use std::io::{self, BufRead};
use std::str::FromStr;

use crate::error::{ModelError, PulseCFError, Result};

/// Reads trimmed lines from a `BufRead`, tracking 1-based line numbers.
pub(crate) struct LineReader<'a, R> {
    reader: &'a mut R,
    line: usize,
    buf: String,
}

impl<'a, R: BufRead> LineReader<'a, R> {
    pub(crate) fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Returns the next line number and its trimmed content, or `None` at
    /// end of stream.
    ///
    /// Invalid UTF-8 is reported as a corrupt model rather than an I/O
    /// failure.
    pub(crate) fn next_line(&mut self) -> Result<Option<(usize, &str)>> {
        self.buf.clear();
        match self.reader.read_line(&mut self.buf) {
            Ok(0) => Ok(None),
            Ok(_) => {
                self.line += 1;
                Ok(Some((self.line, self.buf.trim())))
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                Err(ModelError::invalid_token(self.line + 1, "<non-UTF-8 data>").into())
            }
            Err(e) => Err(PulseCFError::Io(e)),
        }
    }
}

/// Parses one whitespace-delimited field.
pub(crate) fn parse_field<T: FromStr>(token: &str, line: usize) -> std::result::Result<T, ModelError> {
    token
        .parse()
        .map_err(|_| ModelError::invalid_token(line, token))
}
