//! Line source for the segmenter
//!
//! Reads physical lines from any [BufRead], strips line terminators and enforces the
//! conversion limits. Each read is a cancellation point.

use std::io::BufRead;

use crate::report::cancel::CancellationToken;
use crate::report::error::ConvertError;

pub struct LineSource<R> {
    reader: R,
    cancellation: CancellationToken,
    max_lines: Option<usize>,
    read: usize,
    done: bool,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R, cancellation: CancellationToken, max_lines: Option<usize>) -> Self {
        Self {
            reader,
            cancellation,
            max_lines,
            read: 0,
            done: false,
        }
    }

    /// Number of lines read so far.
    pub fn lines_read(&self) -> usize {
        self.read
    }

    fn read_line(&mut self) -> Result<Option<String>, ConvertError> {
        self.cancellation.check()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.read += 1;
        if let Some(limit) = self.max_lines {
            if self.read > limit {
                return Err(ConvertError::TooLarge { limit });
            }
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<String, ConvertError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
