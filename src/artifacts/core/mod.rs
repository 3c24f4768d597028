//! Shared output plumbing
//!
//! Listings such as `log`, `diff` and `ls` go through the `minus` pager when
//! stdout is a terminal.

use minus::Pager;
use std::io::{self, Write};

/// `Write` adapter feeding the minus pager.
///
/// The pager only accepts text. Bytes are buffered until they form complete
/// UTF-8 sequences; invalid sequences are replaced rather than rejected, so
/// binary file contents can still be paged.
///
/// ```ignore
/// let pager = Pager::new();
/// let mut writer = PagerWriter::new(pager.clone());
/// writeln!(writer, "r01 ...")?;
/// minus::page_all(pager)?;
/// ```
pub struct PagerWriter {
    pager: Pager,
    pending: Vec<u8>,
}

impl PagerWriter {
    pub fn new(pager: Pager) -> Self {
        PagerWriter {
            pager,
            pending: Vec::new(),
        }
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    fn push(&self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.pager.push_str(text).map_err(io::Error::other)
    }
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);

        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                self.push(text)?;
                self.pending.clear();
            }
            // incomplete sequence at the end, keep it for the next write
            Err(error) if error.error_len().is_none() => {
                let valid = error.valid_up_to();
                let text = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.push(&text)?;
                self.pending = self.pending.split_off(valid);
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&self.pending).into_owned();
                self.push(&text)?;
                self.pending.clear();
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let text = String::from_utf8_lossy(&self.pending).into_owned();
            self.push(&text)?;
            self.pending.clear();
        }

        Ok(())
    }
}
