//! Line sources feeding the read-eval loop, and an in-memory output sink.

use crate::command::Stdout;
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::cell::RefCell;
use std::io::{BufRead, ErrorKind, Result as IoResult, Write};
use std::process::Stdio;
use std::rc::Rc;

/// Source of input lines for the shell loop.
pub trait LineSource {
    /// Show `prompt` and read one line without its terminator.
    ///
    /// Returns `Ok(None)` once input is exhausted.
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> Result<Option<String>>;
}

/// Interactive line editing with in-memory history, backed by [`rustyline`].
///
/// The editor draws the prompt on the terminal itself.
pub struct EditorLines {
    editor: DefaultEditor,
}

impl EditorLines {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorLines {
    fn read_line(&mut self, prompt: &str, _stdout: &mut dyn Write) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            // Ctrl-C abandons the current line only.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(err)) if err.kind() == ErrorKind::InvalidData => {
                log::warn!("discarding undecodable input: {err}");
                Ok(Some(String::new()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Plain buffered reader; prints the prompt to the shell's output.
pub struct PlainLines<R> {
    reader: R,
}

impl<R: BufRead> PlainLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for PlainLines<R> {
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> Result<Option<String>> {
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        // Undecodable bytes become U+FFFD instead of ending the session.
        let line = String::from_utf8_lossy(&buf);
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

/// Memory-backed writer for capturing shell output.
///
/// External programs attached to it get [`Stdio::null`], so only output
/// produced by the shell itself is collected.
#[derive(Clone, Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, decoded lossily.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl Stdout for MemWriter {
    fn stdio(&self) -> IoResult<Stdio> {
        Ok(Stdio::null())
    }

    fn as_write(&mut self) -> &mut dyn Write {
        self
    }
}
