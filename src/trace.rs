use std::io::{self, Write};

use crate::surface::{EditableSurface, SurfaceError};

/// Editable surface that renders writes live to a terminal.
///
/// Every incoming write is a full replacement; the diff against the
/// previous content is rendered incrementally (append the new suffix, erase
/// removed characters with backspace-space-backspace) so typing and
/// corrections read like a person at a keyboard. A terminal cannot erase
/// across a line boundary, so a backspaced newline leaves the cursor where
/// it is.
pub struct ConsoleSurface<W: Write> {
    out: W,
    text: String,
}

impl ConsoleSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            text: String::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, new_text: &str) -> io::Result<()> {
        let shared = common_prefix_bytes(&self.text, new_text);
        for removed in self.text[shared..].chars().rev() {
            if removed != '\n' {
                self.out.write_all(b"\x08 \x08")?;
            }
        }
        self.out.write_all(new_text[shared..].as_bytes())?;
        self.out.flush()
    }
}

fn common_prefix_bytes(a: &str, b: &str) -> usize {
    let mut idx = 0;
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            break;
        }
        idx += ca.len_utf8();
    }
    idx
}

impl<W: Write> EditableSurface for ConsoleSurface<W> {
    fn read_current_text(&mut self) -> Result<String, SurfaceError> {
        Ok(self.text.clone())
    }

    fn write_text(&mut self, text: &str) -> Result<(), SurfaceError> {
        // A closed output stream means the target is gone.
        self.render(text).map_err(|_| SurfaceError::Detached)?;
        self.text = text.to_string();
        Ok(())
    }

    fn focus_caret_to_end(&mut self) {}

    fn is_multi_line(&self) -> bool {
        true
    }

    fn dispatch_submit_key(&mut self) {}
}
