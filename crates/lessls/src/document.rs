//
// document.rs
//
// Open editor documents and LSP position conversion
//

use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent};

/// An open document. The editor's copy is authoritative while it is open.
#[derive(Debug, Clone)]
pub struct Document {
    pub contents: Rope,
    pub version: Option<i32>,
}

impl Document {
    pub fn new(text: &str, version: Option<i32>) -> Self {
        Self {
            contents: Rope::from_str(text),
            version,
        }
    }

    pub fn apply_change(&mut self, change: TextDocumentContentChangeEvent) {
        if let Some(range) = change.range {
            let start_idx = self.char_index(range.start);
            let end_idx = self.char_index(range.end).max(start_idx);

            self.contents.remove(start_idx..end_idx);
            self.contents.insert(start_idx, &change.text);
        } else {
            // Full document sync
            self.contents = Rope::from_str(&change.text);
        }
    }

    pub fn text(&self) -> String {
        self.contents.to_string()
    }

    /// Byte offset of an LSP position (UTF-16 columns). Positions past the
    /// end of a line or of the document clamp to it.
    pub fn offset_at(&self, position: Position) -> usize {
        self.contents.char_to_byte(self.char_index(position))
    }

    /// Char index of an LSP position, clamped to the end of its line.
    fn char_index(&self, position: Position) -> usize {
        let line = position.line as usize;
        if line >= self.contents.len_lines() {
            return self.contents.len_chars();
        }
        let line_text = self.contents.line(line);
        let mut end = line_text.len_chars();
        while end > 0 && matches!(line_text.char(end - 1), '\n' | '\r') {
            end -= 1;
        }
        let content = line_text.slice(..end);
        let utf16 = (position.character as usize).min(content.len_utf16_cu());
        self.contents.line_to_char(line) + content.utf16_cu_to_char(utf16)
    }
}
