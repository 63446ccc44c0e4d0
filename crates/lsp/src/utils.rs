use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;

pub trait ToFilePath {
    fn to_file_path(&self) -> Result<PathBuf, ()>;
}

impl ToFilePath for lsp_types::Uri {
    fn to_file_path(&self) -> Result<PathBuf, ()> {
        let url = url::Url::from_str(self.as_str()).map_err(|_| ())?;
        url.to_file_path()
    }
}

/// Converts a byte offset into an LSP position (UTF-16 code units).
pub fn byte_to_lsp_position(text: &ropey::Rope, byte_idx: usize) -> lsp_types::Position {
    let line_idx = text.byte_to_line(byte_idx);

    let line_utf16_cu_idx = {
        let char_idx = text.line_to_char(line_idx);
        text.char_to_utf16_cu(char_idx)
    };

    let character_utf16_cu_idx = {
        let char_idx = text.byte_to_char(byte_idx);
        text.char_to_utf16_cu(char_idx)
    };

    let line = line_idx;
    let character = character_utf16_cu_idx - line_utf16_cu_idx;

    lsp_types::Position::new(line as u32, character as u32)
}

/// Converts an LSP position into a char index of the rope.
///
/// A character past the end of its line is clamped to the line end, the way
/// clients expect. A line past the end of the document is an error.
pub fn lsp_position_to_char(text: &ropey::Rope, position: lsp_types::Position) -> Result<usize> {
    let line_idx = position.line as usize;
    if line_idx >= text.len_lines() {
        anyhow::bail!(
            "position {}:{} is past the end of the document ({} lines)",
            position.line,
            position.character,
            text.len_lines()
        );
    }

    let line = text.line(line_idx);
    let mut content_chars = line.len_chars();
    while content_chars > 0 && matches!(line.char(content_chars - 1), '\n' | '\r') {
        content_chars -= 1;
    }
    let col_code_idx =
        (position.character as usize).min(line.char_to_utf16_cu(content_chars));
    Ok(text.line_to_char(line_idx) + line.utf16_cu_to_char(col_code_idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsp_types::Position;
    use ropey::Rope;

    #[test]
    fn test_byte_to_lsp_position_ascii() {
        let text = Rope::from_str("\\begin{foo}\n\\end{bar}");
        assert_eq!(byte_to_lsp_position(&text, 0), Position::new(0, 0));
        assert_eq!(byte_to_lsp_position(&text, 7), Position::new(0, 7));
        assert_eq!(byte_to_lsp_position(&text, 17), Position::new(1, 5));
    }

    #[test]
    fn test_byte_to_lsp_position_counts_utf16() {
        // "é" is two bytes but one UTF-16 code unit, "𝄞" is four bytes and two units.
        let text = Rope::from_str("é𝄞\\begin{x}");
        let begin = "é𝄞".len();
        assert_eq!(byte_to_lsp_position(&text, begin), Position::new(0, 3));
    }

    #[test]
    fn test_lsp_position_to_char() {
        let text = Rope::from_str("ab\ncd𝄞e\n");
        assert_eq!(lsp_position_to_char(&text, Position::new(0, 1)).unwrap(), 1);
        assert_eq!(lsp_position_to_char(&text, Position::new(1, 0)).unwrap(), 3);
        // After the surrogate pair.
        assert_eq!(lsp_position_to_char(&text, Position::new(1, 4)).unwrap(), 6);
    }

    #[test]
    fn test_lsp_position_to_char_clamps_character() {
        let text = Rope::from_str("ab\r\ncd");
        assert_eq!(lsp_position_to_char(&text, Position::new(0, 99)).unwrap(), 2);
        assert_eq!(lsp_position_to_char(&text, Position::new(1, 99)).unwrap(), 6);
    }

    #[test]
    fn test_only_lsp_line_breaks_count() {
        let first_line = "a\x0cb\u{2028}c\u{0085}d\r\n";
        let text = Rope::from_str(&format!("{first_line}e\rf"));
        assert_eq!(text.len_lines(), 3);
        assert_eq!(byte_to_lsp_position(&text, 2), Position::new(0, 2));
        let before_d = first_line.len() - "d\r\n".len();
        assert_eq!(byte_to_lsp_position(&text, before_d), Position::new(0, 6));
        assert_eq!(
            byte_to_lsp_position(&text, first_line.len()),
            Position::new(1, 0)
        );
        assert_eq!(lsp_position_to_char(&text, Position::new(0, 4)).unwrap(), 4);
        assert_eq!(lsp_position_to_char(&text, Position::new(0, 99)).unwrap(), 7);
        assert_eq!(lsp_position_to_char(&text, Position::new(2, 0)).unwrap(), 11);
    }

    #[test]
    fn test_lsp_position_to_char_rejects_line_past_end() {
        let text = Rope::from_str("ab\ncd");
        assert!(lsp_position_to_char(&text, Position::new(7, 0)).is_err());
    }
}
