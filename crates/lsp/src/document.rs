use crate::syntax::{Marker, scan_markers};
use crate::utils::lsp_position_to_char;
use anyhow::Result;
use std::sync::Arc;

/// Classification of a document; decides which features apply to it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumString, strum_macros::Display,
)]
#[strum(ascii_case_insensitive)]
pub enum DocumentKind {
    #[strum(to_string = "latex", serialize = "tex")]
    Latex,
    #[strum(to_string = "bibtex", serialize = "bib")]
    Bibtex,
}

#[derive(Clone, Debug)]
pub struct Document {
    /// The textual content of the document.
    pub content: ropey::Rope,
    /// The document version from the LSP client.
    pub version: i32,
    pub kind: DocumentKind,
    /// Environment markers in source order, rescanned on every change.
    pub markers: Arc<[Marker]>,
}

impl Document {
    pub fn new(text: &str, version: i32, kind: DocumentKind) -> Self {
        let content = ropey::Rope::from_str(text);
        let markers = scan_markers(text, &content).into();
        Self {
            content,
            version,
            kind,
            markers,
        }
    }

    pub fn open(params: lsp_types::DidOpenTextDocumentParams, kind: DocumentKind) -> Self {
        Self::new(&params.text_document.text, params.text_document.version, kind)
    }

    /// Applies the content changes of a `textDocument/didChange` notification
    /// in order and rescans the markers once at the end.
    pub fn apply_changes(
        &mut self,
        version: i32,
        changes: &[lsp_types::TextDocumentContentChangeEvent],
    ) -> Result<()> {
        for change in changes {
            match change.range {
                Some(range) => {
                    let start = lsp_position_to_char(&self.content, range.start)?;
                    let end = lsp_position_to_char(&self.content, range.end)?;
                    if end < start {
                        anyhow::bail!("change range ends before it starts: {:?}", range);
                    }
                    self.content.remove(start..end);
                    if !change.text.is_empty() {
                        self.content.insert(start, &change.text);
                    }
                }
                None => self.content = ropey::Rope::from_str(&change.text),
            }
        }

        self.version = version;
        self.markers = scan_markers(&self.text_string(), &self.content).into();
        Ok(())
    }

    /// Get the document text as a single string.
    /// This allocates - use sparingly.
    pub fn text_string(&self) -> String {
        self.content.to_string()
    }
}
