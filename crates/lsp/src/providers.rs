/// Provider definitions for LSP `textDocument/rename` and `textDocument/prepareRename`.
pub mod rename;
/// Provider definitions for LSP text document lifecycle events.
pub mod text_document;
