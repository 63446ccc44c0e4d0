use crate::document::Document;
use crate::server::LspServerState;
use crate::utils::ToFilePath;
use anyhow::Result;
use tracing::debug;

/// Provider function for `textDocument/didOpen`.
pub(crate) fn did_open(
    state: &mut LspServerState,
    params: lsp_types::DidOpenTextDocumentParams,
) -> Result<()> {
    debug!("text_document::did_open");
    let path = match params.text_document.uri.to_file_path() {
        Ok(path) => path,
        Err(_) => {
            debug!(
                "Failed to convert URI to file path: {:?}",
                params.text_document.uri
            );
            return Ok(());
        }
    };

    let Some(kind) = state
        .config
        .document_kind(&params.text_document.language_id, &path)
    else {
        debug!(
            "text_document::did_open - ignoring {:?} with language id {:?}",
            path, params.text_document.language_id
        );
        return Ok(());
    };

    let document = Document::open(params, kind);
    debug!(
        "text_document::did_open - adding {:?} as {} with {} markers",
        path,
        kind,
        document.markers.len()
    );
    state.open_docs.insert(path, document);
    Ok(())
}

/// Provider function for `textDocument/didSave`.
pub(crate) fn did_save(
    _state: &mut LspServerState,
    params: lsp_types::DidSaveTextDocumentParams,
) -> Result<()> {
    debug!("text_document::did_save - {:?}", params.text_document.uri);
    Ok(())
}

/// Provider function for `textDocument/didClose`.
pub(crate) fn did_close(
    state: &mut LspServerState,
    params: lsp_types::DidCloseTextDocumentParams,
) -> Result<()> {
    debug!("text_document::did_close");
    if let Ok(path) = params.text_document.uri.to_file_path() {
        state.open_docs.remove(&path);
    }
    Ok(())
}

/// Provider function for `textDocument/didChange`.
pub(crate) fn did_change(
    state: &mut LspServerState,
    params: lsp_types::DidChangeTextDocumentParams,
) -> Result<()> {
    debug!("text_document::did_change");
    let Ok(path) = params.text_document.uri.to_file_path() else {
        debug!(
            "Failed to convert URI to file path: {:?}",
            params.text_document.uri
        );
        return Ok(());
    };

    let Some(doc) = state.open_docs.get_mut(&path) else {
        tracing::warn!("text_document::did_change - {:?} is not open", path);
        return Ok(());
    };

    if params.text_document.version <= doc.version {
        tracing::warn!(
            "text_document::did_change - out of order version {} for {:?} (have {})",
            params.text_document.version,
            path,
            doc.version
        );
    }

    debug!("text_document::did_change - apply edits");
    if let Err(err) = doc.apply_changes(params.text_document.version, &params.content_changes) {
        // A failed edit leaves the rope partially updated; drop the document so
        // no request runs against text the client does not have.
        tracing::error!(
            "text_document::did_change - failed to apply edits to {:?}: {}",
            path,
            err
        );
        state.open_docs.remove(&path);
        return Ok(());
    }

    debug!("text_document::did_change - done");
    Ok(())
}
