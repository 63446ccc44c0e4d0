//! Renaming of LaTeX environments.
//!
//! A rename request on the name of a `\begin{..}` or `\end{..}` marker renames
//! both markers of the environment. Markers are paired by nesting depth alone:
//! `\begin{foo} .. \end{bar}` is still one environment and both names are
//! replaced. Every case where the rename does not apply (wrong document kind,
//! cursor outside a marker name, marker without a partner) yields `None`.

use crate::document::{Document, DocumentKind};
use crate::server::LspServerStateSnapshot;
use crate::syntax::{Marker, MarkerRole};
use anyhow::Result;
use lsp_types::{Position, TextEdit, Uri, WorkspaceEdit};
use std::collections::HashMap;
use tracing::debug;

/// An opening marker and the closing marker it structurally belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pair<'a> {
    pub open: &'a Marker,
    pub close: &'a Marker,
}

/// Only LaTeX documents have environments.
pub fn is_eligible(document: &Document) -> bool {
    document.kind == DocumentKind::Latex
}

/// Index of the first marker whose name contains `position`.
pub fn locate_marker(markers: &[Marker], position: Position) -> Option<usize> {
    markers
        .iter()
        .position(|marker| marker.name_contains(position))
}

/// Finds the partner of `markers[index]` by counting nesting depth. Names are
/// never compared.
pub fn find_pair(markers: &[Marker], index: usize) -> Option<Pair<'_>> {
    let marker = markers.get(index)?;
    let mut depth = 0usize;

    match marker.role() {
        MarkerRole::Open => {
            for candidate in &markers[index + 1..] {
                match candidate.role() {
                    MarkerRole::Open => depth += 1,
                    MarkerRole::Close if depth == 0 => {
                        return Some(Pair {
                            open: marker,
                            close: candidate,
                        });
                    }
                    MarkerRole::Close => depth -= 1,
                }
            }
        }
        MarkerRole::Close => {
            for candidate in markers[..index].iter().rev() {
                match candidate.role() {
                    MarkerRole::Close => depth += 1,
                    MarkerRole::Open if depth == 0 => {
                        return Some(Pair {
                            open: candidate,
                            close: marker,
                        });
                    }
                    MarkerRole::Open => depth -= 1,
                }
            }
        }
    }

    None
}

/// Replaces both names of `pair` with `new_name`, opening marker first.
#[allow(clippy::mutable_key_type)]
pub fn build_edit(uri: &Uri, pair: Pair<'_>, new_name: &str) -> WorkspaceEdit {
    let edits = vec![
        TextEdit::new(pair.open.name_range(), new_name.to_string()),
        TextEdit::new(pair.close.name_range(), new_name.to_string()),
    ];

    let mut changes = HashMap::new();
    changes.insert(uri.clone(), edits);
    WorkspaceEdit::new(changes)
}

/// Computes the edit renaming the environment whose marker name is under
/// `position`.
pub fn compute_rename(
    uri: &Uri,
    document: &Document,
    position: Position,
    new_name: &str,
) -> Option<WorkspaceEdit> {
    if !is_eligible(document) {
        debug!("rename - {} documents have no environments", document.kind);
        return None;
    }

    let index = locate_marker(&document.markers, position)?;
    let pair = find_pair(&document.markers, index)?;
    debug!(
        "rename - pairing {:?} with {:?}",
        pair.open.name(),
        pair.close.name()
    );
    Some(build_edit(uri, pair, new_name))
}

/// Returns the marker under `position` if renaming it would succeed.
pub fn rename_target(document: &Document, position: Position) -> Option<&Marker> {
    if !is_eligible(document) {
        return None;
    }

    let index = locate_marker(&document.markers, position)?;
    find_pair(&document.markers, index)?;
    document.markers.get(index)
}

/// Provider function for `textDocument/rename`.
pub(crate) fn rename(
    snapshot: LspServerStateSnapshot,
    params: lsp_types::RenameParams,
) -> Result<Option<WorkspaceEdit>> {
    let uri = &params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;
    debug!("providers::rename - {} at {:?}", uri.as_str(), position);

    let document = match snapshot.document_for_uri(uri) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("Failed to get document for URI {}: {}", uri.as_str(), e);
            return Ok(None);
        }
    };

    Ok(compute_rename(uri, document, position, &params.new_name))
}

/// Provider function for `textDocument/prepareRename`.
pub(crate) fn prepare_rename(
    snapshot: LspServerStateSnapshot,
    params: lsp_types::TextDocumentPositionParams,
) -> Result<Option<lsp_types::PrepareRenameResponse>> {
    let uri = &params.text_document.uri;
    debug!(
        "providers::prepare_rename - {} at {:?}",
        uri.as_str(),
        params.position
    );

    let document = match snapshot.document_for_uri(uri) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("Failed to get document for URI {}: {}", uri.as_str(), e);
            return Ok(None);
        }
    };

    Ok(rename_target(document, params.position).map(|marker| {
        lsp_types::PrepareRenameResponse::RangeWithPlaceholder {
            range: marker.name_range(),
            placeholder: marker.name().to_string(),
        }
    }))
}
