//! Extraction of environment markers (`\begin{..}` and `\end{..}`) from LaTeX
//! source.
//!
//! The scanner does not build a syntax tree. Renaming only needs a linear
//! depth scan, so every marker is recorded as a flat [`Marker`] in source
//! order.

use crate::utils::byte_to_lsp_position;
use lsp_types::{Position, Range};
use ropey::Rope;

/// Environments whose body is not scanned for further markers.
const VERBATIM_ENVIRONMENTS: &[&str] = &[
    "verbatim",
    "verbatim*",
    "Verbatim",
    "lstlisting",
    "minted",
    "comment",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerRole {
    /// `\begin{name}`
    Open,
    /// `\end{name}`
    Close,
}

/// One `\begin` or `\end` token of a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Marker {
    role: MarkerRole,
    name: String,
    name_range: Range,
    full_range: Range,
}

impl Marker {
    /// Creates a marker.
    ///
    /// # Panics
    ///
    /// Panics if `name_range` is not contained in `full_range`.
    pub fn new(
        role: MarkerRole,
        name: impl Into<String>,
        name_range: Range,
        full_range: Range,
    ) -> Self {
        assert!(
            full_range.start <= name_range.start && name_range.end <= full_range.end,
            "marker name range {name_range:?} lies outside its token range {full_range:?}"
        );
        Self {
            role,
            name: name.into(),
            name_range,
            full_range,
        }
    }

    pub fn role(&self) -> MarkerRole {
        self.role
    }

    /// The environment name as written when the document was scanned.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Range of the environment name between the braces.
    pub fn name_range(&self) -> Range {
        self.name_range
    }

    /// Range of the whole token, from the backslash to the closing brace.
    pub fn full_range(&self) -> Range {
        self.full_range
    }

    /// Returns true if `position` lies inside the name, with the end excluded.
    /// An empty name never contains a position.
    pub fn name_contains(&self, position: Position) -> bool {
        self.name_range.start <= position && position < self.name_range.end
    }
}

/// Scans `text` for environment markers.
///
/// `%` comments are skipped, `\\` and other control symbols are consumed as a
/// unit so `\\begin` is not a marker, and the bodies of verbatim-like
/// environments are skipped up to their matching `\end`. A group that is not
/// closed on its line still yields a marker covering the name typed so far.
pub fn scan_markers(text: &str, rope: &Rope) -> Vec<Marker> {
    let bytes = text.as_bytes();
    let mut markers = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        match bytes[offset] {
            b'%' => {
                offset = text[offset..]
                    .find(['\n', '\r'])
                    .map_or(bytes.len(), |newline| offset + newline);
            }
            b'\\' => {
                let start = offset;
                let command_start = offset + 1;
                let command_len = bytes[command_start..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphabetic() || **b == b'@')
                    .count();

                if command_len == 0 {
                    // Control symbol such as `\\` or `\%`.
                    offset = command_start
                        + text[command_start..]
                            .chars()
                            .next()
                            .map_or(0, char::len_utf8);
                    continue;
                }

                offset = command_start + command_len;
                let role = match &text[command_start..offset] {
                    "begin" => MarkerRole::Open,
                    "end" => MarkerRole::Close,
                    _ => continue,
                };

                let Some(group) = scan_group(text, offset) else {
                    continue;
                };
                offset = group.end;

                let name = &text[group.name.clone()];
                markers.push(Marker::new(
                    role,
                    name,
                    Range::new(
                        byte_to_lsp_position(rope, group.name.start),
                        byte_to_lsp_position(rope, group.name.end),
                    ),
                    Range::new(
                        byte_to_lsp_position(rope, start),
                        byte_to_lsp_position(rope, group.end),
                    ),
                ));

                if role == MarkerRole::Open && VERBATIM_ENVIRONMENTS.contains(&name) {
                    let terminator = format!("\\end{{{name}}}");
                    offset = text[offset..]
                        .find(&terminator)
                        .map_or(bytes.len(), |found| offset + found);
                }
            }
            _ => offset += 1,
        }
    }

    markers
}

/// Byte spans of a `{name}` argument.
struct Group {
    /// Trimmed name, exclusive of the braces.
    name: std::ops::Range<usize>,
    /// One past the closing brace, or the point where the group was cut off.
    end: usize,
}

fn scan_group(text: &str, mut offset: usize) -> Option<Group> {
    let bytes = text.as_bytes();

    // TeX skips blanks and at most one line break after a control word.
    let mut seen_newline = false;
    while let Some(&b) = bytes.get(offset) {
        match b {
            b' ' | b'\t' => offset += 1,
            b'\r' | b'\n' if !seen_newline => {
                seen_newline = true;
                offset += if bytes[offset..].starts_with(b"\r\n") { 2 } else { 1 };
            }
            _ => break,
        }
    }

    if bytes.get(offset) != Some(&b'{') {
        return None;
    }

    let body_start = offset + 1;
    let body_len = bytes[body_start..]
        .iter()
        .take_while(|b| !matches!(b, b'}' | b'{' | b'\\' | b'%' | b'\n' | b'\r'))
        .count();
    let body_end = body_start + body_len;
    let closed = bytes.get(body_end) == Some(&b'}');

    let body = &text[body_start..body_end];
    let leading = body.len() - body.trim_start().len();
    let name_start = body_start + leading;
    let name_end = (body_start + body.trim_end().len()).max(name_start);

    Some(Group {
        name: name_start..name_end,
        end: if closed { body_end + 1 } else { body_end },
    })
}
