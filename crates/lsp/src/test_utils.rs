use crate::config::Config;
use crate::document::Document;
use crate::server::LspServerStateSnapshot;
use crate::utils::ToFilePath;
use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

/// A set of documents written in the `%!` fixture format.
///
/// Each document starts with `%! <path>`. Lines made only of spaces, `|`, `^`
/// and `!` annotate the line above them: `|` is the cursor, a run of `^`
/// marks a range and `!` marks an empty range.
#[derive(Debug)]
pub struct Fixture {
    pub documents: Vec<TestDocument>,
}
impl Fixture {
    pub fn parse(input: &str) -> Self {
        let mut documents = Vec::new();
        let mut start = 0;
        if !input.is_empty() {
            for end in input
                .match_indices("%!")
                .skip(1)
                .map(|(i, _)| i)
                .chain(std::iter::once(input.len()))
            {
                documents.push(TestDocument::parse(&input[start..end]));
                start = end;
            }
        }
        Self { documents }
    }
}

#[derive(Debug)]
pub struct TestDocument {
    pub path: String,
    pub text: String,
    pub cursor: Option<lsp_types::Position>,
    pub ranges: Vec<lsp_types::Range>,
}
impl TestDocument {
    pub fn parse(input: &str) -> Self {
        let mut lines = Vec::new();

        let (path, input) = input
            .trim()
            .strip_prefix("%! ")
            .map(|input| input.split_once('\n').unwrap_or((input, "")))
            .unwrap();

        let mut ranges = Vec::new();
        let mut cursor = None;

        for line in input.lines() {
            if line.chars().all(|c| matches!(c, ' ' | '^' | '|' | '!')) && !line.is_empty() {
                let index = (lines.len() - 1) as u32;

                cursor = cursor.or_else(|| {
                    let character = line.find('|')?;
                    Some(lsp_types::Position::new(index, character as u32))
                });

                if let Some(start) = line.find('!') {
                    let position = lsp_types::Position::new(index, start as u32);
                    ranges.push(lsp_types::Range::new(position, position));
                }

                if let Some(start) = line.find('^') {
                    let end = line.rfind('^').unwrap() + 1;
                    ranges.push(lsp_types::Range::new(
                        lsp_types::Position::new(index, start as u32),
                        lsp_types::Position::new(index, end as u32),
                    ));
                }
            } else {
                lines.push(line);
            }
        }

        Self {
            path: path.to_string(),
            text: lines.join("\n"),
            cursor,
            ranges,
        }
    }
}

pub struct TestState {
    pub fixture: Fixture,
    pub config: Config,
    pub open_docs: HashMap<PathBuf, Document>,
}

impl TestState {
    /// Converts a test fixture path to a PathBuf, handling cross-platform compatibility.
    /// On Windows, converts Unix-style paths like "/main.tex" to "C:\main.tex"
    pub fn path_from_fixture(path: &str) -> Result<PathBuf> {
        Self::uri_from_fixture(path)?
            .to_file_path()
            .map_err(|_| anyhow::anyhow!("Failed to convert fixture path to file path: {}", path))
    }

    pub fn uri_from_fixture(path: &str) -> Result<lsp_types::Uri> {
        let uri_str = if cfg!(windows) && path.starts_with('/') {
            format!("file:///C:{path}")
        } else {
            format!("file://{path}")
        };

        lsp_types::Uri::from_str(&uri_str).map_err(|e| anyhow::anyhow!("Invalid URI: {}", e))
    }

    pub fn new(fixture: &str) -> Result<Self> {
        let fixture = Fixture::parse(fixture);
        let config = Config::new();
        let open_docs = fixture
            .documents
            .iter()
            .map(|document| {
                let path = Self::path_from_fixture(&document.path)?;
                let kind = config
                    .document_kind("", &path)
                    .ok_or_else(|| anyhow::anyhow!("unsupported fixture file {:?}", path))?;
                Ok((path, Document::new(&document.text, 0, kind)))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(TestState {
            fixture,
            config,
            open_docs,
        })
    }

    pub fn snapshot(&self) -> LspServerStateSnapshot {
        LspServerStateSnapshot {
            open_docs: self.open_docs.clone(),
        }
    }

    /// Position of the first `|` in the fixture.
    pub fn cursor(&self) -> Option<lsp_types::TextDocumentPositionParams> {
        let (document, cursor) = self
            .fixture
            .documents
            .iter()
            .find_map(|document| document.cursor.map(|cursor| (document, cursor)))?;

        let uri = Self::uri_from_fixture(&document.path).ok()?;
        let id = lsp_types::TextDocumentIdentifier::new(uri);
        Some(lsp_types::TextDocumentPositionParams::new(id, cursor))
    }

    pub fn rename_params(&self, new_name: &str) -> Option<lsp_types::RenameParams> {
        Some(lsp_types::RenameParams {
            text_document_position: self.cursor()?,
            new_name: new_name.to_string(),
            work_done_progress_params: lsp_types::WorkDoneProgressParams {
                work_done_token: None,
            },
        })
    }

    /// All annotated ranges, in fixture order.
    pub fn ranges(&self) -> Vec<lsp_types::Range> {
        self.fixture
            .documents
            .iter()
            .flat_map(|document| document.ranges.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_annotations() {
        let fixture = Fixture::parse(
            r#"
%! /main.tex
\begin{foo}
       ^|^
\end{foo}
     !
%! /refs.bib
@misc{a,}
"#,
        );

        assert_eq!(fixture.documents.len(), 2);
        let main = &fixture.documents[0];
        assert_eq!(main.path, "/main.tex");
        assert_eq!(main.text, "\\begin{foo}\n\\end{foo}");
        assert_eq!(main.cursor, Some(lsp_types::Position::new(0, 8)));
        assert_eq!(
            main.ranges,
            vec![
                lsp_types::Range::new(
                    lsp_types::Position::new(0, 7),
                    lsp_types::Position::new(0, 10)
                ),
                lsp_types::Range::new(
                    lsp_types::Position::new(1, 5),
                    lsp_types::Position::new(1, 5)
                ),
            ]
        );
        assert_eq!(fixture.documents[1].path, "/refs.bib");
        assert_eq!(fixture.documents[1].text, "@misc{a,}");
    }
}
