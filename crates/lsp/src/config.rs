use crate::document::DocumentKind;
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_LATEX_EXTENSIONS: &[&str] = &["tex", "sty", "cls", "ltx", "dtx"];
const DEFAULT_BIBTEX_EXTENSIONS: &[&str] = &["bib"];

#[derive(Debug, Clone)]
pub struct Config {
    pub latex_extensions: Vec<String>,
    pub bibtex_extensions: Vec<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            latex_extensions: DEFAULT_LATEX_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            bibtex_extensions: DEFAULT_BIBTEX_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    pub fn update(&mut self, json: serde_json::Value) -> Result<()> {
        // Non-object options (nvim-lspconfig sends "[]" when none are set) are
        // ignored rather than rejected.
        if let Ok(options) = serde_json::from_value::<TexEnvLspOptions>(json) {
            if let Some(extensions) = options.latex_extensions {
                extend_extensions(&mut self.latex_extensions, extensions);
            }
            if let Some(extensions) = options.bibtex_extensions {
                extend_extensions(&mut self.bibtex_extensions, extensions);
            }
        }

        Ok(())
    }

    /// Classifies a document, preferring the client's language id over the
    /// file extension.
    pub fn document_kind(&self, language_id: &str, path: &Path) -> Option<DocumentKind> {
        if let Ok(kind) = language_id.parse::<DocumentKind>() {
            return Some(kind);
        }

        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        if self.latex_extensions.contains(&extension) {
            Some(DocumentKind::Latex)
        } else if self.bibtex_extensions.contains(&extension) {
            Some(DocumentKind::Bibtex)
        } else {
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn extend_extensions(target: &mut Vec<String>, extensions: Vec<String>) {
    for extension in extensions {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        if !extension.is_empty() && !target.contains(&extension) {
            target.push(extension);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TexEnvLspOptions {
    pub latex_extensions: Option<Vec<String>>,
    pub bibtex_extensions: Option<Vec<String>>,
}
