use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use docx_rs::{DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild};
use flashcard_core::model::{ModuleName, QuestionAnswerPair};
use flashcard_core::parser::parse_paragraphs;
use tracing::{debug, warn};

use crate::repository::{ModuleSource, StorageError};

/// Supported module document formats, in lookup priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    Text,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Docx, DocumentKind::Text];

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Docx => "docx",
            DocumentKind::Text => "txt",
        }
    }

    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension().eq_ignore_ascii_case(ext))
    }
}

/// Folder of module documents, one file per module.
#[derive(Debug, Clone)]
pub struct DocumentFolder {
    dir: PathBuf,
}

impl DocumentFolder {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn scan(&self) -> Result<BTreeMap<ModuleName, (DocumentKind, PathBuf)>, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(self.dir.display().to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let mut found: BTreeMap<ModuleName, (DocumentKind, PathBuf)> = BTreeMap::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(kind) = DocumentKind::from_path(&path) else {
                continue;
            };
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!(path = %path.display(), "skipping document with non UTF-8 name");
                continue;
            };
            // Word keeps lock files like `~$math.docx` next to open documents.
            if stem.starts_with("~$") {
                continue;
            }
            let name = match ModuleName::new(stem) {
                Ok(name) => name,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping document");
                    continue;
                }
            };

            let replace = found
                .get(&name)
                .is_none_or(|(existing, _)| priority(kind) < priority(*existing));
            if replace {
                found.insert(name, (kind, path));
            }
        }
        Ok(found)
    }
}

fn priority(kind: DocumentKind) -> usize {
    DocumentKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(usize::MAX)
}

impl ModuleSource for DocumentFolder {
    fn list_modules(&self) -> Result<Vec<ModuleName>, StorageError> {
        let modules: Vec<ModuleName> = self.scan()?.into_keys().collect();
        debug!(dir = %self.dir.display(), count = modules.len(), "discovered modules");
        Ok(modules)
    }

    fn load_questions(&self, module: &ModuleName) -> Result<Vec<QuestionAnswerPair>, StorageError> {
        // Discovery knows the exact file name, extension case included.
        let (kind, path) = self
            .scan()?
            .remove(module)
            .ok_or_else(|| StorageError::NotFound(module.to_string()))?;

        let paragraphs = match kind {
            DocumentKind::Docx => read_docx_paragraphs(module, &path)?,
            DocumentKind::Text => read_text_paragraphs(&path)?,
        };
        let pairs = parse_paragraphs(&paragraphs);
        debug!(
            module = %module,
            paragraphs = paragraphs.len(),
            pairs = pairs.len(),
            "parsed module document"
        );
        Ok(pairs)
    }
}

fn read_text_paragraphs(path: &Path) -> Result<Vec<String>, StorageError> {
    let raw = fs::read_to_string(path)?;
    Ok(raw.lines().map(str::to_string).collect())
}

fn read_docx_paragraphs(module: &ModuleName, path: &Path) -> Result<Vec<String>, StorageError> {
    let bytes = fs::read(path)?;
    let docx = docx_rs::read_docx(&bytes).map_err(|e| StorageError::Document {
        module: module.clone(),
        reason: e.to_string(),
    })?;

    Ok(docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect())
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut line = String::new();
    for child in &para.children {
        match child {
            ParagraphChild::Run(run) => run_text(run, &mut line),
            ParagraphChild::Hyperlink(hyperlink) => {
                for nested in &hyperlink.children {
                    if let ParagraphChild::Run(run) = nested {
                        run_text(run, &mut line);
                    }
                }
            }
            ParagraphChild::Insert(insert) => {
                for nested in &insert.children {
                    if let InsertChild::Run(run) = nested {
                        run_text(run, &mut line);
                    }
                }
            }
            _ => {}
        }
    }
    line
}

fn run_text(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            _ => {}
        }
    }
}
