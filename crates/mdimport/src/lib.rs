//! Split markdown notes into searchable items.
//!
//! Every level-1 heading starts a new item; the text up to the next level-1
//! heading is its body. YAML front matter applies to every item in the file.

pub mod front_matter;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

pub use front_matter::{split_front_matter, FrontMatterError};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad front matter in '{path}': {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    #[error("document id '{id}' is produced by both '{first}' and '{second}'")]
    DuplicateId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub title: String,
    pub body: String,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemGroup {
    pub path: PathBuf,
    pub items: Vec<Item>,
}

impl ItemGroup {
    /// File name without extension, used for display and document ids.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Title of a level-1 ATX heading, if `line` is one.
fn h1_title(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }

    let rest = line[indent..].strip_prefix('#')?;
    if rest.starts_with('#') {
        return None;
    }
    if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }

    let title = rest.trim();
    // Optional closing sequence: " ##".
    let title = match title.trim_end_matches('#') {
        stripped if stripped.len() == title.len() => title,
        "" => "",
        stripped if stripped.ends_with([' ', '\t']) => stripped.trim_end(),
        _ => title,
    };
    Some(title)
}

/// Opening or closing fence marker of a fenced code block.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == ch).count();
    (len >= 3).then_some((ch, len))
}

fn trim_blank_lines(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

fn push_item(
    items: &mut Vec<Item>,
    current: Option<(String, Vec<&str>)>,
    metadata: &Map<String, Value>,
) {
    // Sections under an empty heading are dropped, like preamble text.
    if let Some((title, body)) = current.filter(|(title, _)| !title.is_empty()) {
        items.push(Item {
            title,
            body: trim_blank_lines(&body),
            metadata: metadata.clone(),
        });
    }
}

/// Split markdown `content` into one item per level-1 heading.
pub fn split_items(content: &str, metadata: &Map<String, Value>) -> Vec<Item> {
    let mut items = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    let mut fence: Option<(char, usize)> = None;

    for line in content.lines() {
        if let Some((ch, len)) = fence_marker(line) {
            match fence {
                None => fence = Some((ch, len)),
                Some((open, open_len)) if open == ch && len >= open_len => fence = None,
                Some(_) => {}
            }
        } else if fence.is_none() {
            if let Some(title) = h1_title(line) {
                push_item(&mut items, current.take(), metadata);
                current = Some((title.to_string(), Vec::new()));
                continue;
            }
        }

        if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    push_item(&mut items, current, metadata);

    items
}

/// Parse one markdown file into items.
pub fn process_file(path: &Path) -> Result<Vec<Item>, ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let (metadata, content) =
        split_front_matter(&text).map_err(|source| ImportError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })?;

    let items = split_items(content, &metadata);
    debug!(path = %path.display(), items = items.len(), "processed markdown file");
    Ok(items)
}

/// Parse every file matching `pattern`, in glob order.
pub fn process_files(pattern: &str) -> Result<Vec<ItemGroup>, ImportError> {
    let paths = glob::glob(pattern).map_err(|source| ImportError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut groups = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                let path = err.path().to_path_buf();
                return Err(ImportError::Read {
                    path,
                    source: err.into_error(),
                });
            }
        };
        if !path.is_file() {
            continue;
        }

        let items = process_file(&path)?;
        groups.push(ItemGroup { path, items });
    }

    Ok(groups)
}

fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Short digest of the full path, so equal stems in different places stay apart.
fn path_tag(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hex::encode(&hasher.finalize()[..4])
}

/// Id of the `n`-th item (1-based) of `group`: `<stem>-<path digest>-<n>`.
pub fn document_id(group: &ItemGroup, n: usize) -> String {
    sanitize_id(&format!("{}-{}-{n}", group.stem(), path_tag(&group.path)))
}

/// Flatten groups into documents for the search index.
///
/// Front matter keys are copied to the top level; `id`, `title`, `body` and
/// `path` always come from the item itself. Ids are unique across the batch;
/// a collision is an error rather than a silently overwritten document.
pub fn to_documents(groups: &[ItemGroup]) -> Result<Vec<Value>, ImportError> {
    let mut documents = Vec::new();
    let mut seen: HashMap<String, &Path> = HashMap::new();
    for group in groups {
        for (n, item) in group.items.iter().enumerate() {
            let id = document_id(group, n + 1);
            if let Some(first) = seen.insert(id.clone(), &group.path) {
                return Err(ImportError::DuplicateId {
                    id,
                    first: first.to_path_buf(),
                    second: group.path.clone(),
                });
            }

            let mut doc = item.metadata.clone();
            doc.insert("id".into(), Value::String(id));
            doc.insert("title".into(), Value::String(item.title.clone()));
            doc.insert("body".into(), Value::String(item.body.clone()));
            doc.insert(
                "path".into(),
                Value::String(group.path.to_string_lossy().into_owned()),
            );
            documents.push(Value::Object(doc));
        }
    }
    Ok(documents)
}
