//! Class table loading.
//!
//! A class table maps positions in a model's output vector to a class id and
//! a name. Files hold one class per line, in output order, in one of three
//! forms:
//!
//! - `<id>\t<name>`
//! - `<id> <name>` where `<id>` is an ImageNet-style synset id (`n01440764`)
//! - `<name>` on its own, in which case the id is the line index

use crate::core::errors::{ClassifyError, ClassifyResult};
use std::path::Path;

/// A class id and its raw (undecorated) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabel {
    pub id: String,
    pub name: String,
}

/// Index-ordered class labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassTable {
    classes: Vec<ClassLabel>,
}

impl ClassTable {
    /// Creates a table from labels in output order.
    pub fn new(classes: Vec<ClassLabel>) -> Self {
        Self { classes }
    }

    /// Creates a table from bare names; ids are the indices.
    pub fn from_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let classes = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| ClassLabel {
                id: index.to_string(),
                name: name.into(),
            })
            .collect();
        Self { classes }
    }

    /// Parses class table text. Blank lines keep their position so later
    /// classes stay aligned with the model output; they resolve like
    /// unknown indices.
    pub fn parse(content: &str) -> Self {
        let classes = content
            .lines()
            .enumerate()
            .map(|(index, line)| parse_line(index, line))
            .collect();
        Self { classes }
    }

    /// Reads a class table file.
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::InvalidInput` if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> ClassifyResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClassifyError::invalid_input(format!(
                "failed to read class table from '{}': {e}",
                path.display()
            ))
        })?;
        Ok(Self::parse(&content))
    }

    /// Label stored at `index`, if present and non-blank.
    pub fn get(&self, index: usize) -> Option<&ClassLabel> {
        self.classes.get(index).filter(|c| !c.name.is_empty())
    }

    /// Resolves `index` to `(class_id, raw_name)`, falling back to
    /// `(index, "class_<index>")` for indices the table does not cover.
    pub fn resolve(&self, index: usize) -> (String, String) {
        match self.get(index) {
            Some(label) => (label.id.clone(), label.name.clone()),
            None => (index.to_string(), format!("class_{index}")),
        }
    }

    /// Number of rows in the table, including blank ones.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

fn parse_line(index: usize, line: &str) -> ClassLabel {
    let line = line.trim();
    if let Some((id, name)) = line.split_once('\t') {
        return ClassLabel {
            id: id.trim().to_string(),
            name: name.trim().to_string(),
        };
    }
    if let Some((id, name)) = line.split_once(' ')
        && looks_like_synset(id)
    {
        return ClassLabel {
            id: id.to_string(),
            name: name.trim().to_string(),
        };
    }
    ClassLabel {
        id: index.to_string(),
        name: line.to_string(),
    }
}

fn looks_like_synset(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && token.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}
