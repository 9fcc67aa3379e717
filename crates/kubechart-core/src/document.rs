//! Multi-document manifest streams
//!
//! `kustomize build` emits every resource in one stream separated by `---`
//! lines. The templater works on exactly one document at a time, so the
//! stream is cut on separator lines only (never on `---` appearing inside a
//! value) and each document keeps its own trailing newline.

use crate::error::{CoreError, Result};
use crate::resource::ResourceDescriptor;

/// One document from a manifest stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Position in the stream, counting only non-empty documents
    pub index: usize,
    pub content: String,
}

impl Document {
    /// Extract the resource descriptor for this document
    pub fn descriptor(&self) -> Result<ResourceDescriptor> {
        ResourceDescriptor::from_yaml(&self.content).map_err(|e| CoreError::InvalidDocument {
            index: self.index,
            message: e.to_string(),
        })
    }
}

/// Split a manifest stream into its documents
///
/// Empty and comment-only documents are dropped.
pub fn split_documents(manifest: &str) -> Vec<Document> {
    let mut documents = Vec::new();
    let mut current = String::new();

    for line in manifest.split_inclusive('\n') {
        if is_separator(line) {
            push_document(&mut documents, std::mem::take(&mut current));
            continue;
        }
        current.push_str(line);
    }
    push_document(&mut documents, current);

    documents
}

fn is_separator(line: &str) -> bool {
    let line = line.trim_end();
    line == "---" || line.starts_with("--- ")
}

fn push_document(documents: &mut Vec<Document>, mut content: String) {
    if content
        .lines()
        .all(|l| l.trim().is_empty() || l.trim().starts_with('#'))
    {
        return;
    }

    if !content.ends_with('\n') {
        content.push('\n');
    }

    documents.push(Document {
        index: documents.len(),
        content,
    });
}
