//! Line-oriented structure of a YAML document
//!
//! The templater never builds a YAML tree. Instead every pass splits the
//! document into lines and reasons about indentation: a key's value is the
//! run of following lines that sit deeper than the key (or, for sequences,
//! `-` items at the key's own column). [`locate_block`] is the one place
//! that rule lives.

use std::ops::Range;

/// One line of a document, pre-digested for indentation checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Width of the leading whitespace
    pub indent: usize,
    /// Content with surrounding whitespace removed
    pub trimmed: &'a str,
    /// Starts with a `-` sequence marker
    pub is_list_item: bool,
}

impl<'a> Line<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let trimmed = raw.trim();
        Self {
            indent: leading_whitespace(raw).len(),
            trimmed,
            is_list_item: trimmed == "-" || trimmed.starts_with("- "),
        }
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        self.trimmed.is_empty()
    }

    /// Template directive such as `{{- if ... }}`
    #[inline]
    pub fn is_directive(&self) -> bool {
        self.trimmed.starts_with("{{")
    }

    #[inline]
    pub fn is_comment(&self) -> bool {
        self.trimmed.starts_with('#')
    }

    /// Content after an optional `- ` marker
    pub fn content(&self) -> &'a str {
        if self.is_list_item {
            self.trimmed[1..].trim_start()
        } else {
            self.trimmed
        }
    }

    /// Column where the mapping content starts
    ///
    /// For `- name: manager` at indent 6 this is 8.
    pub fn column(&self) -> usize {
        self.indent + (self.trimmed.len() - self.content().len())
    }

    /// Exact key line, e.g. `is_key("env:")`
    #[inline]
    pub fn is_key(&self, key: &str) -> bool {
        self.content() == key
    }

    /// `key: value` pair with the given key and value
    ///
    /// A single- or double-quoted value matches its unquoted form.
    pub fn is_entry(&self, key: &str, value: &str) -> bool {
        match self.content().split_once(':') {
            Some((k, v)) => k == key && unquote(v.trim()) == value,
            None => false,
        }
    }

    /// Key line whose key is `key`, with or without an inline value
    pub fn has_key(&self, key: &str) -> bool {
        match self.content().split_once(':') {
            Some((k, _)) => k == key,
            None => false,
        }
    }
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|q| value.strip_prefix(q)?.strip_suffix(q))
        .unwrap_or(value)
}

/// Leading spaces and tabs of a line
pub fn leading_whitespace(line: &str) -> &str {
    let rest = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - rest.len()]
}

/// Padding of `width` spaces
pub fn pad(width: usize) -> String {
    " ".repeat(width)
}

/// How a block's end is recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    /// Mapping value: every same-column line is a sibling key
    Mapping,
    /// Sequence value: same-column `-` items, directives and comments
    /// still belong to the block
    Sequence,
    /// A whole sequence item: everything deeper than its dash
    Item,
}

/// Vertical extent of a key's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// The key line
    pub start: usize,
    /// First line after the block
    pub end: usize,
    /// Column the block is measured against
    pub indent: usize,
}

impl Block {
    /// Lines of the value, excluding the key
    pub fn body(&self) -> Range<usize> {
        self.start + 1..self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start + 1
    }

    /// Key line through the end of the value
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Find the value block introduced by the key at `key`
///
/// The caller has already matched the key line. The walk stops at the first
/// blank line, dedent, or same-column sibling; running off the end of the
/// document counts as a dedent.
pub fn locate_block(lines: &[&str], key: usize, style: BlockStyle) -> Block {
    let key_line = Line::parse(lines[key]);
    let indent = match style {
        BlockStyle::Item => key_line.indent,
        BlockStyle::Mapping | BlockStyle::Sequence => key_line.column(),
    };

    let mut end = key + 1;
    while end < lines.len() {
        let line = Line::parse(lines[end]);
        if line.is_blank() || line.indent < indent {
            break;
        }
        if line.indent == indent {
            let continues = match style {
                BlockStyle::Mapping | BlockStyle::Item => false,
                BlockStyle::Sequence => {
                    line.is_list_item || line.is_directive() || line.is_comment()
                }
            };
            if !continues {
                break;
            }
        }
        end += 1;
    }

    Block {
        start: key,
        end,
        indent,
    }
}

/// Line range of the container list item named `name`
///
/// Matches both `- name: manager` and a `name: manager` key further down an
/// item (kustomize sorts keys, so `name` usually follows `image`).
pub fn container_scope(lines: &[&str], name: &str) -> Option<Range<usize>> {
    for (i, raw) in lines.iter().enumerate() {
        let line = Line::parse(raw);
        if !line.is_entry("name", name) {
            continue;
        }

        let item_start = if line.is_list_item {
            Some(i)
        } else {
            find_item_start(lines, i, line.indent)
        };

        if let Some(start) = item_start {
            return Some(locate_block(lines, start, BlockStyle::Item).span());
        }
    }
    None
}

/// Walk up from a key at `column` to the `- ` line that opens its item
fn find_item_start(lines: &[&str], from: usize, column: usize) -> Option<usize> {
    for j in (0..from).rev() {
        let line = Line::parse(lines[j]);
        if line.is_blank() {
            return None;
        }
        if line.indent < column {
            return (line.is_list_item && line.column() == column).then_some(j);
        }
    }
    None
}

/// Replace `range` of `lines` with `replacement` and rejoin the document
pub fn splice(lines: &[&str], range: Range<usize>, replacement: &[String]) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + replacement.len());
    out.extend_from_slice(&lines[..range.start]);
    out.extend(replacement.iter().map(String::as_str));
    out.extend_from_slice(&lines[range.end..]);
    out.join("\n")
}
