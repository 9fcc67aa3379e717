//! Final whitespace tidy-up

const OPEN_MARKER: &str = "{{- if ";
const END_MARKER: &str = "{{- end }}";

/// Drop the blank lines directly after `{{- if ... }}` or directly before
/// `{{- end }}`
///
/// A whole run of blank lines goes at once, so a second call is a no-op.
/// The empty segment after a document's final newline is never touched.
pub fn collapse_blank_line_after_if(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    let is_blank = |i: usize| i < last && lines[i].trim().is_empty();
    let skip_blank = |mut i: usize| {
        while is_blank(i) {
            i += 1;
        }
        i
    };

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.contains(OPEN_MARKER) {
            out.push(line);
            i = skip_blank(i + 1);
            continue;
        }
        if is_blank(i) {
            let next = skip_blank(i);
            if lines[next].contains(END_MARKER) {
                i = next;
                continue;
            }
        }
        out.push(line);
        i += 1;
    }
    out.join("\n")
}
