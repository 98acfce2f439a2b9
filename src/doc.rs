//! Documentation-string assembly.
//!
//! Each parameter renders its own entry (see [`Param::doc`](crate::param));
//! this module wraps body text and assembles the full document: entries
//! grouped by section, sections and entries ordered case-insensitively
//! unless an explicit section order was configured.

use std::collections::BTreeMap;

/// Total line width for wrapped doc bodies, indent included.
pub(crate) const WRAP_WIDTH: usize = 66;

/// Greedy word wrap of a single logical line.
///
/// `width` includes the indent. The first output line carries `initial`,
/// continuation lines carry `subsequent` (deeper for bullet lines, so
/// wrapped bullets hang under their marker). Whitespace runs collapse.
pub(crate) fn wrap(text: &str, initial: &str, subsequent: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut indent = initial;

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = format!("{indent}{word}");
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            indent = subsequent;
            current = format!("{indent}{word}");
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Assemble rendered `(section, text)` entries into the final document.
///
/// Parameters without a section come first, unindented and without a
/// header. Named sections follow: in the explicit `section_order` when one
/// is given (sections it does not mention are omitted), otherwise sorted
/// case-insensitively. Entries within a section are sorted
/// case-insensitively by their rendered text and separated by a blank
/// line carried at the entry indent; an unindented blank line precedes
/// each section header. Trailing whitespace is trimmed from the result.
pub(crate) fn assemble(
    entries: &[(Option<String>, String)],
    section_order: Option<&[String]>,
    indent: usize,
) -> String {
    let mut unlabeled: Vec<&str> = Vec::new();
    let mut sections: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (section, text) in entries {
        match section {
            Some(name) => sections.entry(name).or_default().push(text),
            None => unlabeled.push(text),
        }
    }
    unlabeled.sort_by_key(|t| t.to_lowercase());
    for texts in sections.values_mut() {
        texts.sort_by_key(|t| t.to_lowercase());
    }

    let ordered: Vec<&str> = match section_order {
        Some(order) => order
            .iter()
            .map(String::as_str)
            .filter(|name| sections.contains_key(name))
            .collect(),
        None => {
            let mut names: Vec<&str> = sections.keys().copied().collect();
            names.sort_by_key(|n| n.to_lowercase());
            names
        }
    };

    let pad = " ".repeat(indent);
    let entry_pad = " ".repeat(indent + 4);
    let mut out = String::new();
    for (i, text) in unlabeled.iter().enumerate() {
        if i > 0 {
            out.push_str(&pad);
            out.push('\n');
        }
        push_entry(&mut out, text, &pad);
    }
    for name in ordered {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&pad);
        out.push_str(name);
        out.push_str(":\n");
        for (i, text) in sections[name].iter().enumerate() {
            if i > 0 {
                out.push_str(&entry_pad);
                out.push('\n');
            }
            push_entry(&mut out, text, &entry_pad);
        }
    }
    out.trim_end().to_string()
}

fn push_entry(out: &mut String, text: &str, pad: &str) {
    for line in text.lines() {
        out.push_str(pad);
        out.push_str(line);
        out.push('\n');
    }
}
