//! Canonical writer for the plist dialect.
//!
//! Output is fully deterministic: dict keys are emitted in sorted order
//! (guaranteed by [`Dictionary`]), indentation is tabs, and every character
//! above 0x7F is written as a decimal numeric character reference so the
//! document stays 7-bit ASCII.

use crate::value::{Dictionary, Value};

const HEADER: &str = "// !$*UTF8*$!";

/// Render a complete document: header line, the value, trailing newline.
pub fn write_document(value: &Value) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    write_value(value, 0, &mut out);
    out.push('\n');
    out
}

fn write_value(value: &Value, indent: usize, out: &mut String) {
    match value {
        Value::String(s) => out.push_str(&encode_string(s)),
        Value::Array(items) => write_array(items, indent, out),
        Value::Dict(entries) => write_dict(entries, indent, out),
    }
}

fn write_array(items: &[Value], indent: usize, out: &mut String) {
    out.push('(');
    out.push('\n');
    for item in items {
        push_tabs(indent + 1, out);
        write_value(item, indent + 1, out);
        out.push(',');
        out.push('\n');
    }
    push_tabs(indent, out);
    out.push(')');
}

fn write_dict(entries: &Dictionary, indent: usize, out: &mut String) {
    out.push('{');
    out.push('\n');
    for (key, value) in entries {
        push_tabs(indent + 1, out);
        out.push_str(&encode_string(key));
        out.push_str(" = ");
        write_value(value, indent + 1, out);
        out.push(';');
        out.push('\n');
    }
    push_tabs(indent, out);
    out.push('}');
}

fn push_tabs(n: usize, out: &mut String) {
    for _ in 0..n {
        out.push('\t');
    }
}

/// Returns `true` if `s` can be written as an unquoted token.
fn is_unquoted_safe(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.' | '-')
        })
}

/// Encode a string as a token: unquoted where the charset allows, otherwise
/// quoted with backslash escapes and `&#N;` references for non-ASCII.
pub fn encode_string(s: &str) -> String {
    if is_unquoted_safe(s) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            // A literal ampersand is written as its own reference, so text
            // that happens to contain "&#233;" survives the decode exactly.
            '&' => out.push_str("&#38;"),
            c if (c as u32) > 0x7F => {
                out.push_str(&format!("&#{};", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
