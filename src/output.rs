use serde::de::IgnoredAny;
use std::borrow::Cow;
use std::io::{IsTerminal, Write};

const INDENT: &[u8] = b"  ";

/// Re-indents `bytes` with two spaces when they are valid JSON, touching only
/// whitespace outside strings. Anything else comes back unchanged.
pub fn format_json(bytes: &[u8]) -> Cow<'_, [u8]> {
    if serde_json::from_slice::<IgnoredAny>(bytes).is_err() {
        return Cow::Borrowed(bytes);
    }
    Cow::Owned(indent(bytes))
}

// Input has already been validated, so brackets are balanced.
fn indent(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut just_opened = false;

    for &b in src {
        if in_string {
            out.push(b);
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
            continue;
        }
        if just_opened {
            just_opened = false;
            if matches!(b, b'}' | b']') {
                depth = depth.saturating_sub(1);
                out.push(b);
                continue;
            }
            newline(&mut out, depth);
        }
        match b {
            b'"' => {
                in_string = true;
                out.push(b);
            }
            b'{' | b'[' => {
                out.push(b);
                depth += 1;
                just_opened = true;
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                newline(&mut out, depth);
                out.push(b);
            }
            b',' => {
                out.push(b);
                newline(&mut out, depth);
            }
            b':' => out.extend_from_slice(b": "),
            _ => out.push(b),
        }
    }
    out
}

fn newline(out: &mut Vec<u8>, depth: usize) {
    out.push(b'\n');
    for _ in 0..depth {
        out.extend_from_slice(INDENT);
    }
}

pub fn write_response(out: &mut impl Write, bytes: &[u8]) -> std::io::Result<()> {
    out.write_all(&format_json(bytes))?;
    out.write_all(b"\n")?;
    out.flush()
}

pub fn write_request_trace(
    out: &mut impl Write,
    target: &str,
    pretty_request: &str,
) -> std::io::Result<()> {
    writeln!(out, "Lambda ARN: {target}")?;
    writeln!(out, "Request payload:\n{pretty_request}\n")?;
    writeln!(out, "Invoking Lambda...\n")
}

pub fn write_status_trace(out: &mut impl Write, status_code: i32) -> std::io::Result<()> {
    writeln!(out, "Status code: {status_code}")?;
    writeln!(out, "Response:")
}

fn error_line(msg: &str, color: bool) -> String {
    use colored::Colorize;
    if color {
        msg.red().to_string()
    } else {
        msg.to_string()
    }
}

pub fn print_error(msg: &str) {
    eprintln!("{}", error_line(msg, std::io::stderr().is_terminal()));
}
