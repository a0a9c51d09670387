//! Configuration file materialization (wizard step 2).
//!
//! Renders the operator-provided templates in the library directory by
//! literal token substitution and writes the generated files next to them.
//! Substitution is a single left-to-right pass: the token table is tried in
//! order at every position and replaced text is never rescanned, so
//! overlapping tokens cannot partially match and values containing token
//! text are not re-substituted.

use crate::core::context::SetupContext;
use crate::core::error::SetupError;
use std::fs;
use std::path::PathBuf;

/// (template, generated file) pairs, both relative to the library directory.
pub const TEMPLATE_FILES: &[(&str, &str)] = &[
    ("globals.example.conf", "globals.conf"),
    ("globals_admin.example.conf", "globals_admin.conf"),
    ("globals_public.example.conf", "globals_public.conf"),
];

/// Ordered substitution table for one materialization run.
pub type TokenTable = Vec<(&'static str, String)>;

/// Replace every occurrence of each token with its value.
pub fn substitute(input: &str, tokens: &TokenTable) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    'scan: while !rest.is_empty() {
        for (token, value) in tokens {
            if rest.starts_with(token) {
                out.push_str(value);
                rest = &rest[token.len()..];
                continue 'scan;
            }
        }
        if let Some(ch) = rest.chars().next() {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

/// Render every template and write the generated files. Returns the paths
/// written, in table order.
pub fn materialize(ctx: &SetupContext, tokens: &TokenTable) -> Result<Vec<PathBuf>, SetupError> {
    let mut written = Vec::with_capacity(TEMPLATE_FILES.len());
    for (source, dest) in TEMPLATE_FILES {
        let content = fs::read_to_string(ctx.template_path(source))?;
        let rendered = substitute(&content, tokens);
        let dest_path = ctx.template_path(dest);
        fs::write(&dest_path, rendered)?;
        written.push(dest_path);
    }
    Ok(written)
}
