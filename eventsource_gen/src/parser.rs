// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::errors::{Diagnostic, DiagnosticKind};
use crate::model::Location;
use core::ops::Range;
use proc_macro2::{LineColumn, Span};
use quote::ToTokens;
use syn::Expr;

/// An annotation argument expression parsed into a `syn` tree, remembering
/// its source text so that sub-expressions can be sliced out verbatim and
/// their spans mapped back onto the template's source file.
///
/// The flag-combination grammar accepted for classification arguments
/// (`A.B | (C.D & 0x10) ^ 4 + E.F`) is token-compatible with Rust
/// expressions, so `syn` does the parsing.
pub struct ParsedExpr<'a> {
    text: &'a str,
    origin: Option<Location>,
    pub expr: Expr,
}

impl<'a> ParsedExpr<'a> {
    pub fn parse(text: &'a str, origin: Option<Location>) -> Result<Self, Diagnostic> {
        match syn::parse_str::<Expr>(text) {
            Ok(expr) => Ok(Self { text, origin, expr }),
            Err(e) => {
                let location = map_location(origin, e.span().start());
                Err(Diagnostic::new(
                    DiagnosticKind::UnsupportedExpressionForm,
                    location,
                    format!("Unsupported expression `{}` found in enum assignment expression: {}.", text.trim(), e),
                ))
            }
        }
    }

    pub fn source(&self) -> &'a str {
        self.text
    }

    /// Byte range of `node` within the source text.
    pub fn range_of<T: ToTokens>(&self, node: &T) -> Option<Range<usize>> {
        let mut tokens = node.to_token_stream().into_iter();
        let first = tokens.next()?.span();
        let last = tokens.last().map_or(first, |tt| tt.span());

        let start = byte_offset(self.text, first.start())?;
        let end = byte_offset(self.text, last.end())?;
        (start <= end).then_some(start..end)
    }

    /// The source text of `node`, or its token rendering if the span cannot
    /// be mapped.
    pub fn text_of<T: ToTokens>(&self, node: &T) -> String {
        match self.range_of(node) {
            Some(range) => self.text[range].to_owned(),
            None => node.to_token_stream().to_string(),
        }
    }

    pub fn location_of(&self, span: Span) -> Option<Location> {
        map_location(self.origin, span.start())
    }

    /// Replaces each range with its text. Ranges must not overlap.
    pub fn rewrite(&self, mut edits: Vec<(Range<usize>, String)>) -> String {
        edits.sort_by_key(|(range, _)| range.start);

        let mut out = String::with_capacity(self.text.len());
        let mut pos = 0;
        for (range, replacement) in edits {
            if range.start < pos {
                continue;
            }
            out.push_str(&self.text[pos..range.start]);
            out.push_str(&replacement);
            pos = range.end;
        }
        out.push_str(&self.text[pos..]);
        out.trim().to_owned()
    }
}

/// Converts a 1-based line, 0-based char column into a byte offset.
fn byte_offset(text: &str, at: LineColumn) -> Option<usize> {
    let mut line_start = 0;
    for _ in 1..at.line {
        line_start += text[line_start..].find('\n')? + 1;
    }

    let line = &text[line_start..];
    let line = &line[..line.find('\n').unwrap_or(line.len())];
    if at.column == line.chars().count() {
        return Some(line_start + line.len());
    }
    line.char_indices()
        .nth(at.column)
        .map(|(offset, _)| line_start + offset)
}

fn map_location(origin: Option<Location>, at: LineColumn) -> Option<Location> {
    let origin = origin?;
    let column = u32::try_from(at.column).ok()?;
    if at.line <= 1 {
        Some(Location::new(origin.line, origin.column + column))
    } else {
        let line = u32::try_from(at.line - 1).ok()?;
        Some(Location::new(origin.line + line, column + 1))
    }
}
