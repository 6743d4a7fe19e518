// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::fmt::Write;

/// Produces numbered C# identifiers such as `arg0`, `arg1`.
pub struct IdentBuilder {
    ident: String,
    base_len: usize,
}

impl IdentBuilder {
    pub fn new(base_name: &str) -> IdentBuilder {
        let mut builder = Self {
            ident: String::with_capacity(base_name.len() + 4),
            base_len: base_name.len(),
        };

        builder.ident.push_str(base_name);

        return builder;
    }

    pub fn set_suffix(&mut self, suffix: usize) -> &str {
        self.ident.truncate(self.base_len);
        let _ = write!(self.ident, "{}", suffix);
        return &self.ident;
    }

    /// Shorthand for `set_suffix(suffix).to_owned()`.
    pub fn nth(&mut self, suffix: usize) -> String {
        self.set_suffix(suffix).to_owned()
    }
}
