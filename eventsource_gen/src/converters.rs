// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Conversions for parameter types that `WriteEvent` cannot emit directly.

use crate::model::{KnownType, TypeRef};
use crate::syntax::Expr;
use crate::tree::{call, member};
use std::collections::HashMap;

/// Converts values of `source_type` into values of `target_type`.
pub trait ParameterConverter {
    fn source_type(&self) -> TypeRef;

    fn target_type(&self) -> TypeRef;

    /// Expression converting `value` (of `source_type`) to `target_type`.
    fn conversion_expression(&self, value: Expr) -> Expr;
}

/// Round-trippable constant format for `TimeSpan.ToString`.
pub const DURATION_FORMAT: &str = "c";

/// `System.TimeSpan` -> `string` via `value.ToString("c")`.
pub struct DurationConverter;

impl ParameterConverter for DurationConverter {
    fn source_type(&self) -> TypeRef {
        TypeRef::known(KnownType::TimeSpan)
    }

    fn target_type(&self) -> TypeRef {
        TypeRef::known(KnownType::String)
    }

    fn conversion_expression(&self, value: Expr) -> Expr {
        call(
            member(value, "ToString"),
            vec![Expr::Str(DURATION_FORMAT.to_owned())],
        )
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("a converter for {0} is already registered")]
pub struct DuplicateConverter(pub TypeRef);

/// Lookup table from source type to converter. At most one converter per
/// source type.
pub struct ConverterRegistry {
    converters: HashMap<TypeRef, Box<dyn ParameterConverter>>,
}

impl ConverterRegistry {
    /// A registry holding the built-in converters.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.converters.insert(
            DurationConverter.source_type(),
            Box::new(DurationConverter),
        );
        registry
    }

    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        converter: Box<dyn ParameterConverter>,
    ) -> Result<(), DuplicateConverter> {
        let source_type = converter.source_type();
        if self.converters.contains_key(&source_type) {
            return Err(DuplicateConverter(source_type));
        }
        self.converters.insert(source_type, converter);
        Ok(())
    }

    pub fn get(&self, source_type: &TypeRef) -> Option<&dyn ParameterConverter> {
        self.converters
            .get(source_type)
            .map(|converter| converter.as_ref())
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
