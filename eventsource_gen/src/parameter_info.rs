// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::converters::{ConverterRegistry, ParameterConverter};
use crate::model::{Location, Parameter, TypeRef};
use crate::syntax::Expr;
use crate::tree::ident;
use crate::types::TypeSupport;

pub struct ParameterInfo<'c> {
    pub name: String,
    pub source_type: TypeRef,
    /// `source_type` if natively supported, else the converter's output type.
    pub target_type: TypeRef,
    pub natively_supported: bool,
    pub converter: Option<&'c dyn ParameterConverter>, // Only when not natively supported.
    pub location: Option<Location>,
}

impl<'c> ParameterInfo<'c> {
    pub fn new(
        parameter: &Parameter,
        support: TypeSupport,
        converters: &'c ConverterRegistry,
    ) -> Self {
        let natively_supported = support.is_natively_supported(&parameter.ty);
        let converter = if natively_supported {
            None
        } else {
            converters.get(&parameter.ty)
        };
        let target_type = converter.map_or_else(|| parameter.ty.clone(), |c| c.target_type());

        Self {
            name: parameter.name.clone(),
            source_type: parameter.ty.clone(),
            target_type,
            natively_supported,
            converter,
            location: parameter.location,
        }
    }

    pub fn has_converter(&self) -> bool {
        self.converter.is_some()
    }

    pub fn is_supported(&self) -> bool {
        self.natively_supported || self.has_converter()
    }

    /// The parameter passed through its converter, or unchanged.
    pub fn argument_expression(&self) -> Expr {
        match self.converter {
            Some(converter) => converter.conversion_expression(ident(&self.name)),
            None => ident(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KnownType;

    #[test]
    fn classification_of_parameters() {
        let converters = ConverterRegistry::new();
        let support = TypeSupport::new(false);

        let native = ParameterInfo::new(
            &Parameter::new("name", TypeRef::known(KnownType::String)),
            support,
            &converters,
        );
        assert!(native.natively_supported);
        assert!(!native.has_converter());
        assert_eq!(native.target_type, native.source_type);
        assert_eq!(native.argument_expression(), ident("name"));

        let converted = ParameterInfo::new(
            &Parameter::new("elapsed", TypeRef::known(KnownType::TimeSpan)),
            support,
            &converters,
        );
        assert!(!converted.natively_supported);
        assert!(converted.is_supported());
        assert_eq!(converted.target_type, TypeRef::known(KnownType::String));
        assert_ne!(converted.argument_expression(), ident("elapsed"));

        let unsupported = ParameterInfo::new(
            &Parameter::new("payload", TypeRef::known(KnownType::Object)),
            support,
            &converters,
        );
        assert!(!unsupported.is_supported());
        assert_eq!(unsupported.target_type, TypeRef::known(KnownType::Object));
    }
}
