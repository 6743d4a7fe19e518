// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Bookkeeping for low-level `WriteEvent` overloads.

use crate::host::WriteOverloadDecl;
use crate::model::{KnownType, TypeRef};
use crate::parameter_info::ParameterInfo;
use core::fmt;
use indexmap::IndexSet;

/// Ordered parameter types of a `WriteEvent` overload, not counting the
/// leading event id. Equality is structural.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OverloadSignature(pub Vec<TypeRef>);

impl OverloadSignature {
    pub fn types(&self) -> &[TypeRef] {
        &self.0
    }
}

impl fmt::Display for OverloadSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(int")?;
        for ty in &self.0 {
            write!(f, ", {ty}")?;
        }
        f.write_str(")")
    }
}

/// The overloads the base already provides, usable as exact matches.
#[derive(Clone, Debug, Default)]
pub struct BaseOverloads {
    signatures: IndexSet<OverloadSignature>,
}

impl BaseOverloads {
    /// Keeps overloads whose first parameter is the `int` event id, that take
    /// no `params` array, and that have no `object` parameter.
    pub fn from_declarations(declarations: &[WriteOverloadDecl]) -> Self {
        let signatures = declarations
            .iter()
            .filter(|decl| !decl.params_array)
            .filter(|decl| {
                decl.parameters
                    .first()
                    .is_some_and(|first| first.is_known(KnownType::Int32))
            })
            .filter(|decl| {
                !decl.parameters.iter().any(|ty| {
                    ty.is_known(KnownType::Object)
                        || matches!(ty, TypeRef::Array(element) if element.is_known(KnownType::Object))
                })
            })
            .map(|decl| OverloadSignature(decl.parameters[1..].to_vec()))
            .collect();

        Self { signatures }
    }

    pub fn contains(&self, signature: &OverloadSignature) -> bool {
        self.signatures.contains(signature)
    }
}

/// The overloads that must be synthesized, in first-required order.
pub struct OverloadRegistry {
    base: BaseOverloads,
    added: IndexSet<OverloadSignature>,
}

impl OverloadRegistry {
    pub fn new(base: BaseOverloads) -> Self {
        Self {
            base,
            added: IndexSet::new(),
        }
    }

    /// Registers the target-type signature of `parameters`. Returns false if
    /// any parameter is unsupported or the signature is already available.
    pub fn try_add(&mut self, parameters: &[ParameterInfo<'_>]) -> bool {
        if parameters.iter().any(|p| !p.is_supported()) {
            return false;
        }

        let signature =
            OverloadSignature(parameters.iter().map(|p| p.target_type.clone()).collect());
        self.try_add_signature(signature)
    }

    pub fn try_add_signature(&mut self, signature: OverloadSignature) -> bool {
        if self.base.contains(&signature) {
            log::debug!("WriteEvent{signature} is provided by the base");
            return false;
        }

        let added = self.added.insert(signature);
        if added {
            log::debug!(
                "WriteEvent{} must be synthesized",
                self.added.last().map_or_else(String::new, |s| s.to_string())
            );
        }
        added
    }

    pub fn signatures(&self) -> impl Iterator<Item = &OverloadSignature> {
        self.added.iter()
    }

    pub fn len(&self) -> usize {
        self.added.len()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }
}
