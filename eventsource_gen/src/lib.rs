// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Generates sealed `EventSource` implementations from abstract template
//! classes.
//!
//! The input is a resolved model of the template classes ([`model`]) plus a
//! [`host::SemanticHost`] that answers type questions about them; the output
//! is a typed C# declaration model ([`syntax`]) that [`writer`] prints.

#![forbid(unsafe_code)]

use crate::class_generator::ClassGenerator;
use crate::converters::ConverterRegistry;
use crate::errors::Diagnostics;
use crate::host::SemanticHost;
use crate::model::{CompilationUnit, TemplateClass};
use crate::settings::GeneratorSettings;
use crate::syntax::{ClassDecl, GeneratedUnit};

/// Generates the implementation of one template class using the built-in
/// parameter converters.
pub fn generate_class(
    class: &TemplateClass,
    host: &dyn SemanticHost,
    settings: &GeneratorSettings,
) -> Result<ClassDecl, Diagnostics> {
    let converters = ConverterRegistry::new();
    ClassGenerator::new(host, settings, &converters).generate(class)
}

/// Generates every template class of `unit`. Failed classes become inline
/// failure markers.
pub fn generate_unit(
    unit: &CompilationUnit,
    host: &dyn SemanticHost,
    settings: &GeneratorSettings,
) -> GeneratedUnit {
    let converters = ConverterRegistry::new();
    ClassGenerator::new(host, settings, &converters).generate_unit(unit)
}

pub mod class_generator;
pub mod constants;
pub mod converters;
pub mod errors;
pub mod host;
pub mod model;
pub mod overloads;
pub mod settings;
pub mod source_info;
pub mod syntax;
pub mod types;
pub mod writer;

mod event_info;
mod ident_builder;
mod method_generator;
mod parameter_info;
mod parser;
mod strings;
mod tree;
mod write_generator;

#[cfg(test)]
mod tests;
