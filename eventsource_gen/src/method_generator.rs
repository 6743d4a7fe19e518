// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::constants::{ConstantExpressionCollector, ConstantsCollection};
use crate::converters::ConverterRegistry;
use crate::errors::{Diagnostic, DiagnosticKind, Diagnostics, Errors};
use crate::event_info::EventInfo;
use crate::host::{SemanticHost, TracingBase};
use crate::model::{Accessibility, Location, TemplateClass, TemplateMethod, TypeRef};
use crate::overloads::OverloadRegistry;
use crate::parameter_info::ParameterInfo;
use crate::strings::*;
use crate::syntax::{AttributeSpec, Expr, MethodDecl, Modifier, ParamDecl, Stmt};
use crate::tree::{call, ident, if_enabled, write_event_call};
use crate::types::TypeSupport;

/// Implements template event methods.
pub struct MethodGenerator<'a> {
    host: &'a dyn SemanticHost,
    base: TracingBase,
    support: TypeSupport,
    converters: &'a ConverterRegistry,
}

impl<'a> MethodGenerator<'a> {
    pub fn new(
        host: &'a dyn SemanticHost,
        base: TracingBase,
        support: TypeSupport,
        converters: &'a ConverterRegistry,
    ) -> Self {
        Self {
            host,
            base,
            support,
            converters,
        }
    }

    /// Returns the override for `method`, preceded by nothing if every
    /// parameter is natively supported, or returns the non-event wrapper
    /// followed by the private event method otherwise. Diagnostics fall back
    /// to the method's location, then the class's.
    pub fn generate(
        &self,
        class: &TemplateClass,
        method: &TemplateMethod,
        overloads: &mut OverloadRegistry,
        constants: &mut ConstantsCollection,
    ) -> Result<Vec<MethodDecl>, Diagnostics> {
        let class_name = class.name.as_str();
        let location = method.location.or(class.location);
        let mut errors = Errors::new();

        if !method.is_abstract {
            errors.add(
                DiagnosticKind::StructuralViolation,
                location,
                format!(
                    "The method {}.{} must be abstract to participate in EventSource generation.",
                    class_name, method.name
                ),
            );
        }
        if !method.return_type.is_void() {
            errors.add(
                DiagnosticKind::StructuralViolation,
                location,
                format!(
                    "The method {}.{} must return void to participate in EventSource generation.",
                    class_name, method.name
                ),
            );
        }
        errors.check()?;

        if !method.source_available {
            return Err(Diagnostic::new(
                DiagnosticKind::BaseResolutionError,
                location,
                format!(
                    "Cannot find the source file containing the method {}. The source code must be available for any template EventSource class to participate in generation.",
                    method.name
                ),
            )
            .into());
        }

        let collector = ConstantExpressionCollector::new(self.host, self.base);
        let event = EventInfo::from_method(class_name, method, self.base, &collector, constants)
            .map_err(|diagnostics| diagnostics.or_location(class.location))?;

        let parameters: Vec<ParameterInfo<'a>> = method
            .parameters
            .iter()
            .map(|parameter| ParameterInfo::new(parameter, self.support, self.converters))
            .collect();
        self.check_parameters(location, &parameters)?;

        if overloads.try_add(&parameters) {
            log::debug!("{}.{} requires a new WriteEvent overload", class_name, method.name);
        }

        if parameters.iter().all(|p| p.natively_supported) {
            log::debug!("{}.{}: direct override, event id {}", class_name, method.name, event.event_id);
            Ok(vec![MethodDecl {
                attributes: event.attributes,
                accessibility: method.accessibility,
                modifiers: vec![Modifier::Override],
                return_type: TypeRef::default(),
                name: method.name.clone(),
                parameters: source_params(&parameters),
                body: vec![if_enabled(vec![write_event_call(
                    event.event_id,
                    parameters.iter().map(|p| ident(&p.name)).collect(),
                )])],
            }])
        } else {
            log::debug!(
                "{}.{}: wrapper with conversion, event id {}",
                class_name,
                method.name,
                event.event_id
            );
            let wrapper = MethodDecl {
                attributes: vec![AttributeSpec::new(self.base.type_name(NON_EVENT_ATTRIBUTE))],
                accessibility: method.accessibility,
                modifiers: vec![Modifier::Override],
                return_type: TypeRef::default(),
                name: method.name.clone(),
                parameters: source_params(&parameters),
                body: vec![if_enabled(vec![Stmt::Expr(call(
                    ident(&method.name),
                    parameters.iter().map(ParameterInfo::argument_expression).collect(),
                ))])],
            };

            let implementation = MethodDecl {
                attributes: event.attributes,
                accessibility: Accessibility::Private,
                modifiers: Vec::new(),
                return_type: TypeRef::default(),
                name: method.name.clone(),
                parameters: parameters
                    .iter()
                    .map(|p| ParamDecl::new(p.target_type.clone(), p.name.clone()))
                    .collect(),
                body: vec![write_event_call(
                    event.event_id,
                    parameters.iter().map(|p| ident(&p.name)).collect::<Vec<Expr>>(),
                )],
            };

            Ok(vec![wrapper, implementation])
        }
    }

    fn check_parameters(
        &self,
        location: Option<Location>,
        parameters: &[ParameterInfo<'_>],
    ) -> Result<(), Diagnostics> {
        let mut errors = Errors::new();

        let unsupported: Vec<&ParameterInfo> =
            parameters.iter().filter(|p| !p.is_supported()).collect();
        if let Some(first) = unsupported.first() {
            let names: Vec<String> = unsupported
                .iter()
                .map(|p| format!("{} ({})", p.name, p.source_type))
                .collect();
            errors.add(
                DiagnosticKind::UnsupportedParameterType,
                first.location.or(location),
                format!("The parameter(s) {} are not supported.", join_names(&names)),
            );
        }

        for parameter in parameters {
            if matches!(parameter.target_type, TypeRef::Enum(_))
                && self.host.enum_underlying_type(&parameter.target_type).is_none()
            {
                errors.add(
                    DiagnosticKind::BaseResolutionError,
                    parameter.location.or(location),
                    format!(
                        "The underlying type of the enumeration {} of parameter {} could not be resolved.",
                        parameter.target_type, parameter.name
                    ),
                );
            }
        }

        errors.check()
    }
}

fn source_params(parameters: &[ParameterInfo<'_>]) -> Vec<ParamDecl> {
    parameters
        .iter()
        .map(|p| ParamDecl::new(p.source_type.clone(), p.name.clone()))
        .collect()
}

/// `a`, `a and b`, `a, b and c`.
fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
