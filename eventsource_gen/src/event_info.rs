// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::constants::{ConstantExpressionCollector, ConstantsCollection};
use crate::errors::{Diagnostic, DiagnosticKind, Diagnostics, Errors};
use crate::host::{ClassificationKind, TracingBase};
use crate::model::{Attribute, ConstValue, TemplateMethod};
use crate::strings::*;
use crate::syntax::{AttributeArg, AttributeSpec};

/// The event annotation of a template method, translated for the generated
/// class.
pub struct EventInfo {
    pub event_id: i32,
    /// Every annotation of the source method in declaration order, with the
    /// event annotation rewritten into the base's `Event` annotation.
    pub attributes: Vec<AttributeSpec>,
}

/// True for `TemplateEvent` (any namespace) or the base's own `Event`.
pub fn is_event_attribute(attribute: &Attribute, base: TracingBase) -> bool {
    match attribute.simple_name() {
        TEMPLATE_EVENT_ATTRIBUTE => true,
        EVENT_ATTRIBUTE => base.owns(attribute.namespace()),
        _ => false,
    }
}

/// True if `method` carries the base's own `Event` annotation and no
/// `TemplateEvent` annotation.
pub fn has_only_base_event_attribute(method: &TemplateMethod, base: TracingBase) -> bool {
    let mut base_event = false;
    for attribute in &method.attributes {
        match attribute.simple_name() {
            TEMPLATE_EVENT_ATTRIBUTE => return false,
            EVENT_ATTRIBUTE if base.owns(attribute.namespace()) => base_event = true,
            _ => {}
        }
    }
    base_event
}

/// Reproduces `attribute` with its arguments as written.
pub fn copy_attribute(attribute: &Attribute) -> AttributeSpec {
    let name = attribute
        .name
        .strip_suffix("Attribute")
        .unwrap_or(&attribute.name);
    AttributeSpec {
        name: name.to_owned(),
        arguments: attribute
            .arguments
            .iter()
            .map(|arg| AttributeArg {
                name: arg.name.clone(),
                value: arg.expression.clone(),
            })
            .collect(),
    }
}

impl EventInfo {
    pub fn from_method(
        class_name: &str,
        method: &TemplateMethod,
        base: TracingBase,
        collector: &ConstantExpressionCollector<'_>,
        constants: &mut ConstantsCollection,
    ) -> Result<EventInfo, Diagnostics> {
        let mut errors = Errors::new();
        let location = method.location;

        let event_attributes = method
            .attributes
            .iter()
            .filter(|attribute| is_event_attribute(attribute, base))
            .count();
        if event_attributes != 1 {
            return Err(Diagnostic::new(
                DiagnosticKind::AnnotationShapeError,
                location,
                format!(
                    "The method {}.{} must carry exactly one {}Attribute or {}Attribute, found {}.",
                    class_name, method.name, TEMPLATE_EVENT_ATTRIBUTE, EVENT_ATTRIBUTE, event_attributes
                ),
            )
            .into());
        }

        let mut event_id = 0;
        let mut attributes = Vec::with_capacity(method.attributes.len());
        for attribute in &method.attributes {
            if !is_event_attribute(attribute, base) {
                attributes.push(copy_attribute(attribute));
                continue;
            }

            let attribute_name = format!("{}Attribute", attribute.simple_name());
            let location = attribute.location.or(location);
            match attribute.positional_arguments().next() {
                None => errors.add(
                    DiagnosticKind::AnnotationShapeError,
                    location,
                    format!("The {attribute_name} attribute must have an event ID as its first argument."),
                ),
                Some(arg) => match arg.value.as_ref().map(|value| match value {
                    ConstValue::Int(id) => i32::try_from(*id).ok(),
                    _ => None,
                }) {
                    Some(Some(id)) => event_id = id,
                    _ => errors.add(
                        DiagnosticKind::AnnotationShapeError,
                        arg.location.or(location),
                        format!("The first argument to the {attribute_name} attribute must be of type Int32."),
                    ),
                },
            }

            let mut translated = AttributeSpec::new(base.type_name(EVENT_ATTRIBUTE));
            for arg in &attribute.arguments {
                let kind = arg
                    .name
                    .as_deref()
                    .and_then(ClassificationKind::from_argument_name);
                let value = match kind {
                    Some(kind) => match collector.collect(kind, arg, constants) {
                        Ok(rewritten) => rewritten,
                        Err(diagnostic) => {
                            errors.push(diagnostic.or_location(location));
                            continue;
                        }
                    },
                    None => arg.expression.clone(),
                };
                translated.arguments.push(AttributeArg {
                    name: arg.name.clone(),
                    value,
                });
            }
            attributes.push(translated);
        }

        errors.check()?;
        Ok(EventInfo {
            event_id,
            attributes,
        })
    }
}
