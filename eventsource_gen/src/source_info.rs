// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::errors::{DiagnosticKind, Diagnostics, Errors};
use crate::event_info::copy_attribute;
use crate::host::TracingBase;
use crate::model::{ConstValue, TemplateClass};
use crate::strings::*;
use crate::syntax::{AttributeArg, AttributeSpec};
use uuid::Uuid;

/// Options read from the named arguments of the class-level
/// `TemplateEventSource` annotation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    pub target_class_name: Option<String>,
    pub suppress_singleton_generation: bool,
    pub allow_unsafe_code: bool,
    pub net45_event_source_compatibility: bool,
}

/// The class-level facts of a template class.
pub struct SourceInfo {
    pub options: GenerationOptions,
    /// Every class annotation in declaration order, with `TemplateEventSource`
    /// rewritten into the base's `EventSource` annotation.
    pub attributes: Vec<AttributeSpec>,
}

impl SourceInfo {
    pub fn from_class(class: &TemplateClass, base: TracingBase) -> Result<SourceInfo, Diagnostics> {
        let mut errors = Errors::new();
        let mut options = GenerationOptions::default();
        let mut attributes = Vec::with_capacity(class.attributes.len() + 1);
        let mut template_seen = false;

        for attribute in &class.attributes {
            if attribute.simple_name() != TEMPLATE_EVENT_SOURCE_ATTRIBUTE {
                attributes.push(copy_attribute(attribute));
                continue;
            }

            if template_seen {
                errors.add(
                    DiagnosticKind::AnnotationShapeError,
                    attribute.location.or(class.location),
                    format!(
                        "The class '{}' is decorated with multiple attributes named '{}Attribute'. At most one such attribute may be present on any one class.",
                        class.name, TEMPLATE_EVENT_SOURCE_ATTRIBUTE
                    ),
                );
                continue;
            }
            template_seen = true;

            let mut translated = AttributeSpec::new(base.type_name(EVENT_SOURCE_ATTRIBUTE));
            for arg in &attribute.arguments {
                let location = arg.location.or(attribute.location).or(class.location);
                let Some(name) = arg.name.as_deref() else {
                    translated.arguments.push(AttributeArg::positional(arg.expression.clone()));
                    continue;
                };

                if !GENERATION_OPTIONS.contains(&name) {
                    if name == GUID_ARGUMENT {
                        let valid = matches!(&arg.value, Some(ConstValue::Str(s)) if Uuid::parse_str(s).is_ok());
                        if !valid {
                            errors.add(
                                DiagnosticKind::AnnotationShapeError,
                                location,
                                format!(
                                    "The value {} for argument {} of attribute {}Attribute on {} is not a valid GUID.",
                                    arg.expression, name, TEMPLATE_EVENT_SOURCE_ATTRIBUTE, class.name
                                ),
                            );
                        }
                    }
                    translated
                        .arguments
                        .push(AttributeArg::named(name, arg.expression.clone()));
                    continue;
                }

                // Null values leave the default in place.
                let Some(value) = &arg.value else {
                    continue;
                };
                let wrong_type = |expected: &str| {
                    format!(
                        "The value for argument {} of attribute {}Attribute on {} has the wrong type. Expected {}, found {}.",
                        name, TEMPLATE_EVENT_SOURCE_ATTRIBUTE, class.name, expected, value.type_name()
                    )
                };
                match (name, value) {
                    (OPTION_TARGET_CLASS_NAME, ConstValue::Str(s)) => {
                        options.target_class_name = Some(s.clone())
                    }
                    (OPTION_SUPPRESS_SINGLETON, ConstValue::Bool(b)) => {
                        options.suppress_singleton_generation = *b
                    }
                    (OPTION_ALLOW_UNSAFE_CODE, ConstValue::Bool(b)) => options.allow_unsafe_code = *b,
                    (OPTION_NET45_COMPATIBILITY, ConstValue::Bool(b)) => {
                        options.net45_event_source_compatibility = *b
                    }
                    (OPTION_TARGET_CLASS_NAME, _) => {
                        errors.add(DiagnosticKind::AnnotationShapeError, location, wrong_type("String"))
                    }
                    _ => errors.add(DiagnosticKind::AnnotationShapeError, location, wrong_type("Boolean")),
                }
            }
            attributes.push(translated);
        }

        errors.check()?;
        Ok(SourceInfo {
            options,
            attributes,
        })
    }

    /// Explicit override; else the template name without a trailing `Base` or
    /// `Template`; else the template name plus `Impl`.
    pub fn target_class_name(&self, template_name: &str) -> String {
        if let Some(name) = &self.options.target_class_name {
            return name.clone();
        }

        TEMPLATE_SUFFIXES
            .iter()
            .find_map(|suffix| {
                template_name
                    .strip_suffix(suffix)
                    .filter(|stem| !stem.is_empty())
            })
            .map_or_else(|| format!("{template_name}{TARGET_SUFFIX}"), str::to_owned)
    }
}
