// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::constants::ConstantsCollection;
use crate::converters::ConverterRegistry;
use crate::errors::{Diagnostic, DiagnosticKind, Diagnostics, Errors};
use crate::event_info::{has_only_base_event_attribute, is_event_attribute};
use crate::host::{ClassificationKind, SemanticHost, TracingBase};
use crate::model::{Accessibility, CompilationUnit, TemplateClass, TemplateMethod, TypeRef};
use crate::method_generator::MethodGenerator;
use crate::overloads::{BaseOverloads, OverloadRegistry};
use crate::settings::GeneratorSettings;
use crate::source_info::SourceInfo;
use crate::strings::*;
use crate::syntax::*;
use crate::tree::{cast, ident};
use crate::write_generator::WriteOverloadGenerator;
use crate::writer::csharp_string_literal;
use indexmap::IndexMap;

/// The tracing base `class` ultimately derives from, if any.
pub fn tracing_base(class: &TemplateClass) -> Option<TracingBase> {
    class
        .base_chain
        .iter()
        .find_map(|base| TracingBase::from_full_name(&base.name))
}

/// Assembles the generated class for a template class.
pub struct ClassGenerator<'a> {
    host: &'a dyn SemanticHost,
    settings: &'a GeneratorSettings,
    converters: &'a ConverterRegistry,
}

impl<'a> ClassGenerator<'a> {
    pub fn new(
        host: &'a dyn SemanticHost,
        settings: &'a GeneratorSettings,
        converters: &'a ConverterRegistry,
    ) -> Self {
        Self {
            host,
            settings,
            converters,
        }
    }

    pub fn generate(&self, class: &TemplateClass) -> Result<ClassDecl, Diagnostics> {
        self.check_shape(class)?;

        let Some(base) = tracing_base(class) else {
            return Err(Diagnostic::new(
                DiagnosticKind::BaseResolutionError,
                class.location,
                format!(
                    "The class '{}' does not derive from {} or {}.",
                    class.name,
                    TracingBase::System.full_name(),
                    TracingBase::Microsoft.full_name()
                ),
            )
            .into());
        };

        let source = SourceInfo::from_class(class, base)?;
        let target_name = source.target_class_name(&class.name);
        log::debug!("generating {} from {} ({})", target_name, class.name, base.namespace());

        let support = self.settings.type_support(&source.options);
        let mut overloads = OverloadRegistry::new(BaseOverloads::from_declarations(
            &self.host.write_overloads(base),
        ));
        let mut constants = ConstantsCollection::default();

        let methods = MethodGenerator::new(self.host, base, support, self.converters);
        let mut errors = Errors::new();
        let mut event_methods = Vec::new();
        for method in template_methods(class, base) {
            match methods.generate(class, method, &mut overloads, &mut constants) {
                Ok(generated) => event_methods.extend(generated.into_iter().map(Member::Method)),
                Err(diagnostics) => diagnostics.into_iter().for_each(|d| errors.push(d)),
            }
        }
        errors.check()?;

        let mut members = Vec::new();

        if !source.options.suppress_singleton_generation {
            members.push(Member::Region(Region {
                name: REGION_SINGLETON.to_owned(),
                members: singleton(&target_name, &class.name),
            }));
        }

        if !event_methods.is_empty() {
            members.push(Member::Region(Region {
                name: REGION_EVENT_METHODS.to_owned(),
                members: event_methods,
            }));
        }

        if source.options.allow_unsafe_code && !overloads.is_empty() {
            let mut writer = WriteOverloadGenerator::new(self.host, base);
            let mut errors = Errors::new();
            let mut write_methods = Vec::with_capacity(overloads.len());
            for signature in overloads.signatures() {
                match writer.generate(signature) {
                    Ok(method) => write_methods.push(Member::Method(method)),
                    Err(diagnostic) => errors.push(diagnostic),
                }
            }
            errors.check()?;

            members.push(Member::Region(Region {
                name: REGION_WRITE_OVERLOADS.to_owned(),
                members: write_methods,
            }));
        } else if !overloads.is_empty() {
            log::debug!(
                "{}: {} WriteEvent overload(s) not generated, unsafe code is not allowed",
                target_name,
                overloads.len()
            );
        }

        for kind in ClassificationKind::ALL {
            let table = constants.table(kind);
            if !table.is_empty() {
                members.push(Member::Class(constants_class(base, kind, table)));
            }
        }

        let mut attributes = source.attributes;
        attributes.push(
            AttributeSpec::new(GENERATED_CODE_ATTRIBUTE)
                .with_argument(AttributeArg::positional(csharp_string_literal(GENERATOR_NAME)))
                .with_argument(AttributeArg::positional(csharp_string_literal(GENERATOR_VERSION))),
        );

        Ok(ClassDecl {
            attributes,
            accessibility: if class.accessibility == Accessibility::Public {
                Accessibility::Public
            } else {
                Accessibility::Internal
            },
            modifiers: vec![Modifier::Sealed],
            name: target_name,
            base_type: Some(class.name.clone()),
            members,
        })
    }

    fn check_shape(&self, class: &TemplateClass) -> Result<(), Diagnostics> {
        let mut errors = Errors::new();

        if class.is_generic {
            errors.add(
                DiagnosticKind::StructuralViolation,
                class.location,
                format!(
                    "The template class '{}' for generating an EventSource implementation must not be generic.",
                    class.name
                ),
            );
        }

        if !class.is_abstract {
            errors.add(
                DiagnosticKind::StructuralViolation,
                class.location,
                format!(
                    "The class '{}' must be abstract to participate in EventSource implementation generation.",
                    class.name
                ),
            );
        }

        for name in RESERVED_MEMBER_NAMES {
            if let Some(location) = class.declared_member(name) {
                errors.add(
                    DiagnosticKind::StructuralViolation,
                    location.or(class.location),
                    format!(
                        "The class '{}' is not allowed to contain a member named '{}'. Choose a different name for this member. The generated class will have a new generated nested class called '{}', which is required by the event manifest generation.",
                        class.name, name, name
                    ),
                );
            }
        }

        errors.check()
    }

    /// Generates every qualifying class of `unit`, grouped by namespace. The
    /// global namespace comes first, then namespaces in order of appearance.
    pub fn generate_unit(&self, unit: &CompilationUnit) -> GeneratedUnit {
        let mut namespaces: IndexMap<Option<String>, Vec<UnitItem>> = IndexMap::new();

        for class in &unit.classes {
            if tracing_base(class).is_none() {
                log::warn!("skipping {}: it does not derive from EventSource", class.name);
                continue;
            }

            let item = match self.generate(class) {
                Ok(generated) => UnitItem::Class(generated),
                Err(diagnostics) => {
                    for diagnostic in diagnostics.iter() {
                        log::debug!("{}: {}", class.name, diagnostic.to_report_line());
                    }
                    UnitItem::Failure {
                        template_name: class.name.clone(),
                        diagnostics,
                    }
                }
            };
            namespaces
                .entry(class.namespace.clone())
                .or_default()
                .push(item);
        }

        if let Some(index) = namespaces.get_index_of(&None) {
            namespaces.move_index(index, 0);
        }

        GeneratedUnit {
            usings: unit.usings.clone(),
            namespaces: namespaces
                .into_iter()
                .map(|(name, items)| NamespaceDecl { name, items })
                .collect(),
        }
    }
}

/// Annotated methods of `class` and then of each ancestor, most derived first.
/// Methods already declared by a more derived class are skipped, as are
/// concrete methods carrying only the base's `Event` annotation.
fn template_methods(class: &TemplateClass, base: TracingBase) -> Vec<&TemplateMethod> {
    let ancestors = class
        .base_chain
        .iter()
        .take_while(|ancestor| TracingBase::from_full_name(&ancestor.name).is_none())
        .map(|ancestor| ancestor.methods.as_slice());

    let mut seen: Vec<&TemplateMethod> = Vec::new();
    let mut selected = Vec::new();
    for methods in core::iter::once(class.methods.as_slice()).chain(ancestors) {
        let level_start = seen.len();
        for method in methods {
            let overridden = seen[..level_start]
                .iter()
                .any(|derived| derived.has_same_signature(method));
            seen.push(method);
            if overridden {
                continue;
            }

            if !method.attributes.iter().any(|a| is_event_attribute(a, base)) {
                continue;
            }
            if has_only_base_event_attribute(method, base) && !method.is_abstract {
                log::debug!("skipping concrete event method {}", method.name);
                continue;
            }
            selected.push(method);
        }
    }
    selected
}

fn singleton(target_name: &str, template_name: &str) -> Vec<Member> {
    let target = TypeRef::named(target_name);
    vec![
        Member::Field(FieldDecl {
            accessibility: Accessibility::Private,
            modifiers: vec![Modifier::Static, Modifier::Readonly],
            ty: target.clone(),
            name: SINGLETON_FIELD.to_owned(),
            init: Some(Expr::New(target, Vec::new())),
        }),
        Member::Property(PropertyDecl {
            accessibility: Accessibility::Public,
            modifiers: vec![Modifier::Static],
            ty: TypeRef::named(template_name),
            name: SINGLETON_PROPERTY.to_owned(),
            getter: vec![Stmt::Return(ident(SINGLETON_FIELD))],
        }),
    ]
}

fn constants_class(
    base: TracingBase,
    kind: ClassificationKind,
    table: &IndexMap<String, String>,
) -> ClassDecl {
    let ty = base.classification_type(kind);
    ClassDecl {
        attributes: Vec::new(),
        accessibility: Accessibility::Public,
        modifiers: vec![Modifier::Static],
        name: kind.class_name().to_owned(),
        base_type: None,
        members: table
            .iter()
            .map(|(name, expression)| {
                Member::Field(FieldDecl {
                    accessibility: Accessibility::Public,
                    modifiers: vec![Modifier::Const],
                    ty: ty.clone(),
                    name: name.clone(),
                    init: Some(cast(ty.clone(), Expr::Verbatim(expression.clone()))),
                })
            })
            .collect(),
    }
}
