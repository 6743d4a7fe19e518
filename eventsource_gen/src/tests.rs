// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::errors::DiagnosticKind;
use crate::host::{HostDescription, TracingBase};
use crate::model::*;
use crate::settings::{FrameworkVersion, GeneratorSettings};
use crate::strings::GENERATOR_VERSION;
use crate::syntax::{Member, UnitItem};
use crate::writer::{render_class, render_unit};
use crate::{generate_class, generate_unit};

const EVENT_SOURCE: &str = "System.Diagnostics.Tracing.EventSource";
const TEMPLATE_EVENT_SOURCE: &str = "System.Diagnostics.Tracing.TemplateEventSourceAttribute";
const TEMPLATE_EVENT: &str = "System.Diagnostics.Tracing.TemplateEventAttribute";

fn ty(name: &str) -> TypeRef {
    name.parse().unwrap()
}

fn event(id: i64) -> Attribute {
    Attribute::new(TEMPLATE_EVENT).with_argument(AttributeArgument::positional(
        id.to_string(),
        Some(ConstValue::Int(id)),
    ))
}

fn template_source(options: &[(&str, bool)]) -> Attribute {
    options
        .iter()
        .fold(Attribute::new(TEMPLATE_EVENT_SOURCE), |attribute, (name, value)| {
            attribute.with_argument(AttributeArgument::named(
                *name,
                value.to_string(),
                Some(ConstValue::Bool(*value)),
            ))
        })
}

fn class_case(class: &TemplateClass, host: &HostDescription) -> String {
    match generate_class(class, host, &GeneratorSettings::default()) {
        Err(diagnostics) => panic!("generation failed: {diagnostics}"),
        Ok(generated) => {
            let s = render_class(&generated).replace(GENERATOR_VERSION, "VERSION");
            print!("{s}");
            s
        }
    }
}

#[test]
fn simple_template() {
    let class = TemplateClass::new("FooBase", EVENT_SOURCE)
        .in_namespace("Acme")
        .with_attribute(Attribute::new(TEMPLATE_EVENT_SOURCE).with_argument(
            AttributeArgument::named("Name", "\"Acme-Foo\"", Some(ConstValue::Str("Acme-Foo".into()))),
        ))
        .with_method(
            TemplateMethod::new("Save")
                .with_parameter("name", ty("string"))
                .with_attribute(event(1)),
        );

    assert_eq!(
        class_case(&class, &HostDescription::default()),
        indoc! {r#"
            /*****************************************************************/
            /* WARNING! THIS CODE IS AUTOMATICALLY GENERATED! DO NOT MODIFY! */
            /*****************************************************************/
            [System.Diagnostics.Tracing.EventSource(Name = "Acme-Foo")]
            [System.CodeDom.Compiler.GeneratedCode("eventsource_gen", "VERSION")]
            public sealed class Foo : FooBase
            {
                #region Singleton Accessor

                /*****************************************************************/
                /* WARNING! THIS CODE IS AUTOMATICALLY GENERATED! DO NOT MODIFY! */
                /*****************************************************************/
                private static readonly Foo s_instance = new Foo();

                /*****************************************************************/
                /* WARNING! THIS CODE IS AUTOMATICALLY GENERATED! DO NOT MODIFY! */
                /*****************************************************************/
                public static FooBase Log
                {
                    get
                    {
                        return s_instance;
                    }
                }

                #endregion

                #region Event Methods

                /*****************************************************************/
                /* WARNING! THIS CODE IS AUTOMATICALLY GENERATED! DO NOT MODIFY! */
                /*****************************************************************/
                [System.Diagnostics.Tracing.Event(1)]
                public override void Save(string name)
                {
                    if (IsEnabled())
                    {
                        WriteEvent(1, name);
                    }
                }

                #endregion
            }
        "#}
    );
}

#[test]
fn duration_parameter_with_missing_overload() {
    let class = TemplateClass::new("FooBase", EVENT_SOURCE)
        .with_attribute(template_source(&[
            ("SuppressSingletonGeneration", true),
            ("AllowUnsafeCode", true),
        ]))
        .with_method(
            TemplateMethod::new("Elapsed")
                .with_parameter("duration", ty("System.TimeSpan"))
                .with_attribute(event(2)),
        );
    let host = HostDescription::default().with_write_overloads(Vec::new());

    assert_eq!(
        class_case(&class, &host),
        indoc! {r#"
            /*****************************************************************/
            /* WARNING! THIS CODE IS AUTOMATICALLY GENERATED! DO NOT MODIFY! */
            /*****************************************************************/
            [System.Diagnostics.Tracing.EventSource]
            [System.CodeDom.Compiler.GeneratedCode("eventsource_gen", "VERSION")]
            public sealed class Foo : FooBase
            {
                #region Event Methods

                /*****************************************************************/
                /* WARNING! THIS CODE IS AUTOMATICALLY GENERATED! DO NOT MODIFY! */
                /*****************************************************************/
                [System.Diagnostics.Tracing.NonEvent]
                public override void Elapsed(System.TimeSpan duration)
                {
                    if (IsEnabled())
                    {
                        Elapsed(duration.ToString("c"));
                    }
                }

                /*****************************************************************/
                /* WARNING! THIS CODE IS AUTOMATICALLY GENERATED! DO NOT MODIFY! */
                /*****************************************************************/
                [System.Diagnostics.Tracing.Event(2)]
                private void Elapsed(string duration)
                {
                    WriteEvent(2, duration);
                }

                #endregion

                #region WriteEvent Overloads

                /*****************************************************************/
                /* WARNING! THIS CODE IS AUTOMATICALLY GENERATED! DO NOT MODIFY! */
                /*****************************************************************/
                [System.Diagnostics.Tracing.NonEvent]
                private unsafe void WriteEvent(int eventId, string arg0)
                {
                    if (arg0 == null)
                    {
                        arg0 = string.Empty;
                    }
                    EventData* descrs = stackalloc EventData[1];
                    fixed (char* str0 = arg0)
                    {
                        descrs[0].DataPointer = (System.IntPtr)str0;
                        descrs[0].Size = (arg0.Length + 1) * 2;
                        WriteEventCore(eventId, 1, descrs);
                    }
                }

                #endregion
            }
        "#}
    );
}

#[test]
fn overloads_need_unsafe_code() {
    let class = TemplateClass::new("FooBase", EVENT_SOURCE).with_method(
        TemplateMethod::new("Tick")
            .with_parameter("id", ty("System.Guid"))
            .with_attribute(event(5)),
    );

    let generated =
        generate_class(&class, &HostDescription::default(), &GeneratorSettings::default())
            .unwrap();
    assert!(generated.region("WriteEvent Overloads").is_none());

    let class = class.with_attribute(template_source(&[("AllowUnsafeCode", true)]));
    let generated =
        generate_class(&class, &HostDescription::default(), &GeneratorSettings::default())
            .unwrap();
    let region = generated.region("WriteEvent Overloads").unwrap();
    assert_eq!(region.members.len(), 1);
}

#[test]
fn shared_signatures_produce_one_overload() {
    let class = TemplateClass::new("FooBase", EVENT_SOURCE)
        .with_attribute(template_source(&[("AllowUnsafeCode", true)]))
        .with_method(
            TemplateMethod::new("Opened")
                .with_parameter("path", ty("string"))
                .with_parameter("at", ty("System.DateTime"))
                .with_attribute(event(1)),
        )
        .with_method(
            TemplateMethod::new("Closed")
                .with_parameter("path", ty("string"))
                .with_parameter("at", ty("System.DateTime"))
                .with_attribute(event(2)),
        )
        .with_method(
            TemplateMethod::new("Read")
                .with_parameter("data", ty("byte[]"))
                .with_attribute(event(3)),
        );

    let generated =
        generate_class(&class, &HostDescription::default(), &GeneratorSettings::default())
            .unwrap();
    let overloads = generated.region("WriteEvent Overloads").unwrap();
    let signatures: Vec<Vec<TypeRef>> = overloads
        .members
        .iter()
        .filter_map(|member| match member {
            Member::Method(method) => Some(method.parameter_types()),
            _ => None,
        })
        .collect();

    // (int, byte[]) is provided by EventSource.
    assert_eq!(signatures, [vec![ty("int"), ty("string"), ty("System.DateTime")]]);
}

#[test]
fn external_keywords_are_hoisted() {
    let host = HostDescription::default()
        .with_receiver("ExternalFlags", TypeRef::enumeration("Acme.ExternalFlags"))
        .with_receiver("MyTasks", TypeRef::enumeration("Acme.MyTasks"));
    let class = TemplateClass::new("FooBase", EVENT_SOURCE).with_method(
        TemplateMethod::new("Save").with_attribute(
            event(3)
                .with_argument(AttributeArgument::named(
                    "Keywords",
                    "ExternalFlags.Disk | EventKeywords.None",
                    None,
                ))
                .with_argument(AttributeArgument::named("Opcode", "EventOpcode.Start", None))
                .with_argument(AttributeArgument::named("Task", "MyTasks.Save", None)),
        ),
    );

    let text = class_case(&class, &host);
    assert!(text.contains(
        "[System.Diagnostics.Tracing.Event(3, Keywords = Keywords.Disk | EventKeywords.None, Opcode = EventOpcode.Start, Task = Tasks.Save)]"
    ));
    assert!(text.contains(indoc! {"
            public static class Keywords
            {
                public const System.Diagnostics.Tracing.EventKeywords Disk = (System.Diagnostics.Tracing.EventKeywords)ExternalFlags.Disk;
            }"}
    .lines()
    .map(|line| format!("    {line}\n"))
    .collect::<String>()
    .as_str()));

    let generated = generate_class(&class, &host, &GeneratorSettings::default()).unwrap();
    assert!(generated.nested_class("Opcodes").is_none());
    let names: Vec<&str> = generated
        .members
        .iter()
        .filter_map(|member| match member {
            Member::Class(class) => Some(class.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, ["Keywords", "Tasks"]);
}

#[test]
fn predefined_keywords_are_not_hoisted() {
    let class = TemplateClass::new("FooBase", EVENT_SOURCE).with_method(
        TemplateMethod::new("Save").with_attribute(event(3).with_argument(
            AttributeArgument::named("Keywords", "EventKeywords.AuditSuccess", None),
        )),
    );

    let generated =
        generate_class(&class, &HostDescription::default(), &GeneratorSettings::default())
            .unwrap();
    assert!(generated.nested_class("Keywords").is_none());
}

#[test]
fn reserved_opcodes_member() {
    let class = TemplateClass::new("FooBase", EVENT_SOURCE).with_member("Opcodes");
    let err = generate_class(&class, &HostDescription::default(), &GeneratorSettings::default())
        .unwrap_err();
    assert_eq!(err.first_kind(), Some(DiagnosticKind::StructuralViolation));
}

#[test]
fn unsupported_expression_aborts_class() {
    let class = TemplateClass::new("FooBase", EVENT_SOURCE).with_method(
        TemplateMethod::new("Save").with_attribute(event(3).with_argument(
            AttributeArgument::named("Keywords", "Flags.Compute()", None).at(Location::new(8, 31)),
        )),
    );

    let err = generate_class(&class, &HostDescription::default(), &GeneratorSettings::default())
        .unwrap_err();
    assert_eq!(err.first_kind(), Some(DiagnosticKind::UnsupportedExpressionForm));
    assert_eq!(err.0[0].location, Some(Location::new(8, 31)));
}

#[test]
fn extended_types_depend_on_framework() {
    let class = TemplateClass::new("FooBase", "Microsoft.Diagnostics.Tracing.EventSource").with_method(
        TemplateMethod::new("Key")
            .with_parameter("c", ty("char"))
            .with_attribute(
                Attribute::new("Microsoft.Diagnostics.Tracing.EventAttribute").with_argument(
                    AttributeArgument::positional("4", Some(ConstValue::Int(4))),
                ),
            ),
    );
    let host = HostDescription::default();

    let generated = generate_class(&class, &host, &GeneratorSettings::default()).unwrap();
    let methods = generated.methods();
    assert_eq!(methods.len(), 1);
    assert_eq!(
        methods[0].attributes[0].name,
        TracingBase::Microsoft.type_name("Event")
    );

    let settings = GeneratorSettings::new(FrameworkVersion::new(4, 5));
    let err = generate_class(&class, &host, &settings).unwrap_err();
    assert_eq!(err.first_kind(), Some(DiagnosticKind::UnsupportedParameterType));
    assert_eq!(err.0[0].message, "The parameter(s) c (char) are not supported.");
}

#[test]
fn unit_is_grouped_by_namespace() {
    let mut bad = TemplateClass::new("BadBase", EVENT_SOURCE)
        .in_namespace("Acme")
        .with_member("Opcodes");
    bad.location = Some(Location::new(7, 5));

    let unit = CompilationUnit {
        usings: vec!["System".to_owned()],
        classes: vec![
            TemplateClass::new("FooBase", EVENT_SOURCE).in_namespace("Acme"),
            TemplateClass::new("Helper", "System.Object"),
            bad,
            TemplateClass::new("GlobalTemplate", EVENT_SOURCE),
        ],
    };

    let generated = generate_unit(&unit, &HostDescription::default(), &GeneratorSettings::default());
    assert!(generated.has_failures());
    assert_eq!(generated.namespaces.len(), 2);
    assert_eq!(generated.namespaces[0].name, None);
    assert_eq!(generated.namespaces[1].name.as_deref(), Some("Acme"));

    let global: Vec<&str> = generated.namespaces[0]
        .items
        .iter()
        .filter_map(|item| match item {
            UnitItem::Class(class) => Some(class.name.as_str()),
            UnitItem::Failure { .. } => None,
        })
        .collect();
    assert_eq!(global, ["Global"]);

    let acme = &generated.namespaces[1].items;
    assert!(matches!(&acme[0], UnitItem::Class(class) if class.name == "Foo"));
    assert!(matches!(&acme[1], UnitItem::Failure { template_name, .. } if template_name == "BadBase"));

    let text = render_unit(&generated);
    assert!(text.starts_with("using System;\n\n/*"));
    assert!(text.contains("namespace Acme\n{\n"));
    assert!(text.contains(indoc! {"
            // Generation of BadBase failed.
            #line 7
            #error structural violation: The class 'BadBase' is not allowed to contain a member named 'Opcodes'."
    }
    .lines()
    .map(|line| format!("    {line}\n"))
    .collect::<String>()
    .trim_end_matches('\n')));
}

#[test]
fn unit_from_json() {
    let unit: CompilationUnit = serde_json::from_str(
        r#"{
            "usings": ["System"],
            "classes": [{
                "name": "WidgetSource",
                "namespace": "Acme",
                "accessibility": "internal",
                "is_abstract": true,
                "base_chain": [{ "name": "System.Diagnostics.Tracing.EventSource" }],
                "attributes": [{
                    "name": "TemplateEventSourceAttribute",
                    "arguments": [{ "name": "TargetClassName", "expression": "\"Widgets\"", "value": "Widgets" }]
                }],
                "methods": [{
                    "name": "Painted",
                    "return_type": "void",
                    "is_abstract": true,
                    "parameters": [{ "name": "color", "type": "enum Acme.Color" }],
                    "attributes": [{
                        "name": "TemplateEventAttribute",
                        "arguments": [{ "expression": "1", "value": 1 }]
                    }]
                }]
            }]
        }"#,
    )
    .unwrap();
    let host: HostDescription =
        serde_json::from_str(r#"{ "enums": { "Acme.Color": "byte" } }"#).unwrap();

    let generated = generate_unit(&unit, &host, &GeneratorSettings::default());
    assert!(!generated.has_failures());
    let class = generated.classes().next().unwrap();
    assert_eq!(class.name, "Widgets");
    assert_eq!(class.accessibility, Accessibility::Internal);
    assert_eq!(class.methods()[0].parameter_types(), [ty("enum Acme.Color")]);
}
