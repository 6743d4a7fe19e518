// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

/// Class-level annotation that marks a template class.
pub const TEMPLATE_EVENT_SOURCE_ATTRIBUTE: &str = "TemplateEventSource";

/// Method-level annotation that marks a template event.
pub const TEMPLATE_EVENT_ATTRIBUTE: &str = "TemplateEvent";

/// The base's canonical annotations, qualified with the base namespace.
pub const EVENT_ATTRIBUTE: &str = "Event";
pub const EVENT_SOURCE_ATTRIBUTE: &str = "EventSource";
pub const NON_EVENT_ATTRIBUTE: &str = "NonEvent";

pub const GENERATED_CODE_ATTRIBUTE: &str = "System.CodeDom.Compiler.GeneratedCode";

/// Generation options. Stripped when the class annotation is translated.
pub const OPTION_TARGET_CLASS_NAME: &str = "TargetClassName";
pub const OPTION_SUPPRESS_SINGLETON: &str = "SuppressSingletonGeneration";
pub const OPTION_ALLOW_UNSAFE_CODE: &str = "AllowUnsafeCode";
pub const OPTION_NET45_COMPATIBILITY: &str = "Net45EventSourceCompatibility";

pub const GENERATION_OPTIONS: &[&str] = &[
    OPTION_TARGET_CLASS_NAME,
    OPTION_SUPPRESS_SINGLETON,
    OPTION_ALLOW_UNSAFE_CODE,
    OPTION_NET45_COMPATIBILITY,
];

pub const GUID_ARGUMENT: &str = "Guid";

/// Names a template class must not declare.
pub const RESERVED_MEMBER_NAMES: &[&str] = &["Keywords", "Opcodes", "Tasks"];

/// Suffixes stripped from the template name to form the target name.
pub const TEMPLATE_SUFFIXES: &[&str] = &["Base", "Template"];
pub const TARGET_SUFFIX: &str = "Impl";

pub const WRITE_EVENT: &str = "WriteEvent";
pub const WRITE_EVENT_CORE: &str = "WriteEventCore";
pub const IS_ENABLED: &str = "IsEnabled";
pub const EVENT_DATA: &str = "EventData";
pub const EVENT_DATA_POINTER: &str = "DataPointer";
pub const EVENT_DATA_SIZE: &str = "Size";

pub const EVENT_ID_PARAM: &str = "eventId";
pub const ARG_PARAM: &str = "arg";
pub const DESCRIPTORS_VAR: &str = "descrs";
pub const STRING_PIN_VAR: &str = "str";
pub const BINARY_PIN_VAR: &str = "bin";
pub const LENGTH_VAR: &str = "length";
pub const FILE_TIME_VAR: &str = "fileTime";
pub const ENUM_VALUE_VAR: &str = "enumValue";

pub const SINGLETON_FIELD: &str = "s_instance";
pub const SINGLETON_PROPERTY: &str = "Log";

pub const REGION_SINGLETON: &str = "Singleton Accessor";
pub const REGION_EVENT_METHODS: &str = "Event Methods";
pub const REGION_WRITE_OVERLOADS: &str = "WriteEvent Overloads";

pub const WARNING_BANNER: &[&str] = &[
    "/*****************************************************************/",
    "/* WARNING! THIS CODE IS AUTOMATICALLY GENERATED! DO NOT MODIFY! */",
    "/*****************************************************************/",
];

pub const GENERATOR_NAME: &str = env!("CARGO_PKG_NAME");
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");
