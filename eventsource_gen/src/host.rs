// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Resolution queries the generator asks of its host.

use crate::model::{KnownType, TypeRef};
use serde::Deserialize;
use std::collections::HashMap;

/// The two well-known namespaces that provide an `EventSource` base type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum TracingBase {
    #[serde(rename = "System.Diagnostics.Tracing")]
    System,
    #[serde(rename = "Microsoft.Diagnostics.Tracing")]
    Microsoft,
}

impl TracingBase {
    pub const ALL: [TracingBase; 2] = [TracingBase::System, TracingBase::Microsoft];

    pub fn namespace(self) -> &'static str {
        match self {
            TracingBase::System => "System.Diagnostics.Tracing",
            TracingBase::Microsoft => "Microsoft.Diagnostics.Tracing",
        }
    }

    /// `Event` -> `System.Diagnostics.Tracing.Event`.
    pub fn type_name(self, simple_name: &str) -> String {
        format!("{}.{}", self.namespace(), simple_name)
    }

    pub fn full_name(self) -> String {
        self.type_name("EventSource")
    }

    pub fn from_full_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("global::").unwrap_or(name);
        TracingBase::ALL
            .into_iter()
            .find(|base| name.strip_suffix(".EventSource") == Some(base.namespace()))
    }

    /// True if `attribute_namespace` is this base's namespace.
    pub fn owns(self, attribute_namespace: Option<&str>) -> bool {
        attribute_namespace.map(|ns| ns.strip_prefix("global::").unwrap_or(ns))
            == Some(self.namespace())
    }

    /// The base's predefined enumeration for a classification argument.
    pub fn classification_type(self, kind: ClassificationKind) -> TypeRef {
        TypeRef::enumeration(self.type_name(kind.type_name()))
    }
}

/// The three annotation arguments whose symbolic constants are hoisted into
/// nested classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassificationKind {
    Keywords,
    Opcode,
    Task,
}

impl ClassificationKind {
    pub const ALL: [ClassificationKind; 3] = [
        ClassificationKind::Keywords,
        ClassificationKind::Opcode,
        ClassificationKind::Task,
    ];

    /// The named annotation argument, e.g. `Opcode = ...`.
    pub fn argument_name(self) -> &'static str {
        match self {
            ClassificationKind::Keywords => "Keywords",
            ClassificationKind::Opcode => "Opcode",
            ClassificationKind::Task => "Task",
        }
    }

    /// The base's predefined enumeration, e.g. `EventOpcode`.
    pub fn type_name(self) -> &'static str {
        match self {
            ClassificationKind::Keywords => "EventKeywords",
            ClassificationKind::Opcode => "EventOpcode",
            ClassificationKind::Task => "EventTask",
        }
    }

    /// The nested class that receives hoisted constants, e.g. `Opcodes`.
    pub fn class_name(self) -> &'static str {
        match self {
            ClassificationKind::Keywords => "Keywords",
            ClassificationKind::Opcode => "Opcodes",
            ClassificationKind::Task => "Tasks",
        }
    }

    pub fn from_argument_name(name: &str) -> Option<Self> {
        ClassificationKind::ALL
            .into_iter()
            .find(|kind| kind.argument_name() == name)
    }
}

/// A low-level `WriteEvent` overload declared by a tracing base type.
/// `parameters` includes the leading event id.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WriteOverloadDecl {
    pub parameters: Vec<TypeRef>,
    #[serde(default)]
    pub params_array: bool,
}

impl WriteOverloadDecl {
    pub fn new(parameters: Vec<TypeRef>) -> Self {
        Self {
            parameters,
            params_array: false,
        }
    }

    fn with_params_array(mut self) -> Self {
        self.params_array = true;
        self
    }
}

/// Semantic queries answered by the front end that built the model.
pub trait SemanticHost {
    /// Resolved type of the receiver expression `receiver` in a member access
    /// `receiver.Name` appearing in an annotation of a class deriving from
    /// `base`. `None` if the receiver is not a type or could not be resolved.
    fn receiver_type(&self, base: TracingBase, receiver: &str) -> Option<TypeRef>;

    fn is_classification_type(
        &self,
        base: TracingBase,
        kind: ClassificationKind,
        ty: &TypeRef,
    ) -> bool {
        *ty == base.classification_type(kind)
    }

    fn enum_underlying_type(&self, ty: &TypeRef) -> Option<KnownType>;

    /// Every `WriteEvent` overload `base` declares.
    fn write_overloads(&self, base: TracingBase) -> Vec<WriteOverloadDecl>;
}

/// A table-driven host, deserializable from the CLI's input file.
#[derive(Clone, Debug, Deserialize)]
pub struct HostDescription {
    /// Receiver expression text -> resolved type.
    #[serde(default)]
    pub receivers: HashMap<String, TypeRef>,
    /// Enumeration name -> underlying integral type.
    #[serde(default)]
    pub enums: HashMap<String, KnownType>,
    #[serde(default = "standard_write_overloads")]
    pub write_overloads: Vec<WriteOverloadDecl>,
}

impl Default for HostDescription {
    fn default() -> Self {
        Self {
            receivers: HashMap::new(),
            enums: HashMap::new(),
            write_overloads: standard_write_overloads(),
        }
    }
}

impl HostDescription {
    pub fn with_receiver(mut self, receiver: impl Into<String>, ty: TypeRef) -> Self {
        self.receivers.insert(receiver.into(), ty);
        self
    }

    pub fn with_enum(mut self, name: impl Into<String>, underlying: KnownType) -> Self {
        self.enums.insert(name.into(), underlying);
        self
    }

    pub fn with_write_overloads(mut self, overloads: Vec<WriteOverloadDecl>) -> Self {
        self.write_overloads = overloads;
        self
    }

    /// Underlying types of the tracing namespaces' own enumerations.
    fn builtin_underlying_type(name: &str) -> Option<KnownType> {
        let (namespace, simple) = name.rsplit_once('.')?;
        if !TracingBase::ALL
            .into_iter()
            .any(|base| base.namespace() == namespace)
        {
            return None;
        }

        match simple {
            "EventKeywords" => Some(KnownType::Int64),
            "EventOpcode" | "EventTask" | "EventLevel" => Some(KnownType::Int32),
            "EventChannel" => Some(KnownType::Byte),
            _ => None,
        }
    }
}

impl SemanticHost for HostDescription {
    fn receiver_type(&self, base: TracingBase, receiver: &str) -> Option<TypeRef> {
        if let Some(ty) = self.receivers.get(receiver) {
            return Some(ty.clone());
        }

        let receiver = receiver.strip_prefix("global::").unwrap_or(receiver);
        if let Some(ty) = self.receivers.get(receiver) {
            return Some(ty.clone());
        }

        // The predefined enumerations resolve without help, both simple and
        // fully qualified.
        ClassificationKind::ALL.into_iter().find_map(|kind| {
            let full_name = base.type_name(kind.type_name());
            (receiver == kind.type_name() || receiver == full_name)
                .then(|| TypeRef::enumeration(full_name))
        })
    }

    fn enum_underlying_type(&self, ty: &TypeRef) -> Option<KnownType> {
        let TypeRef::Enum(name) = ty else {
            return None;
        };

        self.enums
            .get(name)
            .copied()
            .or_else(|| Self::builtin_underlying_type(name))
    }

    fn write_overloads(&self, _base: TracingBase) -> Vec<WriteOverloadDecl> {
        self.write_overloads.clone()
    }
}

/// The `WriteEvent` overloads declared by `EventSource` itself.
pub fn standard_write_overloads() -> Vec<WriteOverloadDecl> {
    use KnownType::*;

    const SIGNATURES: &[&[KnownType]] = &[
        &[Int32],
        &[Int32, Int32],
        &[Int32, Int32, Int32],
        &[Int32, Int32, Int32, Int32],
        &[Int32, Int32, String],
        &[Int32, Int64],
        &[Int32, Int64, Int64],
        &[Int32, Int64, Int64, Int64],
        &[Int32, Int64, String],
        &[Int32, String],
        &[Int32, String, Int32],
        &[Int32, String, Int32, Int32],
        &[Int32, String, Int64],
        &[Int32, String, String],
        &[Int32, String, String, String],
    ];

    let byte_array = || TypeRef::array_of(TypeRef::known(Byte));
    let mut overloads: Vec<WriteOverloadDecl> = SIGNATURES
        .iter()
        .map(|types| WriteOverloadDecl::new(types.iter().copied().map(TypeRef::known).collect()))
        .collect();

    overloads.push(WriteOverloadDecl::new(vec![
        TypeRef::known(Int32),
        byte_array(),
    ]));
    overloads.push(WriteOverloadDecl::new(vec![
        TypeRef::known(Int32),
        TypeRef::known(Int64),
        byte_array(),
    ]));
    overloads.push(
        WriteOverloadDecl::new(vec![
            TypeRef::known(Int32),
            TypeRef::array_of(TypeRef::known(Object)),
        ])
        .with_params_array(),
    );

    overloads
}
