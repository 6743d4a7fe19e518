// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! The input model: template classes as resolved by a C# front end.
//!
//! Everything here is plain data. Type identity is structural (`TypeRef`
//! equality), annotation arguments carry both their source text and, where the
//! front end could evaluate it, their constant value.

use core::fmt;
use core::str::FromStr;
use serde::Deserialize;

/// A 1-based line/column position in the template's source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    #[default]
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
    Private,
}

impl Accessibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::PrivateProtected => "private protected",
            Accessibility::Private => "private",
        }
    }
}

/// Types the generator knows by identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum KnownType {
    Void,
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Decimal,
    Single,
    Double,
    String,
    Object,
    IntPtr,
    UIntPtr,
    DateTime,
    TimeSpan,
    Guid,
}

/// (C# spelling, metadata name) for every known type.
const KNOWN_TYPE_NAMES: &[(KnownType, &str, &str)] = &[
    (KnownType::Void, "void", "System.Void"),
    (KnownType::Boolean, "bool", "System.Boolean"),
    (KnownType::Char, "char", "System.Char"),
    (KnownType::SByte, "sbyte", "System.SByte"),
    (KnownType::Byte, "byte", "System.Byte"),
    (KnownType::Int16, "short", "System.Int16"),
    (KnownType::UInt16, "ushort", "System.UInt16"),
    (KnownType::Int32, "int", "System.Int32"),
    (KnownType::UInt32, "uint", "System.UInt32"),
    (KnownType::Int64, "long", "System.Int64"),
    (KnownType::UInt64, "ulong", "System.UInt64"),
    (KnownType::Decimal, "decimal", "System.Decimal"),
    (KnownType::Single, "float", "System.Single"),
    (KnownType::Double, "double", "System.Double"),
    (KnownType::String, "string", "System.String"),
    (KnownType::Object, "object", "System.Object"),
    (KnownType::IntPtr, "System.IntPtr", "System.IntPtr"),
    (KnownType::UIntPtr, "System.UIntPtr", "System.UIntPtr"),
    (KnownType::DateTime, "System.DateTime", "System.DateTime"),
    (KnownType::TimeSpan, "System.TimeSpan", "System.TimeSpan"),
    (KnownType::Guid, "System.Guid", "System.Guid"),
];

impl KnownType {
    /// The spelling used in generated code.
    pub fn keyword(self) -> &'static str {
        KNOWN_TYPE_NAMES
            .iter()
            .find(|(known, _, _)| *known == self)
            .map_or("object", |(_, keyword, _)| keyword)
    }

    /// Accepts a C# keyword, a metadata name (`System.Int32`), or the bare
    /// metadata name (`Int32`).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("global::").unwrap_or(name);
        KNOWN_TYPE_NAMES
            .iter()
            .find(|(_, keyword, metadata)| {
                *keyword == name
                    || *metadata == name
                    || metadata.strip_prefix("System.") == Some(name)
            })
            .map(|(known, _, _)| *known)
    }
}

impl TryFrom<String> for KnownType {
    type Error = ParseTypeError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        KnownType::from_name(name.trim()).ok_or(ParseTypeError(name))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid type name `{0}`")]
pub struct ParseTypeError(pub String);

/// A resolved type. Two `TypeRef`s are the same type iff they are equal.
///
/// The model spelling (see `FromStr`) is the C# spelling, except that
/// enumerations are written `enum Full.Name` because the front end, not the
/// generator, knows which named types are enums.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum TypeRef {
    Known(KnownType),
    Enum(String),
    Array(Box<TypeRef>),
    Pointer(Box<TypeRef>),
    Named(String),
}

impl TypeRef {
    pub const fn known(known: KnownType) -> Self {
        TypeRef::Known(known)
    }

    pub fn array_of(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn pointer_to(pointee: TypeRef) -> Self {
        TypeRef::Pointer(Box::new(pointee))
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        TypeRef::Enum(name.into())
    }

    pub fn is_known(&self, known: KnownType) -> bool {
        matches!(self, TypeRef::Known(k) if *k == known)
    }

    pub fn is_void(&self) -> bool {
        self.is_known(KnownType::Void)
    }

    pub fn is_byte_array(&self) -> bool {
        matches!(self, TypeRef::Array(element) if element.is_known(KnownType::Byte))
    }

    pub fn is_byte_pointer(&self) -> bool {
        matches!(self, TypeRef::Pointer(pointee) if pointee.is_known(KnownType::Byte))
    }
}

impl Default for TypeRef {
    fn default() -> Self {
        TypeRef::Known(KnownType::Void)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Known(known) => f.write_str(known.keyword()),
            TypeRef::Enum(name) | TypeRef::Named(name) => f.write_str(name),
            TypeRef::Array(element) => write!(f, "{element}[]"),
            TypeRef::Pointer(pointee) => write!(f, "{pointee}*"),
        }
    }
}

impl FromStr for TypeRef {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(ParseTypeError(s.to_owned()));
        }

        if let Some(element) = text.strip_suffix("[]") {
            return Ok(TypeRef::array_of(element.parse()?));
        }

        if let Some(pointee) = text.strip_suffix('*') {
            return Ok(TypeRef::pointer_to(pointee.parse()?));
        }

        if text == "enum" {
            return Err(ParseTypeError(s.to_owned()));
        }
        if let Some(name) = text.strip_prefix("enum ") {
            return Ok(TypeRef::Enum(name.trim().to_owned()));
        }

        Ok(match KnownType::from_name(text) {
            Some(known) => TypeRef::Known(known),
            None => TypeRef::Named(text.to_owned()),
        })
    }
}

impl TryFrom<String> for TypeRef {
    type Error = ParseTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The constant value of an annotation argument, when the front end could
/// evaluate it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ConstValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ConstValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ConstValue::Bool(_) => "Boolean",
            ConstValue::Int(_) => "Int64",
            ConstValue::Str(_) => "String",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AttributeArgument {
    /// `None` for positional (constructor) arguments.
    #[serde(default)]
    pub name: Option<String>,
    /// Source text of the argument's value expression.
    pub expression: String,
    #[serde(default)]
    pub value: Option<ConstValue>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl AttributeArgument {
    pub fn positional(expression: impl Into<String>, value: Option<ConstValue>) -> Self {
        Self {
            name: None,
            expression: expression.into(),
            value,
            location: None,
        }
    }

    pub fn named(
        name: impl Into<String>,
        expression: impl Into<String>,
        value: Option<ConstValue>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            expression: expression.into(),
            value,
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_positional(&self) -> bool {
        self.name.is_none()
    }
}

/// An annotation applied to a class or method.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Attribute {
    /// Resolved name of the attribute class, e.g.
    /// `System.Diagnostics.Tracing.TemplateEventAttribute`.
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<AttributeArgument>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            location: None,
        }
    }

    pub fn with_argument(mut self, argument: AttributeArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// `System.Diagnostics.Tracing.EventAttribute` -> `Event`.
    pub fn simple_name(&self) -> &str {
        let name = self.name.rsplit('.').next().unwrap_or(&self.name);
        name.strip_suffix("Attribute").unwrap_or(name)
    }

    /// `System.Diagnostics.Tracing.EventAttribute` -> `System.Diagnostics.Tracing`.
    pub fn namespace(&self) -> Option<&str> {
        let name = self.name.strip_prefix("global::").unwrap_or(&self.name);
        name.rsplit_once('.').map(|(namespace, _)| namespace)
    }

    pub fn positional_arguments(&self) -> impl Iterator<Item = &AttributeArgument> {
        self.arguments.iter().filter(|arg| arg.is_positional())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub location: Option<Location>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            location: None,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TemplateMethod {
    pub name: String,
    #[serde(default)]
    pub accessibility: Accessibility,
    pub return_type: TypeRef,
    pub is_abstract: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub location: Option<Location>,
    /// False when the method was declared in another project whose source the
    /// front end could not locate.
    #[serde(default = "default_true")]
    pub source_available: bool,
}

impl TemplateMethod {
    /// A public, abstract, void method with no parameters or annotations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accessibility: Accessibility::Public,
            return_type: TypeRef::default(),
            is_abstract: true,
            parameters: Vec::new(),
            attributes: Vec::new(),
            location: None,
            source_available: true,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn has_same_signature(&self, other: &TemplateMethod) -> bool {
        self.name == other.name
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.ty == b.ty)
    }
}

/// A non-method member of a template class; only its name matters.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MemberName {
    pub name: String,
    #[serde(default)]
    pub location: Option<Location>,
}

/// One step of a template's base chain. The chain lists the immediate base
/// first and must reach a tracing base type.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BaseClass {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<TemplateMethod>,
}

impl BaseClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: TemplateMethod) -> Self {
        self.methods.push(method);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TemplateClass {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub accessibility: Accessibility,
    pub is_abstract: bool,
    #[serde(default)]
    pub is_generic: bool,
    #[serde(default)]
    pub location: Option<Location>,
    pub base_chain: Vec<BaseClass>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub members: Vec<MemberName>,
    #[serde(default)]
    pub methods: Vec<TemplateMethod>,
}

impl TemplateClass {
    /// A public abstract class deriving directly from `base`.
    pub fn new(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            accessibility: Accessibility::Public,
            is_abstract: true,
            is_generic: false,
            location: None,
            base_chain: vec![BaseClass::new(base)],
            attributes: Vec::new(),
            members: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_method(mut self, method: TemplateMethod) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_member(mut self, name: impl Into<String>) -> Self {
        self.members.push(MemberName {
            name: name.into(),
            location: None,
        });
        self
    }

    /// Inserts an intermediate base class in front of the existing chain.
    pub fn with_ancestor(mut self, ancestor: BaseClass) -> Self {
        self.base_chain.insert(0, ancestor);
        self
    }

    /// Locations of every member declared directly in this class named `name`.
    pub fn declared_member(&self, name: &str) -> Option<Option<Location>> {
        self.members
            .iter()
            .find(|member| member.name == name)
            .map(|member| member.location)
            .or_else(|| {
                self.methods
                    .iter()
                    .find(|method| method.name == name)
                    .map(|method| method.location)
            })
    }
}

/// A source file's worth of template classes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CompilationUnit {
    #[serde(default)]
    pub usings: Vec<String>,
    #[serde(default)]
    pub classes: Vec<TemplateClass>,
}
