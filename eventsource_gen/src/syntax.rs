// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! The output model: typed C# declarations ready for printing.

use crate::errors::Diagnostics;
use crate::model::{Accessibility, TypeRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modifier {
    Static,
    Sealed,
    Readonly,
    Const,
    Override,
    Unsafe,
}

impl Modifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Static => "static",
            Modifier::Sealed => "sealed",
            Modifier::Readonly => "readonly",
            Modifier::Const => "const",
            Modifier::Override => "override",
            Modifier::Unsafe => "unsafe",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeArg {
    pub name: Option<String>,
    /// Argument value as C# source text.
    pub value: String,
}

impl AttributeArg {
    pub fn positional(value: impl Into<String>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Name without the `Attribute` suffix, qualified as needed.
    pub name: String,
    pub arguments: Vec<AttributeArg>,
}

impl AttributeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: AttributeArg) -> Self {
        self.arguments.push(argument);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Mul,
    Eq,
}

impl BinaryOp {
    pub fn token(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Mul => "*",
            BinaryOp::Eq => "==",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Ident(String),
    Int(i64),
    Str(String),
    Null,
    Member(Box<Expr>, String),
    Call(Box<Expr>, Vec<Expr>),
    Cast(TypeRef, Box<Expr>),
    AddressOf(Box<Expr>),
    Index(Box<Expr>, Box<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Paren(Box<Expr>),
    /// `stackalloc T[n]`
    StackAlloc(TypeRef, Box<Expr>),
    /// `new T[n]`
    NewArray(TypeRef, Box<Expr>),
    /// `new T(args)`
    New(TypeRef, Vec<Expr>),
    /// Source text reproduced as written.
    Verbatim(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Expr(Expr),
    If { condition: Expr, then: Vec<Stmt> },
    Assign { target: Expr, value: Expr },
    Local { ty: TypeRef, name: String, init: Expr },
    /// `fixed (T name = init) { body }`
    Fixed {
        ty: TypeRef,
        name: String,
        init: Expr,
        body: Vec<Stmt>,
    },
    Return(Expr),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    pub ty: TypeRef,
    pub name: String,
}

impl ParamDecl {
    pub fn new(ty: TypeRef, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    pub attributes: Vec<AttributeSpec>,
    pub accessibility: Accessibility,
    pub modifiers: Vec<Modifier>,
    pub return_type: TypeRef,
    pub name: String,
    pub parameters: Vec<ParamDecl>,
    pub body: Vec<Stmt>,
}

impl MethodDecl {
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|attribute| {
            attribute.name == name || attribute.name.rsplit('.').next() == Some(name)
        })
    }

    pub fn parameter_types(&self) -> Vec<TypeRef> {
        self.parameters.iter().map(|p| p.ty.clone()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub accessibility: Accessibility,
    pub modifiers: Vec<Modifier>,
    pub ty: TypeRef,
    pub name: String,
    pub init: Option<Expr>,
}

/// A read-only property with a block getter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDecl {
    pub accessibility: Accessibility,
    pub modifiers: Vec<Modifier>,
    pub ty: TypeRef,
    pub name: String,
    pub getter: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    pub members: Vec<Member>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Member {
    Field(FieldDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
    Class(ClassDecl),
    Region(Region),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDecl {
    pub attributes: Vec<AttributeSpec>,
    pub accessibility: Accessibility,
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub base_type: Option<String>,
    pub members: Vec<Member>,
}

impl ClassDecl {
    /// Every method, including those inside regions, in declaration order.
    pub fn methods(&self) -> Vec<&MethodDecl> {
        fn walk<'a>(members: &'a [Member], out: &mut Vec<&'a MethodDecl>) {
            for member in members {
                match member {
                    Member::Method(method) => out.push(method),
                    Member::Region(region) => walk(&region.members, out),
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.members, &mut out);
        out
    }

    /// A directly nested class (regions are not searched).
    pub fn nested_class(&self, name: &str) -> Option<&ClassDecl> {
        self.members.iter().find_map(|member| match member {
            Member::Class(class) if class.name == name => Some(class),
            _ => None,
        })
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.members.iter().find_map(|member| match member {
            Member::Region(region) if region.name == name => Some(region),
            _ => None,
        })
    }
}

/// The result of generating one template class inside a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnitItem {
    Class(ClassDecl),
    Failure {
        template_name: String,
        diagnostics: Diagnostics,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// `None` for the global namespace.
    pub name: Option<String>,
    pub items: Vec<UnitItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub usings: Vec<String>,
    pub namespaces: Vec<NamespaceDecl>,
}

impl GeneratedUnit {
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &Diagnostics)> {
        self.namespaces
            .iter()
            .flat_map(|namespace| namespace.items.iter())
            .filter_map(|item| match item {
                UnitItem::Failure {
                    template_name,
                    diagnostics,
                } => Some((template_name.as_str(), diagnostics)),
                UnitItem::Class(_) => None,
            })
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.namespaces
            .iter()
            .flat_map(|namespace| namespace.items.iter())
            .filter_map(|item| match item {
                UnitItem::Class(class) => Some(class),
                UnitItem::Failure { .. } => None,
            })
    }
}
