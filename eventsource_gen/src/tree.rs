// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Builders for the statement and expression shapes the generators emit.

use crate::model::{KnownType, TypeRef};
use crate::strings::*;
use crate::syntax::{BinaryOp, Expr, Stmt};

pub fn ident(name: &str) -> Expr {
    Expr::Ident(name.to_owned())
}

pub fn member(target: Expr, name: &str) -> Expr {
    Expr::Member(Box::new(target), name.to_owned())
}

pub fn call(target: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call(Box::new(target), args)
}

pub fn cast(ty: TypeRef, value: Expr) -> Expr {
    Expr::Cast(ty, Box::new(value))
}

pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary(Box::new(left), op, Box::new(right))
}

/// `if (IsEnabled()) { body }`
pub fn if_enabled(body: Vec<Stmt>) -> Stmt {
    Stmt::If {
        condition: call(ident(IS_ENABLED), Vec::new()),
        then: body,
    }
}

/// `WriteEvent(event_id, args...);`
pub fn write_event_call(event_id: i32, args: Vec<Expr>) -> Stmt {
    let mut all_args = Vec::with_capacity(args.len() + 1);
    all_args.push(Expr::Int(event_id.into()));
    all_args.extend(args);
    Stmt::Expr(call(ident(WRITE_EVENT), all_args))
}

/// `if (name == null) name = default_value;`
pub fn null_default(name: &str, default_value: Expr) -> Stmt {
    Stmt::If {
        condition: binary(ident(name), BinaryOp::Eq, Expr::Null),
        then: vec![Stmt::Assign {
            target: ident(name),
            value: default_value,
        }],
    }
}

/// `(System.IntPtr)(&value)`
pub fn address_of_as_intptr(value: Expr) -> Expr {
    cast(
        TypeRef::known(KnownType::IntPtr),
        Expr::AddressOf(Box::new(value)),
    )
}

/// `descrs[index].field`
pub fn descriptor_field(index: usize, field: &str) -> Expr {
    member(
        Expr::Index(Box::new(ident(DESCRIPTORS_VAR)), Box::new(Expr::Int(index as i64))),
        field,
    )
}

/// `descrs[index].DataPointer = pointer; descrs[index].Size = size;`
pub fn assign_descriptor(index: usize, pointer: Expr, size: Expr) -> [Stmt; 2] {
    [
        Stmt::Assign {
            target: descriptor_field(index, EVENT_DATA_POINTER),
            value: pointer,
        },
        Stmt::Assign {
            target: descriptor_field(index, EVENT_DATA_SIZE),
            value: size,
        },
    ]
}
