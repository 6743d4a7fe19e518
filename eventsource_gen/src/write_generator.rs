// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::errors::{Diagnostic, DiagnosticKind};
use crate::host::{SemanticHost, TracingBase};
use crate::ident_builder::IdentBuilder;
use crate::model::{Accessibility, KnownType, TypeRef};
use crate::overloads::OverloadSignature;
use crate::strings::*;
use crate::syntax::{AttributeSpec, BinaryOp, Expr, MethodDecl, Modifier, ParamDecl, Stmt};
use crate::tree::{
    address_of_as_intptr, assign_descriptor, binary, call, cast, ident, member, null_default,
};
use crate::types::{data_layout, descriptor_count, DataLayout, DataSize};

/// Synthesizes `WriteEvent` overloads that pass their arguments to
/// `WriteEventCore` as an array of (pointer, size) descriptors.
pub struct WriteOverloadGenerator<'a> {
    host: &'a dyn SemanticHost,
    base: TracingBase,
    /// "argN"
    arg_n: IdentBuilder,
    /// "strN"
    str_n: IdentBuilder,
    /// "binN"
    bin_n: IdentBuilder,
    /// "lengthN"
    length_n: IdentBuilder,
    /// "fileTimeN"
    file_time_n: IdentBuilder,
    /// "enumValueN"
    enum_value_n: IdentBuilder,
}

impl<'a> WriteOverloadGenerator<'a> {
    pub fn new(host: &'a dyn SemanticHost, base: TracingBase) -> Self {
        Self {
            host,
            base,
            arg_n: IdentBuilder::new(ARG_PARAM),
            str_n: IdentBuilder::new(STRING_PIN_VAR),
            bin_n: IdentBuilder::new(BINARY_PIN_VAR),
            length_n: IdentBuilder::new(LENGTH_VAR),
            file_time_n: IdentBuilder::new(FILE_TIME_VAR),
            enum_value_n: IdentBuilder::new(ENUM_VALUE_VAR),
        }
    }

    pub fn generate(&mut self, signature: &OverloadSignature) -> Result<MethodDecl, Diagnostic> {
        let layouts = signature
            .types()
            .iter()
            .map(|ty| {
                data_layout(ty, self.host).ok_or_else(|| {
                    Diagnostic::new(
                        DiagnosticKind::BaseResolutionError,
                        None,
                        format!("Cannot compute the binary layout of {ty} for WriteEvent{signature}."),
                    )
                })
            })
            .collect::<Result<Vec<DataLayout>, Diagnostic>>()?;
        let count = descriptor_count(&layouts);
        log::trace!("WriteEvent{signature}: {count} descriptors");

        let mut parameters = Vec::with_capacity(layouts.len() + 1);
        parameters.push(ParamDecl::new(
            TypeRef::known(KnownType::Int32),
            EVENT_ID_PARAM,
        ));

        // Null fixups and derived locals.
        let mut prologue = Vec::new();
        for (i, (ty, layout)) in signature.types().iter().zip(&layouts).enumerate() {
            let arg = self.arg_n.nth(i);
            parameters.push(ParamDecl::new(ty.clone(), arg.as_str()));

            match *layout {
                DataLayout::String => {
                    prologue.push(null_default(&arg, member(ident("string"), "Empty")));
                }
                DataLayout::ByteArray => {
                    prologue.push(null_default(
                        &arg,
                        Expr::NewArray(TypeRef::known(KnownType::Byte), Box::new(Expr::Int(0))),
                    ));
                    prologue.push(Stmt::Local {
                        ty: TypeRef::known(KnownType::Int32),
                        name: self.length_n.nth(i),
                        init: member(ident(&arg), "Length"),
                    });
                }
                DataLayout::FileTime => prologue.push(Stmt::Local {
                    ty: TypeRef::known(KnownType::Int64),
                    name: self.file_time_n.nth(i),
                    init: call(member(ident(&arg), "ToFileTimeUtc"), Vec::new()),
                }),
                DataLayout::EnumValue { underlying, .. } => prologue.push(Stmt::Local {
                    ty: TypeRef::known(underlying),
                    name: self.enum_value_n.nth(i),
                    init: cast(TypeRef::known(underlying), ident(&arg)),
                }),
                DataLayout::Value(_) => {}
            }
        }

        let event_data = TypeRef::named(EVENT_DATA);
        prologue.push(Stmt::Local {
            ty: TypeRef::pointer_to(event_data.clone()),
            name: DESCRIPTORS_VAR.to_owned(),
            init: Expr::StackAlloc(event_data, Box::new(Expr::Int(count as i64))),
        });

        // Descriptor population, then the call.
        let mut populate = Vec::with_capacity(count * 2 + 1);
        let mut index = 0;
        for (i, layout) in layouts.iter().enumerate() {
            let arg = self.arg_n.nth(i);
            match *layout {
                DataLayout::ByteArray => {
                    let length = self.length_n.nth(i);
                    populate.extend(assign_descriptor(
                        index,
                        address_of_as_intptr(ident(&length)),
                        Expr::Int(4),
                    ));
                    populate.extend(assign_descriptor(
                        index + 1,
                        intptr(ident(self.bin_n.set_suffix(i))),
                        ident(&length),
                    ));
                }
                DataLayout::String => {
                    let size = binary(
                        Expr::Paren(Box::new(binary(
                            member(ident(&arg), "Length"),
                            BinaryOp::Add,
                            Expr::Int(1),
                        ))),
                        BinaryOp::Mul,
                        Expr::Int(2),
                    );
                    populate.extend(assign_descriptor(
                        index,
                        intptr(ident(self.str_n.set_suffix(i))),
                        size,
                    ));
                }
                DataLayout::FileTime => populate.extend(assign_descriptor(
                    index,
                    address_of_as_intptr(ident(self.file_time_n.set_suffix(i))),
                    Expr::Int(8),
                )),
                DataLayout::EnumValue { width, .. } => populate.extend(assign_descriptor(
                    index,
                    address_of_as_intptr(ident(self.enum_value_n.set_suffix(i))),
                    Expr::Int(width.into()),
                )),
                DataLayout::Value(size) => populate.extend(assign_descriptor(
                    index,
                    address_of_as_intptr(ident(&arg)),
                    size_expression(size),
                )),
            }
            index += layout.descriptor_count();
        }
        populate.push(Stmt::Expr(call(
            ident(WRITE_EVENT_CORE),
            vec![
                ident(EVENT_ID_PARAM),
                Expr::Int(count as i64),
                ident(DESCRIPTORS_VAR),
            ],
        )));

        // Pin buffers; the first pinned argument is the outermost scope.
        let mut body = populate;
        for (i, layout) in layouts.iter().enumerate().rev() {
            let (pointee, name) = match layout {
                DataLayout::String => (KnownType::Char, self.str_n.nth(i)),
                DataLayout::ByteArray => (KnownType::Byte, self.bin_n.nth(i)),
                _ => continue,
            };
            body = vec![Stmt::Fixed {
                ty: TypeRef::pointer_to(TypeRef::known(pointee)),
                name,
                init: ident(self.arg_n.set_suffix(i)),
                body,
            }];
        }

        prologue.extend(body);

        Ok(MethodDecl {
            attributes: vec![AttributeSpec::new(self.base.type_name(NON_EVENT_ATTRIBUTE))],
            accessibility: Accessibility::Private,
            modifiers: vec![Modifier::Unsafe],
            return_type: TypeRef::default(),
            name: WRITE_EVENT.to_owned(),
            parameters,
            body: prologue,
        })
    }
}

/// `(System.IntPtr)value`
fn intptr(value: Expr) -> Expr {
    cast(TypeRef::known(KnownType::IntPtr), value)
}

fn size_expression(size: DataSize) -> Expr {
    match size {
        DataSize::Fixed(n) => Expr::Int(n.into()),
        DataSize::PointerSized => member(member(ident("System"), "IntPtr"), "Size"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostDescription;
    use crate::tree::descriptor_field;

    fn generate(types: &[&str], host: &HostDescription) -> MethodDecl {
        let signature = OverloadSignature(types.iter().map(|t| t.parse().unwrap()).collect());
        WriteOverloadGenerator::new(host, TracingBase::System)
            .generate(&signature)
            .unwrap()
    }

    fn stackalloc_count(method: &MethodDecl) -> Option<i64> {
        method.body.iter().find_map(|stmt| match stmt {
            Stmt::Local {
                init: Expr::StackAlloc(_, count),
                ..
            } => match **count {
                Expr::Int(n) => Some(n),
                _ => None,
            },
            _ => None,
        })
    }

    fn last_call(mut stmts: &[Stmt]) -> &Stmt {
        loop {
            match stmts.last() {
                Some(Stmt::Fixed { body, .. }) => stmts = body,
                Some(stmt) => return stmt,
                None => panic!("empty body"),
            }
        }
    }

    #[test]
    fn mixed_signature_layout() {
        let host = HostDescription::default();
        let method = generate(&["int", "byte[]", "string"], &host);

        assert_eq!(method.name, "WriteEvent");
        assert_eq!(method.modifiers, [Modifier::Unsafe]);
        assert!(method.has_attribute("NonEvent"));
        assert_eq!(
            method.parameters,
            [
                ParamDecl::new(TypeRef::known(KnownType::Int32), "eventId"),
                ParamDecl::new(TypeRef::known(KnownType::Int32), "arg0"),
                ParamDecl::new("byte[]".parse().unwrap(), "arg1"),
                ParamDecl::new(TypeRef::known(KnownType::String), "arg2"),
            ]
        );
        assert_eq!(stackalloc_count(&method), Some(4));

        // Null byte arrays become empty, and their length is captured.
        assert_eq!(
            method.body[0],
            null_default(
                "arg1",
                Expr::NewArray(TypeRef::known(KnownType::Byte), Box::new(Expr::Int(0)))
            )
        );
        assert_eq!(
            method.body[1],
            Stmt::Local {
                ty: TypeRef::known(KnownType::Int32),
                name: "length1".to_owned(),
                init: member(ident("arg1"), "Length"),
            }
        );
        assert_eq!(
            method.body[2],
            null_default("arg2", member(ident("string"), "Empty"))
        );
        assert_eq!(
            last_call(&method.body),
            &Stmt::Expr(call(
                ident("WriteEventCore"),
                vec![ident("eventId"), Expr::Int(4), ident("descrs")]
            ))
        );

        // byte[] is pinned outside string.
        let Some(Stmt::Fixed { name, body, .. }) = method.body.last() else {
            panic!("expected fixed statement");
        };
        assert_eq!(name, "bin1");
        let [Stmt::Fixed { name, body, .. }] = body.as_slice() else {
            panic!("expected nested fixed statement");
        };
        assert_eq!(name, "str2");

        // arg0, length prefix, buffer, string.
        assert_eq!(
            body[2..4],
            assign_descriptor(1, address_of_as_intptr(ident("length1")), Expr::Int(4))
        );
        assert_eq!(
            body[4..6],
            assign_descriptor(2, intptr(ident("bin1")), ident("length1"))
        );
        assert_eq!(
            body[6],
            Stmt::Assign {
                target: descriptor_field(3, "DataPointer"),
                value: intptr(ident("str2")),
            }
        );
    }

    #[test]
    fn converted_string_overload() {
        let host = HostDescription::default();
        let method = generate(&["string"], &host);

        assert_eq!(stackalloc_count(&method), Some(1));
        assert_eq!(
            method.body[0],
            null_default("arg0", member(ident("string"), "Empty"))
        );
    }

    #[test]
    fn unpinned_values_and_derived_locals() {
        let host = HostDescription::default().with_enum("Acme.Color", KnownType::Byte);
        let method = generate(
            &["System.DateTime", "enum Acme.Color", "System.IntPtr", "decimal"],
            &host,
        );

        assert!(!method
            .body
            .iter()
            .any(|stmt| matches!(stmt, Stmt::Fixed { .. })));
        assert_eq!(
            method.body[0],
            Stmt::Local {
                ty: TypeRef::known(KnownType::Int64),
                name: "fileTime0".to_owned(),
                init: call(member(ident("arg0"), "ToFileTimeUtc"), Vec::new()),
            }
        );
        assert_eq!(
            method.body[1],
            Stmt::Local {
                ty: TypeRef::known(KnownType::Byte),
                name: "enumValue1".to_owned(),
                init: cast(TypeRef::known(KnownType::Byte), ident("arg1")),
            }
        );

        let sizes: Vec<&Expr> = method
            .body
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Assign { target: Expr::Member(_, field), value } if field == "Size" => {
                    Some(value)
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            sizes,
            [
                &Expr::Int(8),
                &Expr::Int(1),
                &member(member(ident("System"), "IntPtr"), "Size"),
                &Expr::Int(16),
            ]
        );
    }

    #[test]
    fn unknown_layout_is_an_error() {
        let host = HostDescription::default();
        let signature = OverloadSignature(vec![TypeRef::enumeration("Acme.Unknown")]);
        let err = WriteOverloadGenerator::new(&host, TracingBase::System)
            .generate(&signature)
            .unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::BaseResolutionError);
    }
}
