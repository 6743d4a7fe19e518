// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Parameter type classification and binary layout.

use crate::host::SemanticHost;
use crate::model::{KnownType, TypeRef};

/// Decides which parameter types `WriteEvent` can emit without conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeSupport {
    /// Enables `char`, `IntPtr` and `byte*`.
    pub extended: bool,
}

impl TypeSupport {
    pub const fn new(extended: bool) -> Self {
        Self { extended }
    }

    pub fn is_natively_supported(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Known(known) => match known {
                KnownType::Boolean
                | KnownType::SByte
                | KnownType::Byte
                | KnownType::Int16
                | KnownType::UInt16
                | KnownType::Int32
                | KnownType::UInt32
                | KnownType::Int64
                | KnownType::UInt64
                | KnownType::Decimal
                | KnownType::Single
                | KnownType::Double
                | KnownType::String
                | KnownType::DateTime
                | KnownType::Guid => true,
                KnownType::Char | KnownType::IntPtr => self.extended,
                KnownType::UIntPtr | KnownType::Void | KnownType::Object | KnownType::TimeSpan => {
                    false
                }
            },
            TypeRef::Enum(_) => true,
            TypeRef::Array(_) => ty.is_byte_array(),
            TypeRef::Pointer(_) => self.extended && ty.is_byte_pointer(),
            TypeRef::Named(_) => false,
        }
    }
}

/// Width in bytes of an integral type usable as an enum's underlying type.
pub fn integer_width(ty: KnownType) -> Option<u32> {
    match ty {
        KnownType::SByte | KnownType::Byte => Some(1),
        KnownType::Int16 | KnownType::UInt16 => Some(2),
        KnownType::Int32 | KnownType::UInt32 => Some(4),
        KnownType::Int64 | KnownType::UInt64 => Some(8),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSize {
    Fixed(u32),
    /// Reported by the runtime (`IntPtr.Size`).
    PointerSized,
}

/// How one argument of a synthesized `WriteEvent` overload is described to
/// `WriteEventCore`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataLayout {
    /// Length prefix descriptor plus pinned buffer descriptor.
    ByteArray,
    /// Pinned, NUL-terminated UTF-16 buffer.
    String,
    /// Converted to an 8-byte file time local.
    FileTime,
    /// Cast to the underlying integral type in a local.
    EnumValue { underlying: KnownType, width: u32 },
    /// Described in place.
    Value(DataSize),
}

impl DataLayout {
    pub fn descriptor_count(&self) -> usize {
        match self {
            DataLayout::ByteArray => 2,
            _ => 1,
        }
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self, DataLayout::ByteArray | DataLayout::String)
    }
}

/// `None` if `ty` has no binary representation (unsupported types, or enums
/// whose underlying type the host cannot resolve).
pub fn data_layout(ty: &TypeRef, host: &dyn SemanticHost) -> Option<DataLayout> {
    let layout = match ty {
        TypeRef::Known(known) => match known {
            KnownType::String => DataLayout::String,
            KnownType::DateTime => DataLayout::FileTime,
            KnownType::Boolean | KnownType::SByte | KnownType::Byte => {
                DataLayout::Value(DataSize::Fixed(1))
            }
            KnownType::Char | KnownType::Int16 | KnownType::UInt16 => {
                DataLayout::Value(DataSize::Fixed(2))
            }
            KnownType::Int32 | KnownType::UInt32 | KnownType::Single => {
                DataLayout::Value(DataSize::Fixed(4))
            }
            KnownType::Int64 | KnownType::UInt64 | KnownType::Double => {
                DataLayout::Value(DataSize::Fixed(8))
            }
            KnownType::Decimal | KnownType::Guid => DataLayout::Value(DataSize::Fixed(16)),
            KnownType::IntPtr => DataLayout::Value(DataSize::PointerSized),
            KnownType::UIntPtr | KnownType::Void | KnownType::Object | KnownType::TimeSpan => {
                return None
            }
        },
        TypeRef::Enum(_) => {
            let underlying = host.enum_underlying_type(ty)?;
            DataLayout::EnumValue {
                underlying,
                width: integer_width(underlying)?,
            }
        }
        TypeRef::Array(_) if ty.is_byte_array() => DataLayout::ByteArray,
        TypeRef::Pointer(_) => DataLayout::Value(DataSize::PointerSized),
        TypeRef::Array(_) | TypeRef::Named(_) => return None,
    };

    log::trace!("layout of {ty}: {layout:?}");
    Some(layout)
}

/// Total number of descriptors needed for `layouts`.
pub fn descriptor_count(layouts: &[DataLayout]) -> usize {
    layouts.iter().map(DataLayout::descriptor_count).sum()
}
