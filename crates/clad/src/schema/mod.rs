// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema Model: the AST accepted as input and the resolved graph built
//! from it.

pub mod ast;
pub mod resolved;

pub use ast::{
    AliasDef, Cardinality, EnumDef, EnumMember, Field, LengthSpec, Literal, Primitive, Schema,
    StructDef, TypeDef, TypeRef, UnionDef, UnionMember,
};
pub use resolved::{
    DefaultValue, Element, EnumType, EnumValue, ResolvedField, ResolvedKind, ResolvedSchema,
    ResolvedType, Shape, StructType, TypeId, UnionCase, UnionType,
};
