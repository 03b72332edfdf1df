// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Resolved, read-only schema graph.
//!
//! Produced once by [`resolve`](crate::resolve); every reference is a
//! [`TypeId`] into the same schema and every type carries its cached
//! [`Layout`].

use super::Primitive;
use crate::layout::Layout;
use crate::wire::Width;
use std::collections::HashMap;
use std::fmt;

/// Index of a type within its [`ResolvedSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a single slot (field, array element, union payload) holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Primitive(Primitive),
    String { prefix: Width, max: u64 },
    Enum(TypeId),
    Struct(TypeId),
    Union(TypeId),
}

impl Element {
    /// Declared type behind the element, if any.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Element::Enum(id) | Element::Struct(id) | Element::Union(id) => Some(*id),
            Element::Primitive(_) | Element::String { .. } => None,
        }
    }
}

/// Cardinality applied to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar(Element),
    Fixed { element: Element, len: u64 },
    Variable { element: Element, prefix: Width, max: u64 },
}

impl Shape {
    pub fn element(&self) -> &Element {
        match self {
            Shape::Scalar(element)
            | Shape::Fixed { element, .. }
            | Shape::Variable { element, .. } => element,
        }
    }

    /// True when the shape embeds its element by value, so the element's
    /// size is needed to size the container.
    pub fn is_by_value(&self) -> bool {
        !matches!(self, Shape::Variable { .. })
    }
}

/// A resolved field default.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i128),
    Float(f64),
    Text(String),
    Enum { member: String, value: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub name: String,
    pub shape: Shape,
    pub default: Option<DefaultValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub width: Width,
    pub members: Vec<EnumValue>,
}

impl EnumType {
    pub fn by_value(&self, value: u64) -> Option<&EnumValue> {
        self.members.iter().find(|m| m.value == value)
    }

    pub fn by_name(&self, name: &str) -> Option<&EnumValue> {
        self.members.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub is_message: bool,
    pub fields: Vec<ResolvedField>,
}

impl StructType {
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionCase {
    pub name: String,
    pub tag: u64,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionType {
    pub tag_width: Width,
    pub members: Vec<UnionCase>,
}

impl UnionType {
    pub fn by_tag(&self, tag: u64) -> Option<&UnionCase> {
        self.members.iter().find(|m| m.tag == tag)
    }

    pub fn by_name(&self, name: &str) -> Option<&UnionCase> {
        self.members.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedKind {
    Alias(Primitive),
    Enum(EnumType),
    Struct(StructType),
    Union(UnionType),
}

impl ResolvedKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResolvedKind::Alias(_) => "alias",
            ResolvedKind::Enum(_) => "enum",
            ResolvedKind::Struct(s) if s.is_message => "message",
            ResolvedKind::Struct(_) => "struct",
            ResolvedKind::Union(_) => "union",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    pub name: String,
    pub kind: ResolvedKind,
    pub layout: Layout,
}

/// Output of resolution: types in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    pub(crate) namespace: Vec<String>,
    pub(crate) types: Vec<ResolvedType>,
    pub(crate) by_name: HashMap<String, TypeId>,
}

impl ResolvedSchema {
    pub fn namespace(&self) -> &[String] {
        &self.namespace
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &ResolvedType)> + '_ {
        self.types.iter().enumerate().map(|(i, t)| (TypeId(i), t))
    }

    /// # Panics
    ///
    /// When `id` comes from a different schema and is out of range.
    pub fn get(&self, id: TypeId) -> &ResolvedType {
        &self.types[id.0]
    }

    pub fn name(&self, id: TypeId) -> &str {
        &self.get(id).name
    }

    pub fn layout(&self, id: TypeId) -> &Layout {
        &self.get(id).layout
    }

    /// Look up a type by plain or namespace-qualified name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        let local = self.strip_namespace(name).unwrap_or(name);
        self.by_name.get(local).copied()
    }

    pub fn qualified_name(&self, id: TypeId) -> String {
        let mut segments: Vec<&str> = self.namespace.iter().map(String::as_str).collect();
        segments.push(self.name(id));
        segments.join("::")
    }

    pub fn enum_type(&self, id: TypeId) -> Option<&EnumType> {
        match &self.get(id).kind {
            ResolvedKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn struct_type(&self, id: TypeId) -> Option<&StructType> {
        match &self.get(id).kind {
            ResolvedKind::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn union_type(&self, id: TypeId) -> Option<&UnionType> {
        match &self.get(id).kind {
            ResolvedKind::Union(u) => Some(u),
            _ => None,
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.iter().filter_map(|(id, t)| match &t.kind {
            ResolvedKind::Struct(s) if s.is_message => Some(id),
            _ => None,
        })
    }

    /// Human-readable element type, as written in a schema.
    pub fn element_name(&self, element: &Element) -> String {
        match element {
            Element::Primitive(p) => p.name().to_owned(),
            Element::String { .. } => "string".to_owned(),
            Element::Enum(id) | Element::Struct(id) | Element::Union(id) => {
                self.name(*id).to_owned()
            }
        }
    }

    fn strip_namespace<'n>(&self, name: &'n str) -> Option<&'n str> {
        if self.namespace.is_empty() {
            return None;
        }
        let mut rest = name;
        for segment in &self.namespace {
            rest = rest.strip_prefix(segment.as_str())?.strip_prefix("::")?;
        }
        Some(rest)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Primitive(p) => write!(f, "{}", p),
            Element::String { prefix, max } => write!(f, "string<{}, max {}>", prefix, max),
            Element::Enum(id) => write!(f, "enum#{}", id.0),
            Element::Struct(id) => write!(f, "struct#{}", id.0),
            Element::Union(id) => write!(f, "union#{}", id.0),
        }
    }
}
