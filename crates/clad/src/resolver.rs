// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type Resolver: binds references, assigns enum values and union tags,
//! picks prefix widths and rejects cyclic or colliding declarations.

use crate::error::ResolutionError;
use crate::layout::compute_layouts;
use crate::schema::{
    AliasDef, Cardinality, DefaultValue, Element, EnumDef, EnumType, EnumValue, Field,
    LengthSpec, Literal, Primitive, ResolvedField, ResolvedKind, ResolvedSchema, ResolvedType,
    Schema, Shape, StructDef, StructType, TypeDef, TypeId, TypeRef, UnionCase, UnionDef,
    UnionMember, UnionType,
};
use crate::wire::Width;
use std::collections::{HashMap, HashSet};

/// Resolve a schema into its read-only graph with cached layouts.
///
/// Rules run in declaration order and the first violation aborts.
pub fn resolve(schema: &Schema) -> Result<ResolvedSchema, ResolutionError> {
    let resolver = Resolver::new(schema)?;
    let kinds = schema
        .types
        .iter()
        .map(|def| resolver.resolve_def(def))
        .collect::<Result<Vec<_>, _>>()?;

    check_cycles(schema, &kinds)?;

    let layouts = compute_layouts(&kinds);
    let types: Vec<ResolvedType> = schema
        .types
        .iter()
        .zip(kinds)
        .zip(layouts)
        .map(|((def, kind), layout)| ResolvedType {
            name: def.name().to_owned(),
            kind,
            layout,
        })
        .collect();

    for ty in &types {
        log::debug!(
            "resolved {} `{}`: min={} max={:?}",
            ty.kind.label(),
            ty.name,
            ty.layout.min,
            ty.layout.max
        );
    }

    Ok(ResolvedSchema {
        namespace: schema.namespace.clone(),
        types,
        by_name: resolver.by_name,
    })
}

struct Resolver<'s> {
    schema: &'s Schema,
    by_name: HashMap<String, TypeId>,
}

impl<'s> Resolver<'s> {
    fn new(schema: &'s Schema) -> Result<Self, ResolutionError> {
        let mut by_name = HashMap::with_capacity(schema.types.len());
        for (index, def) in schema.types.iter().enumerate() {
            if by_name.insert(def.name().to_owned(), TypeId(index)).is_some() {
                return Err(ResolutionError::DuplicateTypeName(def.name().to_owned()));
            }
        }
        Ok(Self { schema, by_name })
    }

    fn resolve_def(&self, def: &TypeDef) -> Result<ResolvedKind, ResolutionError> {
        match def {
            TypeDef::Alias(alias) => self.resolve_alias(alias).map(ResolvedKind::Alias),
            TypeDef::Enum(e) => resolve_enum(e).map(ResolvedKind::Enum),
            TypeDef::Struct(s) => self.resolve_struct(s, false).map(ResolvedKind::Struct),
            TypeDef::Message(s) => self.resolve_struct(s, true).map(ResolvedKind::Struct),
            TypeDef::Union(u) => self.resolve_union(u).map(ResolvedKind::Union),
        }
    }

    /// Follow alias chains down to the final primitive.
    fn resolve_alias(&self, alias: &AliasDef) -> Result<Primitive, ResolutionError> {
        let mut chain = vec![alias.name.as_str()];
        let mut current = alias;
        loop {
            if let Some(p) = Primitive::from_name(&current.target) {
                return Ok(p);
            }
            match self.def_of(&current.target) {
                Some((_, TypeDef::Alias(inner))) => {
                    if chain.contains(&inner.name.as_str()) {
                        chain.push(&inner.name);
                        return Err(ResolutionError::CyclicType {
                            type_name: alias.name.clone(),
                            path: chain.join(" -> "),
                        });
                    }
                    chain.push(&inner.name);
                    current = inner;
                }
                Some(_) => {
                    return Err(ResolutionError::NotAType {
                        referrer: current.name.clone(),
                        name: current.target.clone(),
                    })
                }
                None => {
                    return Err(ResolutionError::UnknownType {
                        referrer: current.name.clone(),
                        name: current.target.clone(),
                    })
                }
            }
        }
    }

    fn resolve_struct(&self, def: &StructDef, is_message: bool) -> Result<StructType, ResolutionError> {
        check_unique(&def.name, def.fields.iter().map(|f| f.name.as_str()))?;
        let fields = def
            .fields
            .iter()
            .map(|field| self.resolve_field(&def.name, field))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StructType { is_message, fields })
    }

    fn resolve_field(&self, owner: &str, field: &Field) -> Result<ResolvedField, ResolutionError> {
        let shape = self.resolve_shape(owner, &field.name, &field.ty, field.cardinality)?;
        let default = match &field.default {
            Some(literal) => Some(self.resolve_default(owner, &field.name, &shape, literal)?),
            None => None,
        };
        Ok(ResolvedField {
            name: field.name.clone(),
            shape,
            default,
        })
    }

    fn resolve_union(&self, def: &UnionDef) -> Result<UnionType, ResolutionError> {
        let members = self.expand_union(def);
        if members.is_empty() {
            return Err(ResolutionError::EmptyUnion(def.name.clone()));
        }
        check_unique(&def.name, members.iter().map(|m| m.name.as_str()))?;

        let mut cases: Vec<UnionCase> = Vec::with_capacity(members.len());
        let mut next_tag = 0u64;
        for member in &members {
            let shape = self.resolve_shape(&def.name, &member.name, &member.ty, member.cardinality)?;
            let tag = member.tag.unwrap_or(next_tag);
            if let Some(previous) = cases.iter().find(|c| c.tag == tag) {
                return Err(ResolutionError::DuplicateUnionTag {
                    type_name: def.name.clone(),
                    member: member.name.clone(),
                    previous: previous.name.clone(),
                    tag,
                });
            }
            if !def.dupes_allowed {
                if let Some(previous) = cases.iter().find(|c| c.shape == shape) {
                    return Err(ResolutionError::DuplicateUnionPayload {
                        type_name: def.name.clone(),
                        member: member.name.clone(),
                        previous: previous.name.clone(),
                    });
                }
            }
            next_tag = tag.saturating_add(1);
            cases.push(UnionCase {
                name: member.name.clone(),
                tag,
                shape,
            });
        }

        let largest = cases.iter().map(|c| c.tag).max().unwrap_or(0);
        let tag_width = Width::smallest_for(largest).ok_or_else(|| ResolutionError::EnumValueOutOfRange {
            type_name: def.name.clone(),
            member: cases
                .iter()
                .find(|c| c.tag == largest)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            value: largest,
            storage: Width::U32.name(),
        })?;
        Ok(UnionType {
            tag_width,
            members: cases,
        })
    }

    /// Explicit members, then every message not already named by one when
    /// the union is automatic.
    fn expand_union(&self, def: &UnionDef) -> Vec<UnionMember> {
        let mut members = def.members.clone();
        if def.auto {
            for other in &self.schema.types {
                let TypeDef::Message(message) = other else {
                    continue;
                };
                let named = members
                    .iter()
                    .any(|m| matches!(&m.ty, TypeRef::Named(n) if self.local_name(n) == message.name));
                if !named {
                    members.push(UnionMember::new(message.name.clone(), TypeRef::named(message.name.clone())));
                }
            }
        }
        members
    }

    fn resolve_shape(
        &self,
        owner: &str,
        member: &str,
        ty: &TypeRef,
        cardinality: Cardinality,
    ) -> Result<Shape, ResolutionError> {
        let element = self.resolve_element(owner, member, ty)?;
        Ok(match cardinality {
            Cardinality::Scalar => Shape::Scalar(element),
            Cardinality::Fixed(len) => Shape::Fixed { element, len },
            Cardinality::Variable(spec) => {
                let (prefix, max) = resolve_prefix(owner, member, spec)?;
                Shape::Variable { element, prefix, max }
            }
        })
    }

    fn resolve_element(&self, owner: &str, member: &str, ty: &TypeRef) -> Result<Element, ResolutionError> {
        match ty {
            TypeRef::Primitive(p) => Ok(Element::Primitive(*p)),
            TypeRef::String(spec) => {
                let (prefix, max) = resolve_prefix(owner, member, *spec)?;
                Ok(Element::String { prefix, max })
            }
            TypeRef::Named(name) => {
                let (id, def) = self.def_of(name).ok_or_else(|| ResolutionError::UnknownType {
                    referrer: owner.to_owned(),
                    name: name.clone(),
                })?;
                Ok(match def {
                    TypeDef::Alias(alias) => Element::Primitive(self.resolve_alias(alias)?),
                    TypeDef::Enum(_) => Element::Enum(id),
                    TypeDef::Struct(_) | TypeDef::Message(_) => Element::Struct(id),
                    TypeDef::Union(_) => Element::Union(id),
                })
            }
        }
    }

    fn resolve_default(
        &self,
        owner: &str,
        member: &str,
        shape: &Shape,
        literal: &Literal,
    ) -> Result<DefaultValue, ResolutionError> {
        let invalid = |reason: String| ResolutionError::InvalidDefault {
            type_name: owner.to_owned(),
            member: member.to_owned(),
            reason,
        };
        let Shape::Scalar(element) = shape else {
            return Err(invalid("defaults apply to scalar fields only".to_owned()));
        };
        let int_default = |p: Primitive, value: i128| match p.int_range() {
            Some((lo, hi)) if (lo..=hi).contains(&value) => Ok(DefaultValue::Int(value)),
            _ => Err(invalid(format!("{} does not fit {}", value, p))),
        };
        let float_default = |p: Primitive, value: f64| {
            if p == Primitive::F32 && value.is_finite() && value.abs() > f64::from(f32::MAX) {
                Err(invalid(format!("{} does not fit {}", value, p)))
            } else {
                Ok(DefaultValue::Float(value))
            }
        };
        match (element, literal) {
            (Element::Primitive(Primitive::Bool), Literal::Bool(v)) => Ok(DefaultValue::Bool(*v)),
            (Element::Primitive(Primitive::Bool), Literal::Int(v @ (0 | 1))) => Ok(DefaultValue::Bool(*v == 1)),
            (Element::Primitive(p), Literal::Int(v)) if !p.is_float() => int_default(*p, i128::from(*v)),
            (Element::Primitive(p), Literal::UInt(v)) if !p.is_float() => int_default(*p, i128::from(*v)),
            (Element::Primitive(p), Literal::Float(v)) if p.is_float() => float_default(*p, *v),
            (Element::Primitive(p), Literal::Int(v)) if p.is_float() => float_default(*p, *v as f64),
            (Element::Primitive(p), Literal::UInt(v)) if p.is_float() => float_default(*p, *v as f64),
            (Element::String { max, .. }, Literal::Text(text)) => {
                if text.len() as u64 > *max {
                    Err(invalid(format!("{} bytes exceed the maximum length {}", text.len(), max)))
                } else {
                    Ok(DefaultValue::Text(text.clone()))
                }
            }
            (Element::Enum(id), Literal::Text(name)) => match &self.schema.types[id.0] {
                TypeDef::Enum(def) => resolve_enum(def)?
                    .by_name(name)
                    .map(|m| DefaultValue::Enum {
                        member: m.name.clone(),
                        value: m.value,
                    })
                    .ok_or_else(|| invalid(format!("`{}` is not a member of `{}`", name, def.name))),
                other => Err(invalid(format!("`{}` is not an enum", other.name()))),
            },
            (_, literal) => Err(invalid(format!("{} is not a valid value for this field", literal))),
        }
    }

    fn def_of(&self, name: &str) -> Option<(TypeId, &'s TypeDef)> {
        let id = *self.by_name.get(self.local_name(name))?;
        Some((id, &self.schema.types[id.0]))
    }

    /// Strip the schema namespace from a qualified reference.
    fn local_name<'n>(&self, name: &'n str) -> &'n str {
        let mut rest = name;
        for segment in &self.schema.namespace {
            match rest.strip_prefix(segment.as_str()).and_then(|r| r.strip_prefix("::")) {
                Some(r) => rest = r,
                None => return name,
            }
        }
        rest
    }
}

fn resolve_enum(def: &EnumDef) -> Result<EnumType, ResolutionError> {
    check_unique(&def.name, def.members.iter().map(|m| m.name.as_str()))?;
    let ceiling = def.storage.unwrap_or(Width::U32);

    let mut members: Vec<EnumValue> = Vec::with_capacity(def.members.len());
    let mut next = 0u64;
    for member in &def.members {
        let value = member.value.unwrap_or(next);
        if value > ceiling.max_value() {
            return Err(ResolutionError::EnumValueOutOfRange {
                type_name: def.name.clone(),
                member: member.name.clone(),
                value,
                storage: ceiling.name(),
            });
        }
        if let Some(previous) = members.iter().find(|m| m.value == value) {
            return Err(ResolutionError::DuplicateEnumValue {
                type_name: def.name.clone(),
                member: member.name.clone(),
                previous: previous.name.clone(),
                value,
            });
        }
        next = value + 1;
        members.push(EnumValue {
            name: member.name.clone(),
            value,
        });
    }

    let largest = members.iter().map(|m| m.value).max().unwrap_or(0);
    let width = match def.storage {
        Some(pinned) => pinned,
        // Bounded by the U32 ceiling above.
        None => Width::smallest_for(largest).unwrap_or(Width::U32),
    };
    Ok(EnumType { width, members })
}

/// Prefix width and effective maximum for a variable array or string.
fn resolve_prefix(owner: &str, member: &str, spec: LengthSpec) -> Result<(Width, u64), ResolutionError> {
    let overflow = |max: u64, prefix: Width| ResolutionError::LengthPrefixOverflow {
        type_name: owner.to_owned(),
        member: member.to_owned(),
        max,
        prefix: prefix.name(),
    };
    match (spec.max, spec.prefix) {
        (None, None) => Ok((Width::U8, Width::U8.max_value())),
        (None, Some(prefix)) => Ok((prefix, prefix.max_value())),
        (Some(max), Some(prefix)) if max <= prefix.max_value() => Ok((prefix, max)),
        (Some(max), Some(prefix)) => Err(overflow(max, prefix)),
        (Some(max), None) => Width::smallest_for(max)
            .map(|prefix| (prefix, max))
            .ok_or_else(|| overflow(max, Width::U32)),
    }
}

fn check_unique<'a>(owner: &str, names: impl Iterator<Item = &'a str>) -> Result<(), ResolutionError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ResolutionError::DuplicateMemberName {
                type_name: owner.to_owned(),
                member: name.to_owned(),
            });
        }
    }
    Ok(())
}

/// Reject structs and unions that contain themselves by value.
fn check_cycles(schema: &Schema, kinds: &[ResolvedKind]) -> Result<(), ResolutionError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    fn by_value_children(kind: &ResolvedKind) -> Vec<TypeId> {
        let shapes: Vec<&Shape> = match kind {
            ResolvedKind::Struct(s) => s.fields.iter().map(|f| &f.shape).collect(),
            ResolvedKind::Union(u) => u.members.iter().map(|m| &m.shape).collect(),
            ResolvedKind::Alias(_) | ResolvedKind::Enum(_) => Vec::new(),
        };
        shapes
            .into_iter()
            .filter(|shape| shape.is_by_value())
            .filter_map(|shape| match shape.element() {
                Element::Struct(id) | Element::Union(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn visit(
        id: TypeId,
        kinds: &[ResolvedKind],
        marks: &mut [Mark],
        stack: &mut Vec<TypeId>,
    ) -> Option<Vec<TypeId>> {
        marks[id.0] = Mark::OnStack;
        stack.push(id);
        for child in by_value_children(&kinds[id.0]) {
            match marks[child.0] {
                Mark::OnStack => {
                    let start = stack.iter().position(|t| *t == child).unwrap_or(0);
                    let mut path = stack[start..].to_vec();
                    path.push(child);
                    return Some(path);
                }
                Mark::Unvisited => {
                    if let Some(path) = visit(child, kinds, marks, stack) {
                        return Some(path);
                    }
                }
                Mark::Done => {}
            }
        }
        stack.pop();
        marks[id.0] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::Unvisited; kinds.len()];
    for index in 0..kinds.len() {
        if marks[index] != Mark::Unvisited {
            continue;
        }
        let mut stack = Vec::new();
        if let Some(path) = visit(TypeId(index), kinds, &mut marks, &mut stack) {
            let names: Vec<&str> = path.iter().map(|id| schema.types[id.0].name()).collect();
            return Err(ResolutionError::CyclicType {
                type_name: names[0].to_owned(),
                path: names.join(" -> "),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enum_def(members: &[(&str, Option<u64>)]) -> EnumDef {
        members
            .iter()
            .fold(EnumDef::new("Mode"), |def, (name, value)| def.member(*name, *value))
    }

    fn resolve_types(types: Vec<TypeDef>) -> Result<ResolvedSchema, ResolutionError> {
        let mut schema = Schema::new(["Anki", "Test"]);
        schema.types = types;
        resolve(&schema)
    }

    #[test]
    fn test_enum_value_assignment() {
        let resolved = resolve_enum(&enum_def(&[
            ("e1", None),
            ("e2", None),
            ("e3", Some(0x10)),
            ("e4", Some(1280)),
            ("e5", None),
            ("e6", Some(1000)),
            ("e7", None),
        ]))
        .expect("resolve enum");
        let values: Vec<u64> = resolved.members.iter().map(|m| m.value).collect();
        assert_eq!(values, [0, 1, 16, 1280, 1281, 1000, 1001]);
        assert_eq!(resolved.width, Width::U16);
    }

    #[test]
    fn test_enum_width() {
        assert_eq!(resolve_enum(&EnumDef::new("Empty")).expect("empty").width, Width::U8);
        assert_eq!(
            resolve_enum(&enum_def(&[("a", Some(255))])).expect("u8").width,
            Width::U8
        );
        assert_eq!(
            resolve_enum(&enum_def(&[("a", Some(65_536))])).expect("u32").width,
            Width::U32
        );
        let pinned = resolve_enum(&enum_def(&[("a", None)]).storage(Width::U32)).expect("pinned");
        assert_eq!(pinned.width, Width::U32);
    }

    #[test]
    fn test_enum_errors() {
        let err = resolve_enum(&enum_def(&[("a", Some(4)), ("b", Some(3)), ("c", None)]))
            .expect_err("c resolves to 4");
        assert_eq!(
            err,
            ResolutionError::DuplicateEnumValue {
                type_name: "Mode".into(),
                member: "c".into(),
                previous: "a".into(),
                value: 4,
            }
        );

        let err = resolve_enum(&enum_def(&[("a", Some(256))]).storage(Width::U8)).expect_err("pinned too small");
        assert!(matches!(err, ResolutionError::EnumValueOutOfRange { value: 256, storage: "u8", .. }));

        let err = resolve_enum(&enum_def(&[("a", Some(1u64 << 32))])).expect_err("beyond u32");
        assert!(matches!(err, ResolutionError::EnumValueOutOfRange { storage: "u32", .. }));

        let err = resolve_enum(&enum_def(&[("a", None), ("a", None)])).expect_err("duplicate name");
        assert!(matches!(err, ResolutionError::DuplicateMemberName { .. }));
    }

    #[test]
    fn test_prefix_resolution() {
        let spec = |max, prefix| LengthSpec { max, prefix };
        assert_eq!(resolve_prefix("T", "f", spec(None, None)), Ok((Width::U8, 255)));
        assert_eq!(resolve_prefix("T", "f", spec(Some(10), None)), Ok((Width::U8, 10)));
        assert_eq!(resolve_prefix("T", "f", spec(Some(300), None)), Ok((Width::U16, 300)));
        assert_eq!(
            resolve_prefix("T", "f", spec(None, Some(Width::U16))),
            Ok((Width::U16, 65_535))
        );
        assert_eq!(
            resolve_prefix("T", "f", spec(Some(3), Some(Width::U32))),
            Ok((Width::U32, 3))
        );
        assert!(matches!(
            resolve_prefix("T", "f", spec(Some(300), Some(Width::U8))),
            Err(ResolutionError::LengthPrefixOverflow { max: 300, prefix: "u8", .. })
        ));
        assert!(matches!(
            resolve_prefix("T", "f", spec(Some(1 << 40), None)),
            Err(ResolutionError::LengthPrefixOverflow { .. })
        ));
    }

    #[test]
    fn test_unknown_type() {
        let err = resolve_types(vec![TypeDef::Struct(
            StructDef::new("Holder").field(Field::new("inner", TypeRef::named("Missing"))),
        )])
        .expect_err("unknown reference");
        assert_eq!(
            err,
            ResolutionError::UnknownType {
                referrer: "Holder".into(),
                name: "Missing".into(),
            }
        );
    }

    #[test]
    fn test_qualified_and_forward_references() {
        let resolved = resolve_types(vec![
            TypeDef::Struct(StructDef::new("Outer").field(Field::new("inner", TypeRef::named("Anki::Test::Inner")))),
            TypeDef::Struct(StructDef::new("Inner").field(Field::new("x", Primitive::U8))),
        ])
        .expect("resolve");
        let outer = resolved.struct_type(resolved.lookup("Outer").expect("Outer")).expect("struct");
        let inner = resolved.lookup("Anki::Test::Inner").expect("qualified lookup");
        assert_eq!(outer.fields[0].shape, Shape::Scalar(Element::Struct(inner)));
        assert_eq!(resolved.qualified_name(inner), "Anki::Test::Inner");
    }

    #[test]
    fn test_cycle_by_value_rejected() {
        let err = resolve_types(vec![
            TypeDef::Struct(StructDef::new("A").field(Field::new("b", TypeRef::named("B")))),
            TypeDef::Struct(StructDef::new("B").field(Field::new("a", TypeRef::named("A")).fixed(2))),
        ])
        .expect_err("A and B contain each other");
        assert_eq!(
            err,
            ResolutionError::CyclicType {
                type_name: "A".into(),
                path: "A -> B -> A".into(),
            }
        );
    }

    #[test]
    fn test_cycle_through_union_rejected() {
        let err = resolve_types(vec![TypeDef::Union(
            UnionDef::new("Expr")
                .member(UnionMember::new("leaf", Primitive::I32))
                .member(UnionMember::new("nested", TypeRef::named("Expr"))),
        )])
        .expect_err("self by value");
        assert!(matches!(err, ResolutionError::CyclicType { .. }));
    }

    #[test]
    fn test_cycle_through_variable_array_allowed() {
        let resolved = resolve_types(vec![TypeDef::Struct(
            StructDef::new("Tree").field(Field::new("children", TypeRef::named("Tree")).variable(LengthSpec::max(8))),
        )])
        .expect("indirection is fine");
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_union_tags_and_width() {
        let resolved = resolve_types(vec![TypeDef::Union(
            UnionDef::new("Event")
                .member(UnionMember::new("a", Primitive::U8))
                .member(UnionMember::new("b", Primitive::U16).with_tag(300))
                .member(UnionMember::new("c", Primitive::U32)),
        )])
        .expect("resolve");
        let union = resolved.union_type(resolved.lookup("Event").expect("Event")).expect("union");
        let tags: Vec<u64> = union.members.iter().map(|m| m.tag).collect();
        assert_eq!(tags, [0, 300, 301]);
        assert_eq!(union.tag_width, Width::U16);
    }

    #[test]
    fn test_union_errors() {
        let err = resolve_types(vec![TypeDef::Union(UnionDef::new("Nothing"))]).expect_err("empty");
        assert_eq!(err, ResolutionError::EmptyUnion("Nothing".into()));

        let err = resolve_types(vec![TypeDef::Union(
            UnionDef::new("Twice")
                .member(UnionMember::new("a", Primitive::U8))
                .member(UnionMember::new("b", Primitive::U8)),
        )])
        .expect_err("duplicate payload");
        assert!(matches!(err, ResolutionError::DuplicateUnionPayload { .. }));

        let mut dupes = UnionDef::new("Twice")
            .member(UnionMember::new("a", Primitive::U8))
            .member(UnionMember::new("b", Primitive::U8));
        dupes.dupes_allowed = true;
        assert!(resolve_types(vec![TypeDef::Union(dupes)]).is_ok());

        let err = resolve_types(vec![TypeDef::Union(
            UnionDef::new("Clash")
                .member(UnionMember::new("a", Primitive::U8).with_tag(1))
                .member(UnionMember::new("b", Primitive::U16).with_tag(1)),
        )])
        .expect_err("duplicate tag");
        assert!(matches!(err, ResolutionError::DuplicateUnionTag { tag: 1, .. }));
    }

    #[test]
    fn test_autounion_collects_messages() {
        let mut auto = UnionDef::new("Any").member(UnionMember::new("ping", TypeRef::named("Ping")));
        auto.auto = true;
        let resolved = resolve_types(vec![
            TypeDef::Message(StructDef::new("Ping").field(Field::new("seq", Primitive::U32))),
            TypeDef::Struct(StructDef::new("Helper")),
            TypeDef::Message(StructDef::new("Pong").field(Field::new("seq", Primitive::U16))),
            TypeDef::Union(auto),
        ])
        .expect("resolve");
        let union = resolved.union_type(resolved.lookup("Any").expect("Any")).expect("union");
        let names: Vec<&str> = union.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["ping", "Pong"]);
        assert_eq!(resolved.messages().count(), 2);
    }

    #[test]
    fn test_duplicate_type_name() {
        let err = resolve_types(vec![
            TypeDef::Struct(StructDef::new("Same")),
            TypeDef::Enum(EnumDef::new("Same")),
        ])
        .expect_err("duplicate");
        assert_eq!(err, ResolutionError::DuplicateTypeName("Same".into()));
    }

    #[test]
    fn test_alias_resolution() {
        let resolved = resolve_types(vec![
            TypeDef::Alias(AliasDef {
                name: "Meters".into(),
                target: "f32".into(),
            }),
            TypeDef::Alias(AliasDef {
                name: "Distance".into(),
                target: "Meters".into(),
            }),
            TypeDef::Struct(StructDef::new("Leg").field(Field::new("length", TypeRef::named("Distance")))),
        ])
        .expect("resolve");
        let leg = resolved.struct_type(resolved.lookup("Leg").expect("Leg")).expect("struct");
        assert_eq!(leg.fields[0].shape, Shape::Scalar(Element::Primitive(Primitive::F32)));

        let err = resolve_types(vec![
            TypeDef::Struct(StructDef::new("Thing")),
            TypeDef::Alias(AliasDef {
                name: "Bad".into(),
                target: "Thing".into(),
            }),
        ])
        .expect_err("alias of struct");
        assert!(matches!(err, ResolutionError::NotAType { .. }));
    }

    #[test]
    fn test_defaults() {
        let resolved = resolve_types(vec![
            TypeDef::Enum(EnumDef::new("Mode").member("idle", None).member("busy", Some(7))),
            TypeDef::Struct(
                StructDef::new("Settings")
                    .field(Field::new("on", Primitive::Bool).with_default(Literal::Bool(true)))
                    .field(Field::new("level", Primitive::I8).with_default(Literal::Int(-5)))
                    .field(Field::new("gain", Primitive::F32).with_default(Literal::Int(2)))
                    .field(Field::new("mode", TypeRef::named("Mode")).with_default(Literal::Text("busy".into())))
                    .field(Field::new("name", TypeRef::String(LengthSpec::max(8))).with_default(Literal::Text("probe".into()))),
            ),
        ])
        .expect("resolve");
        let settings = resolved.struct_type(resolved.lookup("Settings").expect("Settings")).expect("struct");
        let defaults: Vec<_> = settings.fields.iter().map(|f| f.default.clone()).collect();
        assert_eq!(
            defaults,
            [
                Some(DefaultValue::Bool(true)),
                Some(DefaultValue::Int(-5)),
                Some(DefaultValue::Float(2.0)),
                Some(DefaultValue::Enum {
                    member: "busy".into(),
                    value: 7
                }),
                Some(DefaultValue::Text("probe".into())),
            ]
        );
    }

    #[test]
    fn test_invalid_defaults() {
        for field in [
            Field::new("small", Primitive::U8).with_default(Literal::Int(256)),
            Field::new("unsigned", Primitive::U16).with_default(Literal::Int(-1)),
            Field::new("flag", Primitive::Bool).with_default(Literal::Text("yes".into())),
            Field::new("name", TypeRef::String(LengthSpec::max(2))).with_default(Literal::Text("long".into())),
            Field::new("mode", TypeRef::named("Mode")).with_default(Literal::Text("unknown".into())),
            Field::new("grid", Primitive::U8).fixed(2).with_default(Literal::Int(0)),
            Field::new("huge", Primitive::F32).with_default(Literal::Float(1.0e300)),
            Field::new("tiny", Primitive::F32).with_default(Literal::Float(-1.0e39)),
            Field::new("unit", Primitive::U8).with_default(Literal::Text("Mode".into())),
        ] {
            let err = resolve_types(vec![
                TypeDef::Enum(EnumDef::new("Mode").member("idle", None)),
                TypeDef::Struct(StructDef::new("Settings").field(field.clone())),
            ])
            .expect_err("invalid default");
            assert!(
                matches!(&err, ResolutionError::InvalidDefault { member, .. } if *member == field.name),
                "unexpected error for {}: {:?}",
                field.name,
                err
            );
        }
    }

    #[test]
    fn test_float_defaults_in_range() {
        let resolved = resolve_types(vec![TypeDef::Struct(
            StructDef::new("Limits")
                .field(Field::new("top", Primitive::F32).with_default(Literal::Float(f64::from(f32::MAX))))
                .field(Field::new("hot", Primitive::F32).with_default(Literal::Float(f64::INFINITY)))
                .field(Field::new("wide", Primitive::F64).with_default(Literal::Float(1.0e300)))
                .field(Field::new("count", Primitive::F32).with_default(Literal::UInt(u64::MAX))),
        )])
        .expect("resolve");
        let limits = resolved.struct_type(TypeId(0)).expect("struct");
        assert_eq!(limits.fields[0].default, Some(DefaultValue::Float(f64::from(f32::MAX))));
        assert_eq!(limits.fields[1].default, Some(DefaultValue::Float(f64::INFINITY)));
        assert_eq!(limits.fields[2].default, Some(DefaultValue::Float(1.0e300)));
    }
}
