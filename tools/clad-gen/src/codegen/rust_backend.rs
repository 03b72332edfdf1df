// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rust source backend.
//!
//! Every generated type implements the runtime's `Packable` trait. Sizes
//! that the layout engine proved constant are emitted as literals; the rest
//! are computed from the value.

use super::naming::{Naming, Scope};
use super::type_hash::schema_fingerprint;
use super::{Backend, EmitError};
use clad::layout::{element_bounds, shape_bounds};
use clad::schema::{
    DefaultValue, Element, EnumType, Primitive, ResolvedField, ResolvedKind, Shape, StructType,
    TypeId, UnionType,
};
use clad::{ResolvedSchema, Width};

const OK: &str = "::core::result::Result::Ok";
const VEC: &str = "::std::vec::Vec";
const STRING: &str = "::std::string::String";
const OPTION: &str = "::core::option::Option";

/// Emits one Rust module per schema.
#[derive(Debug, Clone)]
pub struct RustBackend {
    runtime_path: String,
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            runtime_path: "::clad".to_owned(),
        }
    }

    /// Path under which generated code finds the wire runtime.
    #[must_use]
    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    pub fn runtime_path(&self) -> &str {
        &self.runtime_path
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for RustBackend {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn file_extension(&self) -> &'static str {
        "rs"
    }

    fn emit(&self, schema: &ResolvedSchema) -> Result<String, EmitError> {
        let naming = Naming::new()?;
        if !naming.is_path(&self.runtime_path) {
            return Err(EmitError::RuntimePath(self.runtime_path.clone()));
        }
        let types = type_idents(&naming, schema)?;
        let mut gen = Generator {
            schema,
            naming,
            rt: &self.runtime_path,
            types,
            code: Code::default(),
        };
        gen.header();
        for (id, ty) in schema.iter() {
            tracing::debug!("emitting {} `{}`", ty.kind.label(), ty.name);
            match &ty.kind {
                ResolvedKind::Alias(p) => gen.alias(id, *p),
                ResolvedKind::Enum(e) => gen.enumeration(id, e)?,
                ResolvedKind::Struct(s) => gen.structure(id, s)?,
                ResolvedKind::Union(u) => gen.union(id, u)?,
            }
        }
        Ok(gen.code.buf)
    }
}

/// Item names, indexed by type id. Claims every item the file declares.
fn type_idents(naming: &Naming, schema: &ResolvedSchema) -> Result<Vec<String>, EmitError> {
    let module = schema.namespace().join("::");
    let mut items = Scope::new(if module.is_empty() { "<schema>".to_owned() } else { module });
    items.claim("SCHEMA_FINGERPRINT", "SCHEMA_FINGERPRINT")?;
    items.claim("SCHEMA_NAMESPACE", "SCHEMA_NAMESPACE")?;
    let mut idents = Vec::with_capacity(schema.len());
    for (_, ty) in schema.iter() {
        let ident = naming.type_ident(&ty.name)?;
        items.claim(&ty.name, &ident)?;
        if let ResolvedKind::Union(_) = ty.kind {
            items.claim(&ty.name, &format!("{ident}Tag"))?;
        }
        idents.push(ident);
    }
    Ok(idents)
}

#[derive(Default)]
struct Code {
    buf: String,
}

impl Code {
    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        for _ in 0..depth {
            self.buf.push_str("    ");
        }
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }
}

/// How generated code reaches a slot value.
#[derive(Clone, Copy)]
enum Slot<'a> {
    /// A place such as `self.label`.
    Place(&'a str),
    /// A reference binding such as `v`.
    Ref(&'a str),
}

impl Slot<'_> {
    fn by_ref(self) -> String {
        match self {
            Slot::Place(p) => format!("&{p}"),
            Slot::Ref(r) => r.to_owned(),
        }
    }

    fn by_value(self) -> String {
        match self {
            Slot::Place(p) => p.to_owned(),
            Slot::Ref(r) => format!("*{r}"),
        }
    }

    /// Receiver for method calls, which auto-reference either way.
    fn recv(self) -> String {
        match self {
            Slot::Place(s) | Slot::Ref(s) => s.to_owned(),
        }
    }
}

struct Generator<'s> {
    schema: &'s ResolvedSchema,
    naming: Naming,
    rt: &'s str,
    types: Vec<String>,
    code: Code,
}

impl Generator<'_> {
    fn header(&mut self) {
        let namespace = self.schema.namespace().join("::");
        let fingerprint = schema_fingerprint(self.schema);
        self.code.line(0, format!("// Generated by clad-gen {}. Do not edit.", env!("CARGO_PKG_VERSION")));
        if namespace.is_empty() {
            self.code.line(0, format!("// Schema: {} types.", self.schema.len()));
        } else {
            self.code.line(0, format!("// Schema: `{}`, {} types.", namespace, self.schema.len()));
        }
        self.code.blank();
        self.code.line(0, "/// Namespace of the schema these bindings were generated from.");
        self.code.line(0, format!("pub const SCHEMA_NAMESPACE: &str = {:?};", namespace));
        self.code.blank();
        self.code.line(0, "/// Fingerprint of the resolved schema. It never appears on the wire.");
        self.code.line(0, format!("pub const SCHEMA_FINGERPRINT: u32 = 0x{fingerprint:08X};"));
    }

    fn ident(&self, id: TypeId) -> &str {
        &self.types[id.index()]
    }

    fn alias(&mut self, id: TypeId, p: Primitive) {
        let line = format!("pub type {} = {};", self.ident(id), p.name());
        self.code.blank();
        self.code.line(0, line);
    }

    fn enumeration(&mut self, id: TypeId, e: &EnumType) -> Result<(), EmitError> {
        let name = self.schema.name(id).to_owned();
        let ident = self.ident(id).to_owned();
        let raw = e.width.name();

        let mut scope = Scope::new(&name);
        scope.claim("Unknown", "Unknown")?;
        let mut variants = Vec::with_capacity(e.members.len());
        for member in &e.members {
            let variant = self.naming.variant_ident(&name, &member.name)?;
            scope.claim(&member.name, &variant)?;
            variants.push((variant, member.value));
        }

        let c = &mut self.code;
        c.blank();
        c.line(0, format!("/// Enum `{name}`, stored as `{raw}`."));
        c.line(0, "///");
        c.line(0, "/// Equality and hashing go by the raw value, so `Unknown` holding a");
        c.line(0, "/// declared value equals that member.");
        c.line(0, "#[derive(Debug, Clone, Copy)]");
        c.line(0, format!("pub enum {ident} {{"));
        for (variant, _) in &variants {
            c.line(1, format!("{variant},"));
        }
        c.line(1, "/// A value no member declares, kept as read.");
        c.line(1, format!("Unknown({raw}),"));
        c.line(0, "}");
        c.blank();

        c.line(0, format!("impl {ident} {{"));
        c.line(1, format!("pub const fn to_raw(self) -> {raw} {{"));
        c.line(2, "match self {");
        for (variant, value) in &variants {
            c.line(3, format!("Self::{variant} => {value},"));
        }
        c.line(3, "Self::Unknown(raw) => raw,");
        c.line(2, "}");
        c.line(1, "}");
        c.blank();
        c.line(1, "/// Declared members win over `Unknown` for the same value.");
        c.line(1, format!("pub const fn from_raw(raw: {raw}) -> Self {{"));
        c.line(2, "match raw {");
        for (variant, value) in &variants {
            c.line(3, format!("{value} => Self::{variant},"));
        }
        c.line(3, "other => Self::Unknown(other),");
        c.line(2, "}");
        c.line(1, "}");
        c.blank();
        c.line(1, "pub const fn is_known(self) -> bool {");
        c.line(2, "!matches!(Self::from_raw(self.to_raw()), Self::Unknown(_))");
        c.line(1, "}");
        c.line(0, "}");
        c.blank();

        c.line(0, format!("impl ::core::cmp::PartialEq for {ident} {{"));
        c.line(1, "fn eq(&self, other: &Self) -> bool {");
        c.line(2, "self.to_raw() == other.to_raw()");
        c.line(1, "}");
        c.line(0, "}");
        c.blank();
        c.line(0, format!("impl ::core::cmp::Eq for {ident} {{}}"));
        c.blank();
        c.line(0, format!("impl ::core::hash::Hash for {ident} {{"));
        c.line(1, "fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {");
        c.line(2, "::core::hash::Hash::hash(&self.to_raw(), state);");
        c.line(1, "}");
        c.line(0, "}");
        c.blank();

        let first = variants
            .first()
            .map_or_else(|| "Self::Unknown(0)".to_owned(), |(v, _)| format!("Self::{v}"));
        c.line(0, format!("impl ::core::default::Default for {ident} {{"));
        c.line(1, "fn default() -> Self {");
        c.line(2, first);
        c.line(1, "}");
        c.line(0, "}");
        c.blank();

        let size = e.width.bytes();
        self.packable_head(&name, &ident, Some(size as u64));
        let rt = self.rt;
        let c = &mut self.code;
        c.line(1, "fn size(&self) -> usize {");
        c.line(2, size.to_string());
        c.line(1, "}");
        c.blank();
        c.line(1, format!("fn write_to(&self, w: &mut {rt}::Writer<'_>) {{"));
        c.line(2, format!("w.write_{}(self.to_raw());", uint_suffix(e.width)));
        c.line(1, "}");
        c.blank();
        c.line(1, read_signature(rt));
        c.line(2, format!("{OK}(Self::from_raw(r.read_{}()?))", uint_suffix(e.width)));
        c.line(1, "}");
        c.line(0, "}");
        Ok(())
    }

    fn structure(&mut self, id: TypeId, s: &StructType) -> Result<(), EmitError> {
        let name = self.schema.name(id).to_owned();
        let ident = self.ident(id).to_owned();
        let layout = self.schema.layout(id).clone();

        let mut scope = Scope::new(&name);
        let mut fields = Vec::with_capacity(s.fields.len());
        for field in &s.fields {
            let field_ident = self.naming.field_ident(&name, &field.name)?;
            scope.claim(&field.name, &field_ident)?;
            fields.push((field_ident, field));
        }

        let what = if s.is_message { "Message" } else { "Struct" };
        self.code.blank();
        self.code.line(0, format!("/// {what} `{name}`, {}.", size_note(layout.min, layout.max)));
        self.code.line(0, "#[derive(Debug, Clone, PartialEq)]");
        self.code.line(0, format!("pub struct {ident} {{"));
        for (field_ident, field) in &fields {
            let ty = self.shape_type(&field.shape);
            self.code.line(1, format!("pub {field_ident}: {ty},"));
        }
        self.code.line(0, "}");

        if let Some(size) = layout.fixed_size() {
            self.code.blank();
            self.code.line(0, format!("impl {ident} {{"));
            self.code.line(1, format!("pub const SIZE: usize = {size};"));
            self.code.line(0, "}");
        }

        self.code.blank();
        self.code.line(0, format!("impl ::core::default::Default for {ident} {{"));
        self.code.line(1, "fn default() -> Self {");
        self.code.line(2, "Self {");
        for (field_ident, field) in &fields {
            let value = self.field_default(field)?;
            self.code.line(3, format!("{field_ident}: {value},"));
        }
        self.code.line(2, "}");
        self.code.line(1, "}");
        self.code.line(0, "}");
        self.code.blank();

        let places: Vec<(String, &ResolvedField)> = fields
            .iter()
            .map(|(field_ident, field)| (format!("self.{field_ident}"), *field))
            .collect();

        self.packable_head(&name, &ident, layout.fixed_size());
        let rt = self.rt;

        self.code.line(1, "fn size(&self) -> usize {");
        let size = match layout.fixed_size() {
            Some(size) => size.to_string(),
            None => places
                .iter()
                .map(|(place, field)| self.shape_size(&field.shape, Slot::Place(place)))
                .collect::<Vec<_>>()
                .join(" + "),
        };
        self.code.line(2, if size.is_empty() { "0".to_owned() } else { size });
        self.code.line(1, "}");

        if places.iter().any(|(_, f)| self.shape_needs_check(&f.shape)) {
            self.code.blank();
            self.code.line(1, validate_signature(rt));
            for (place, field) in &places {
                self.shape_check(2, &field.name, &field.shape, Slot::Place(place));
            }
            self.code.line(2, format!("{OK}(())"));
            self.code.line(1, "}");
        }

        self.code.blank();
        self.code.line(1, format!("fn write_to(&self, w: &mut {rt}::Writer<'_>) {{"));
        if places.is_empty() {
            self.code.line(2, "let _ = w;");
        }
        for (place, field) in &places {
            self.shape_write(2, &field.shape, Slot::Place(place));
        }
        self.code.line(1, "}");

        self.code.blank();
        self.code.line(1, read_signature(rt));
        if fields.is_empty() {
            self.code.line(2, "let _ = r;");
        }
        self.code.line(2, format!("{OK}(Self {{"));
        for (field_ident, field) in &fields {
            let read = self.shape_read(&field.shape);
            self.code.line(3, format!("{field_ident}: {read},"));
        }
        self.code.line(2, "})");
        self.code.line(1, "}");
        self.code.line(0, "}");
        Ok(())
    }

    fn union(&mut self, id: TypeId, u: &UnionType) -> Result<(), EmitError> {
        let name = self.schema.name(id).to_owned();
        let ident = self.ident(id).to_owned();
        let tag_ident = format!("{ident}Tag");
        let layout = self.schema.layout(id).clone();
        let raw = u.tag_width.name();

        let mut variants_scope = Scope::new(&name);
        let mut methods_scope = Scope::new(&name);
        let mut cases = Vec::with_capacity(u.members.len());
        for member in &u.members {
            let variant = self.naming.variant_ident(&name, &member.name)?;
            variants_scope.claim(&member.name, &variant)?;
            let suffix = self.naming.method_suffix(&name, &member.name)?;
            methods_scope.claim(&member.name, &suffix)?;
            cases.push((variant, suffix, member));
        }

        self.code.blank();
        self.code.line(0, format!("/// Union `{name}`, {}.", size_note(layout.min, layout.max)));
        self.code.line(0, "#[derive(Debug, Clone, PartialEq)]");
        self.code.line(0, format!("pub enum {ident} {{"));
        for (variant, _, member) in &cases {
            let ty = self.shape_type(&member.shape);
            self.code.line(1, format!("{variant}({ty}),"));
        }
        self.code.line(0, "}");
        self.code.blank();

        self.code.line(0, format!("/// Wire tags of [`{ident}`]."));
        self.code.line(0, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
        self.code.line(0, format!("#[repr({raw})]"));
        self.code.line(0, format!("pub enum {tag_ident} {{"));
        for (variant, _, member) in &cases {
            self.code.line(1, format!("{variant} = {},", member.tag));
        }
        self.code.line(0, "}");
        self.code.blank();

        self.code.line(0, format!("impl {tag_ident} {{"));
        self.code.line(1, format!("pub const fn to_raw(self) -> {raw} {{"));
        self.code.line(2, format!("self as {raw}"));
        self.code.line(1, "}");
        self.code.blank();
        self.code.line(1, format!("pub const fn from_raw(raw: {raw}) -> {OPTION}<Self> {{"));
        self.code.line(2, "match raw {");
        for (variant, _, member) in &cases {
            self.code.line(3, format!("{} => {OPTION}::Some(Self::{variant}),", member.tag));
        }
        self.code.line(3, format!("_ => {OPTION}::None,"));
        self.code.line(2, "}");
        self.code.line(1, "}");
        self.code.line(0, "}");
        self.code.blank();

        self.code.line(0, format!("impl {ident} {{"));
        self.code.line(1, "/// Tag of the active member.");
        self.code.line(1, format!("pub fn tag(&self) -> {tag_ident} {{"));
        self.code.line(2, "match self {");
        for (variant, _, _) in &cases {
            self.code.line(3, format!("Self::{variant}(_) => {tag_ident}::{variant},"));
        }
        self.code.line(2, "}");
        self.code.line(1, "}");
        for (variant, suffix, member) in &cases {
            let ty = self.shape_type(&member.shape);
            let c = &mut self.code;
            c.blank();
            c.line(1, format!("pub fn new_{suffix}(payload: {ty}) -> Self {{"));
            c.line(2, format!("Self::{variant}(payload)"));
            c.line(1, "}");
            c.blank();
            c.line(1, "/// Replaces tag and payload together.");
            c.line(1, format!("pub fn set_{suffix}(&mut self, payload: {ty}) {{"));
            c.line(2, format!("*self = Self::{variant}(payload);"));
            c.line(1, "}");
            c.blank();
            c.line(1, format!("pub fn as_{suffix}(&self) -> {OPTION}<&{ty}> {{"));
            c.line(2, "match self {");
            c.line(3, format!("Self::{variant}(payload) => {OPTION}::Some(payload),"));
            if cases.len() > 1 {
                c.line(3, format!("_ => {OPTION}::None,"));
            }
            c.line(2, "}");
            c.line(1, "}");
        }
        if let Some(size) = layout.fixed_size() {
            self.code.blank();
            self.code.line(1, format!("pub const SIZE: usize = {size};"));
        }
        self.code.line(0, "}");
        self.code.blank();

        // The resolver rejects empty unions, so there is a first member.
        let default = match cases.first() {
            Some((variant, _, member)) => format!("Self::{variant}({})", self.shape_default(&member.shape)),
            None => return Ok(()),
        };
        self.code.line(0, format!("impl ::core::default::Default for {ident} {{"));
        self.code.line(1, "fn default() -> Self {");
        self.code.line(2, default);
        self.code.line(1, "}");
        self.code.line(0, "}");
        self.code.blank();

        self.packable_head(&name, &ident, layout.fixed_size());
        let rt = self.rt;
        let tag_bytes = u.tag_width.bytes();

        self.code.line(1, "fn size(&self) -> usize {");
        match layout.fixed_size() {
            Some(size) => self.code.line(2, size.to_string()),
            None => {
                self.code.line(2, format!("{tag_bytes} + match self {{"));
                for (variant, _, member) in &cases {
                    let arm = match shape_fixed(self.schema, &member.shape) {
                        Some(size) => format!("Self::{variant}(_) => {size},"),
                        None => format!(
                            "Self::{variant}(v) => {},",
                            self.shape_size(&member.shape, Slot::Ref("v"))
                        ),
                    };
                    self.code.line(3, arm);
                }
                self.code.line(2, "}");
            }
        }
        self.code.line(1, "}");

        let checked = cases
            .iter()
            .filter(|(_, _, m)| self.shape_needs_check(&m.shape))
            .count();
        if checked > 0 {
            self.code.blank();
            self.code.line(1, validate_signature(rt));
            self.code.line(2, "match self {");
            for (variant, _, member) in &cases {
                if self.shape_needs_check(&member.shape) {
                    self.code.line(3, format!("Self::{variant}(v) => {{"));
                    self.shape_check(4, &member.name, &member.shape, Slot::Ref("v"));
                    self.code.line(3, "}");
                }
            }
            if checked < cases.len() {
                self.code.line(3, "_ => {}");
            }
            self.code.line(2, "}");
            self.code.line(2, format!("{OK}(())"));
            self.code.line(1, "}");
        }

        self.code.blank();
        self.code.line(1, format!("fn write_to(&self, w: &mut {rt}::Writer<'_>) {{"));
        self.code
            .line(2, format!("w.write_{}(self.tag().to_raw());", uint_suffix(u.tag_width)));
        self.code.line(2, "match self {");
        for (variant, _, member) in &cases {
            self.code.line(3, format!("Self::{variant}(v) => {{"));
            self.shape_write(4, &member.shape, Slot::Ref("v"));
            self.code.line(3, "}");
        }
        self.code.line(2, "}");
        self.code.line(1, "}");

        self.code.blank();
        self.code.line(1, read_signature(rt));
        self.code.line(2, "let at = r.offset();");
        self.code
            .line(2, format!("let tag = r.read_{}()?;", uint_suffix(u.tag_width)));
        self.code.line(2, format!("{OK}(match tag {{"));
        for (variant, _, member) in &cases {
            let read = self.shape_read(&member.shape);
            self.code.line(3, format!("{} => Self::{variant}({read}),", member.tag));
        }
        self.code.line(3, "other => {");
        self.code.line(4, format!("return ::core::result::Result::Err({rt}::DecodeError::new("));
        self.code.line(5, "at,");
        self.code
            .line(5, format!("{rt}::DecodeErrorKind::InvalidUnionTag(u64::from(other)),"));
        self.code.line(4, "))");
        self.code.line(3, "}");
        self.code.line(2, "})");
        self.code.line(1, "}");
        self.code.line(0, "}");
        Ok(())
    }

    fn packable_head(&mut self, name: &str, ident: &str, fixed: Option<u64>) {
        let rt = self.rt;
        let fixed = match fixed {
            Some(size) => format!("{OPTION}::Some({size})"),
            None => format!("{OPTION}::None"),
        };
        self.code.line(0, format!("impl {rt}::Packable for {ident} {{"));
        self.code.line(1, format!("const TYPE_NAME: &'static str = {name:?};"));
        self.code.line(1, format!("const FIXED_SIZE: {OPTION}<usize> = {fixed};"));
        self.code.blank();
    }

    fn element_type(&self, element: &Element) -> String {
        match element {
            Element::Primitive(p) => p.name().to_owned(),
            Element::String { .. } => STRING.to_owned(),
            Element::Enum(id) | Element::Struct(id) | Element::Union(id) => self.ident(*id).to_owned(),
        }
    }

    fn shape_type(&self, shape: &Shape) -> String {
        match shape {
            Shape::Scalar(e) => self.element_type(e),
            Shape::Fixed { element, len } => format!("[{}; {}]", self.element_type(element), len),
            Shape::Variable { element, .. } => format!("{VEC}<{}>", self.element_type(element)),
        }
    }

    fn field_default(&self, field: &ResolvedField) -> Result<String, EmitError> {
        let (Shape::Scalar(element), Some(default)) = (&field.shape, &field.default) else {
            return Ok(self.shape_default(&field.shape));
        };
        Ok(match (element, default) {
            (_, DefaultValue::Bool(b)) => b.to_string(),
            (Element::Primitive(p), DefaultValue::Int(i)) => format!("{i}{}", p.name()),
            (Element::Primitive(p), DefaultValue::Float(f)) => float_literal(*p, *f),
            (_, DefaultValue::Text(text)) => format!("{STRING}::from({text:?})"),
            (Element::Enum(id), DefaultValue::Enum { member, .. }) => {
                let name = self.schema.name(*id);
                format!("{}::{}", self.ident(*id), self.naming.variant_ident(name, member)?)
            }
            _ => self.element_default(element),
        })
    }

    fn shape_default(&self, shape: &Shape) -> String {
        match shape {
            Shape::Scalar(e) => self.element_default(e),
            Shape::Fixed { element, .. } => {
                format!("::core::array::from_fn(|_| {})", self.element_default(element))
            }
            Shape::Variable { .. } => format!("{VEC}::new()"),
        }
    }

    fn element_default(&self, element: &Element) -> String {
        match element {
            Element::Primitive(Primitive::Bool) => "false".to_owned(),
            Element::Primitive(p) if p.is_float() => "0.0".to_owned(),
            Element::Primitive(_) => "0".to_owned(),
            Element::String { .. } => format!("{STRING}::new()"),
            _ => "::core::default::Default::default()".to_owned(),
        }
    }

    fn element_size(&self, element: &Element, slot: Slot<'_>) -> String {
        if let Some(size) = element_bounds(self.schema, element).fixed_size() {
            return size.to_string();
        }
        match element {
            Element::String { prefix, .. } => format!("{} + {}.len()", prefix.bytes(), slot.recv()),
            _ => format!("{}::Packable::size({})", self.rt, slot.by_ref()),
        }
    }

    fn shape_size(&self, shape: &Shape, slot: Slot<'_>) -> String {
        if let Some(size) = shape_fixed(self.schema, shape) {
            return size.to_string();
        }
        let recv = slot.recv();
        match shape {
            Shape::Scalar(e) => self.element_size(e, slot),
            Shape::Fixed { element, .. } => format!(
                "{recv}.iter().map(|item| {}).sum::<usize>()",
                self.element_size(element, Slot::Ref("item"))
            ),
            Shape::Variable { element, prefix, .. } => {
                match element_bounds(self.schema, element).fixed_size() {
                    Some(size) => format!("{} + {recv}.len() * {size}", prefix.bytes()),
                    None => format!(
                        "{} + {recv}.iter().map(|item| {}).sum::<usize>()",
                        prefix.bytes(),
                        self.element_size(element, Slot::Ref("item"))
                    ),
                }
            }
        }
    }

    fn element_needs_check(element: &Element) -> bool {
        matches!(
            element,
            Element::String { .. } | Element::Struct(_) | Element::Union(_)
        )
    }

    fn shape_needs_check(&self, shape: &Shape) -> bool {
        matches!(shape, Shape::Variable { .. }) || Self::element_needs_check(shape.element())
    }

    fn element_check(&mut self, depth: usize, member: &str, element: &Element, slot: Slot<'_>) {
        let rt = self.rt;
        match element {
            Element::String { max, .. } => self.code.line(
                depth,
                format!(
                    "{rt}::wire::check_len(Self::TYPE_NAME, {member:?}, {}.len(), {max})?;",
                    slot.recv()
                ),
            ),
            Element::Struct(_) | Element::Union(_) => self
                .code
                .line(depth, format!("{rt}::Packable::validate({})?;", slot.by_ref())),
            Element::Primitive(_) | Element::Enum(_) => {}
        }
    }

    fn shape_check(&mut self, depth: usize, member: &str, shape: &Shape, slot: Slot<'_>) {
        let recv = slot.recv();
        match shape {
            Shape::Scalar(e) => self.element_check(depth, member, e, slot),
            Shape::Fixed { element, .. } => {
                if Self::element_needs_check(element) {
                    self.code.line(depth, format!("for item in {recv}.iter() {{"));
                    self.element_check(depth + 1, member, element, Slot::Ref("item"));
                    self.code.line(depth, "}");
                }
            }
            Shape::Variable { element, max, .. } => {
                self.code.line(
                    depth,
                    format!(
                        "{}::wire::check_len(Self::TYPE_NAME, {member:?}, {recv}.len(), {max})?;",
                        self.rt
                    ),
                );
                if Self::element_needs_check(element) {
                    self.code.line(depth, format!("for item in {recv}.iter() {{"));
                    self.element_check(depth + 1, member, element, Slot::Ref("item"));
                    self.code.line(depth, "}");
                }
            }
        }
    }

    fn element_write(&mut self, depth: usize, element: &Element, slot: Slot<'_>) {
        let rt = self.rt;
        let stmt = match element {
            Element::Primitive(p) => format!("w.{}({});", write_method(*p), slot.by_value()),
            Element::String { prefix, .. } => {
                format!("w.write_string({rt}::Width::{prefix:?}, {});", slot.by_ref())
            }
            Element::Enum(_) | Element::Struct(_) | Element::Union(_) => {
                format!("{rt}::Packable::write_to({}, w);", slot.by_ref())
            }
        };
        self.code.line(depth, stmt);
    }

    fn shape_write(&mut self, depth: usize, shape: &Shape, slot: Slot<'_>) {
        let recv = slot.recv();
        match shape {
            Shape::Scalar(e) => self.element_write(depth, e, slot),
            Shape::Fixed { element, .. } => {
                self.code.line(depth, format!("for item in {recv}.iter() {{"));
                self.element_write(depth + 1, element, Slot::Ref("item"));
                self.code.line(depth, "}");
            }
            Shape::Variable { element, prefix, .. } => {
                self.code.line(
                    depth,
                    format!("w.write_len({}::Width::{prefix:?}, {recv}.len());", self.rt),
                );
                self.code.line(depth, format!("for item in {recv}.iter() {{"));
                self.element_write(depth + 1, element, Slot::Ref("item"));
                self.code.line(depth, "}");
            }
        }
    }

    fn element_read(&self, element: &Element) -> String {
        let rt = self.rt;
        match element {
            Element::Primitive(p) => format!("r.{}()?", read_method(*p)),
            Element::String { prefix, max } => {
                format!("r.read_string({rt}::Width::{prefix:?}, {max})?")
            }
            Element::Enum(id) | Element::Struct(id) | Element::Union(id) => {
                format!("<{} as {rt}::Packable>::read_from(r)?", self.ident(*id))
            }
        }
    }

    fn shape_read(&self, shape: &Shape) -> String {
        match shape {
            Shape::Scalar(e) => self.element_read(e),
            Shape::Fixed { element, .. } => {
                format!("r.read_array(|r| {OK}({}))?", self.element_read(element))
            }
            Shape::Variable { element, prefix, max } => format!(
                "r.read_vec({}::Width::{prefix:?}, {max}, |r| {OK}({}))?",
                self.rt,
                self.element_read(element)
            ),
        }
    }
}

fn shape_fixed(schema: &ResolvedSchema, shape: &Shape) -> Option<u64> {
    shape_bounds(schema, shape).fixed_size()
}

fn size_note(min: u64, max: Option<u64>) -> String {
    match max {
        Some(max) if max == min => format!("{min} bytes on the wire"),
        Some(max) => format!("{min} to {max} bytes on the wire"),
        None => format!("at least {min} bytes on the wire"),
    }
}

fn read_signature(rt: &str) -> String {
    format!(
        "fn read_body(r: &mut {rt}::Cursor<'_>) -> ::core::result::Result<Self, {rt}::DecodeError> {{"
    )
}

fn validate_signature(rt: &str) -> String {
    format!("fn validate(&self) -> ::core::result::Result<(), {rt}::EncodeError> {{")
}

/// `u8`, `u16_le`, `u32_le`: suffix of the cursor and writer methods.
fn uint_suffix(width: Width) -> String {
    match width {
        Width::U8 => "u8".to_owned(),
        wide => format!("{}_le", wide.name()),
    }
}

fn primitive_suffix(p: Primitive) -> String {
    match p {
        Primitive::Bool | Primitive::U8 | Primitive::I8 => p.name().to_owned(),
        _ => format!("{}_le", p.name()),
    }
}

fn write_method(p: Primitive) -> String {
    format!("write_{}", primitive_suffix(p))
}

fn read_method(p: Primitive) -> String {
    format!("read_{}", primitive_suffix(p))
}

fn float_literal(p: Primitive, value: f64) -> String {
    let ty = p.name();
    if value.is_nan() {
        format!("{ty}::NAN")
    } else if value == f64::INFINITY {
        format!("{ty}::INFINITY")
    } else if value == f64::NEG_INFINITY {
        format!("{ty}::NEG_INFINITY")
    } else {
        format!("{value:?}{ty}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names() {
        assert_eq!(write_method(Primitive::Bool), "write_bool");
        assert_eq!(read_method(Primitive::I8), "read_i8");
        assert_eq!(read_method(Primitive::F64), "read_f64_le");
        assert_eq!(uint_suffix(Width::U8), "u8");
        assert_eq!(uint_suffix(Width::U32), "u32_le");
    }

    #[test]
    fn test_float_literals() {
        assert_eq!(float_literal(Primitive::F32, 1.0), "1.0f32");
        assert_eq!(float_literal(Primitive::F64, -0.5), "-0.5f64");
        assert_eq!(float_literal(Primitive::F64, f64::NAN), "f64::NAN");
        assert_eq!(float_literal(Primitive::F32, f64::NEG_INFINITY), "f32::NEG_INFINITY");
    }

    #[test]
    fn test_size_note() {
        assert_eq!(size_note(8, Some(8)), "8 bytes on the wire");
        assert_eq!(size_note(2, Some(9)), "2 to 9 bytes on the wire");
        assert_eq!(size_note(6, None), "at least 6 bytes on the wire");
    }
}
