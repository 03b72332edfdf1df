// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout Engine: size facts derived from the resolved graph.
//!
//! Facts are computed once during resolution and cached on every
//! [`ResolvedType`](crate::schema::ResolvedType). Value-dependent sizes are
//! computed by the codecs (`Packable::size`, [`dynamic::size_of`]) on top of
//! these bounds.
//!
//! [`dynamic::size_of`]: crate::dynamic::size_of

use crate::schema::{Element, ResolvedKind, ResolvedSchema, Shape, TypeId};

/// Smallest and largest encoding of a type or slot. `max` is `None` when
/// the encoding is unbounded (recursion through a variable array, or a
/// bound that overflows `u64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: u64,
    pub max: Option<u64>,
}

impl Bounds {
    pub const fn fixed(size: u64) -> Self {
        Self {
            min: size,
            max: Some(size),
        }
    }

    pub fn fixed_size(&self) -> Option<u64> {
        (self.max == Some(self.min)).then_some(self.min)
    }

    /// Bounds of `self` followed by `next`.
    fn then(self, next: Bounds) -> Bounds {
        Bounds {
            min: self.min.saturating_add(next.min),
            max: self.max.zip(next.max).and_then(|(a, b)| a.checked_add(b)),
        }
    }

    fn repeat(self, count: u64) -> Bounds {
        Bounds {
            min: self.min.saturating_mul(count),
            max: self.max.and_then(|m| m.checked_mul(count)),
        }
    }

    /// Either `self` or `other`.
    fn widen(self, other: Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.zip(other.max).map(|(a, b)| a.max(b)),
        }
    }
}

/// Cached layout facts of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Bytes that must be present before the full size is known.
    pub min: u64,
    /// Largest possible encoding; `None` when unbounded.
    pub max: Option<u64>,
    /// Struct field offsets, `None` from the first variable-size field on.
    /// Empty for every other kind.
    pub offsets: Vec<Option<u64>>,
}

impl Layout {
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min: self.min,
            max: self.max,
        }
    }

    /// Size shared by every value, if there is one.
    pub fn fixed_size(&self) -> Option<u64> {
        self.bounds().fixed_size()
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed_size().is_some()
    }

    fn scalar(bounds: Bounds) -> Self {
        Self {
            min: bounds.min,
            max: bounds.max,
            offsets: Vec::new(),
        }
    }
}

/// Bounds of one slot, given the bounds of the types it refers to.
fn shape_bounds_with(shape: &Shape, type_bounds: &mut impl FnMut(TypeId) -> Bounds) -> Bounds {
    match shape {
        Shape::Scalar(element) => element_bounds_with(element, type_bounds),
        Shape::Fixed { element, len } => element_bounds_with(element, type_bounds).repeat(*len),
        Shape::Variable {
            element,
            prefix,
            max,
        } => {
            let prefix = Bounds::fixed(prefix.bytes() as u64);
            if *max == 0 {
                return prefix;
            }
            let items = element_bounds_with(element, type_bounds).repeat(*max);
            Bounds {
                min: prefix.min,
                max: prefix.then(items).max,
            }
        }
    }
}

fn element_bounds_with(element: &Element, type_bounds: &mut impl FnMut(TypeId) -> Bounds) -> Bounds {
    match element {
        Element::Primitive(p) => Bounds::fixed(p.size() as u64),
        Element::String { prefix, max } => Bounds {
            min: prefix.bytes() as u64,
            max: (prefix.bytes() as u64).checked_add(*max),
        },
        Element::Enum(id) | Element::Struct(id) | Element::Union(id) => type_bounds(*id),
    }
}

/// Bounds of a slot within a resolved schema.
pub fn shape_bounds(schema: &ResolvedSchema, shape: &Shape) -> Bounds {
    shape_bounds_with(shape, &mut |id| schema.layout(id).bounds())
}

/// Bounds of a single element within a resolved schema.
pub fn element_bounds(schema: &ResolvedSchema, element: &Element) -> Bounds {
    element_bounds_with(element, &mut |id| schema.layout(id).bounds())
}

/// Layout of `id`, as cached during resolution.
pub fn layout(schema: &ResolvedSchema, id: TypeId) -> &Layout {
    schema.layout(id)
}

enum Slot {
    Pending,
    InProgress,
    Done(Bounds),
}

/// Minimum encoding of every type. A variable array contributes only its
/// prefix, and by-value cycles are rejected before layout, so this
/// recursion always terminates.
fn min_sizes(kinds: &[ResolvedKind]) -> Vec<u64> {
    fn type_min(kinds: &[ResolvedKind], mins: &mut [Option<u64>], id: TypeId) -> u64 {
        if let Some(min) = mins[id.0] {
            return min;
        }
        let min = match &kinds[id.0] {
            ResolvedKind::Alias(p) => p.size() as u64,
            ResolvedKind::Enum(e) => e.width.bytes() as u64,
            ResolvedKind::Struct(s) => s
                .fields
                .iter()
                .fold(0u64, |total, f| total.saturating_add(shape_min(kinds, mins, &f.shape))),
            ResolvedKind::Union(u) => {
                let payload = u
                    .members
                    .iter()
                    .map(|m| shape_min(kinds, mins, &m.shape))
                    .min()
                    .unwrap_or(0);
                (u.tag_width.bytes() as u64).saturating_add(payload)
            }
        };
        mins[id.0] = Some(min);
        min
    }

    fn shape_min(kinds: &[ResolvedKind], mins: &mut [Option<u64>], shape: &Shape) -> u64 {
        match shape {
            Shape::Scalar(element) => element_min(kinds, mins, element),
            Shape::Fixed { element, len } => element_min(kinds, mins, element).saturating_mul(*len),
            Shape::Variable { prefix, .. } => prefix.bytes() as u64,
        }
    }

    fn element_min(kinds: &[ResolvedKind], mins: &mut [Option<u64>], element: &Element) -> u64 {
        match element {
            Element::Primitive(p) => p.size() as u64,
            Element::String { prefix, .. } => prefix.bytes() as u64,
            Element::Enum(id) | Element::Struct(id) | Element::Union(id) => type_min(kinds, mins, *id),
        }
    }

    let mut mins = vec![None; kinds.len()];
    (0..kinds.len())
        .map(|index| type_min(kinds, &mut mins, TypeId(index)))
        .collect()
}

struct Engine<'k> {
    kinds: &'k [ResolvedKind],
    mins: Vec<u64>,
    slots: Vec<Slot>,
    layouts: Vec<Option<Layout>>,
}

impl Engine<'_> {
    fn type_bounds(&mut self, id: TypeId) -> Bounds {
        match self.slots[id.0] {
            Slot::Done(bounds) => bounds,
            // By-value cycles are rejected before layout, so the only way
            // back into a type is through a variable array.
            Slot::InProgress => Bounds {
                min: self.mins[id.0],
                max: None,
            },
            Slot::Pending => self.visit(id),
        }
    }

    fn visit(&mut self, id: TypeId) -> Bounds {
        self.slots[id.0] = Slot::InProgress;
        let kinds = self.kinds;
        let layout = match &kinds[id.0] {
            ResolvedKind::Alias(p) => Layout::scalar(Bounds::fixed(p.size() as u64)),
            ResolvedKind::Enum(e) => Layout::scalar(Bounds::fixed(e.width.bytes() as u64)),
            ResolvedKind::Struct(s) => {
                let mut total = Bounds::fixed(0);
                let mut offsets = Vec::with_capacity(s.fields.len());
                for field in &s.fields {
                    offsets.push(total.fixed_size());
                    let field_bounds = shape_bounds_with(&field.shape, &mut |t| self.type_bounds(t));
                    total = total.then(field_bounds);
                }
                Layout {
                    min: total.min,
                    max: total.max,
                    offsets,
                }
            }
            ResolvedKind::Union(u) => {
                let tag = Bounds::fixed(u.tag_width.bytes() as u64);
                let payload = u
                    .members
                    .iter()
                    .map(|m| shape_bounds_with(&m.shape, &mut |t| self.type_bounds(t)))
                    .reduce(Bounds::widen)
                    .unwrap_or(Bounds::fixed(0));
                Layout::scalar(tag.then(payload))
            }
        };
        debug_assert_eq!(layout.min, self.mins[id.0]);
        log::trace!(
            "layout #{}: min={} max={:?} fixed={:?}",
            id.0,
            layout.min,
            layout.max,
            layout.fixed_size()
        );
        let bounds = layout.bounds();
        self.slots[id.0] = Slot::Done(bounds);
        self.layouts[id.0] = Some(layout);
        bounds
    }
}

/// Compute the layout of every type, in declaration order.
pub(crate) fn compute_layouts(kinds: &[ResolvedKind]) -> Vec<Layout> {
    let mut engine = Engine {
        kinds,
        mins: min_sizes(kinds),
        slots: kinds.iter().map(|_| Slot::Pending).collect(),
        layouts: vec![None; kinds.len()],
    };
    for index in 0..kinds.len() {
        engine.type_bounds(TypeId(index));
    }
    engine
        .layouts
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect()
}

impl Default for Layout {
    fn default() -> Self {
        Layout::scalar(Bounds::fixed(0))
    }
}
