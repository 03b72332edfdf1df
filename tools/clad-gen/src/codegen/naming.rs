// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rust identifiers for schema names.

use super::EmitError;
use regex::Regex;
use std::collections::HashMap;

/// Strict and reserved keywords that need the `r#` prefix.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "union", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const RESERVED: &[&str] = &["crate", "self", "Self", "super"];

/// Built-in type names; a declared type with one of them would shadow the
/// primitive everywhere in the generated module.
const PRIMITIVE_TYPES: &[&str] = &[
    "bool", "char", "str", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64",
    "u128", "usize", "f32", "f64",
];

pub struct Naming {
    ident: Regex,
    path: Regex,
    words: Regex,
}

impl Naming {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            ident: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")?,
            path: Regex::new(r"^(::)?[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*$")?,
            words: Regex::new(r"[A-Z]+[a-z0-9]*|[a-z0-9]+")?,
        })
    }

    /// `::clad`, `crate::wire` and the like.
    pub fn is_path(&self, path: &str) -> bool {
        self.path.is_match(path)
    }

    /// `fooBar`, `FooBar` and `foo_bar` all become `foo_bar`.
    pub fn snake_case(&self, name: &str) -> String {
        self.words
            .find_iter(name)
            .map(|m| m.as_str().to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join("_")
    }

    /// `foo_bar` and `fooBar` become `FooBar`.
    pub fn upper_camel_case(&self, name: &str) -> String {
        self.words
            .find_iter(name)
            .map(|m| {
                let word = m.as_str().to_ascii_lowercase();
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect()
    }

    /// Type names are kept as declared.
    pub fn type_ident(&self, name: &str) -> Result<String, EmitError> {
        self.check(name, name)?;
        if PRIMITIVE_TYPES.contains(&name) {
            return Err(EmitError::ReservedName {
                type_name: name.to_owned(),
                name: name.to_owned(),
            });
        }
        escape(name, name)
    }

    pub fn field_ident(&self, type_name: &str, name: &str) -> Result<String, EmitError> {
        self.check(type_name, name)?;
        let ident = self.snake_case(name);
        self.check(type_name, &ident)?;
        escape(type_name, &ident)
    }

    pub fn variant_ident(&self, type_name: &str, name: &str) -> Result<String, EmitError> {
        self.check(type_name, name)?;
        let ident = self.upper_camel_case(name);
        self.check(type_name, &ident)?;
        escape(type_name, &ident)
    }

    /// Suffix of generated union methods (`set_<member>` and friends).
    pub fn method_suffix(&self, type_name: &str, name: &str) -> Result<String, EmitError> {
        self.check(type_name, name)?;
        let ident = self.snake_case(name);
        self.check(type_name, &ident)?;
        Ok(ident)
    }

    fn check(&self, type_name: &str, name: &str) -> Result<(), EmitError> {
        if self.ident.is_match(name) && name != "_" {
            Ok(())
        } else {
            Err(EmitError::InvalidIdentifier {
                type_name: type_name.to_owned(),
                name: name.to_owned(),
            })
        }
    }
}

fn escape(type_name: &str, ident: &str) -> Result<String, EmitError> {
    if RESERVED.contains(&ident) {
        return Err(EmitError::ReservedName {
            type_name: type_name.to_owned(),
            name: ident.to_owned(),
        });
    }
    if KEYWORDS.contains(&ident) {
        Ok(format!("r#{ident}"))
    } else {
        Ok(ident.to_owned())
    }
}

/// Generated identifiers within one namespace (a type's fields, its
/// variants, or the file's items).
pub struct Scope {
    type_name: String,
    taken: HashMap<String, String>,
}

impl Scope {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            taken: HashMap::new(),
        }
    }

    /// Record that `source` renders as `ident`.
    pub fn claim(&mut self, source: &str, ident: &str) -> Result<(), EmitError> {
        match self.taken.get(ident) {
            Some(first) => Err(EmitError::NameCollision {
                type_name: self.type_name.clone(),
                first: first.clone(),
                second: source.to_owned(),
                ident: ident.to_owned(),
            }),
            None => {
                self.taken.insert(ident.to_owned(), source.to_owned());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversion() {
        let naming = Naming::new().expect("patterns");
        assert_eq!(naming.snake_case("fooBar"), "foo_bar");
        assert_eq!(naming.snake_case("FooBar"), "foo_bar");
        assert_eq!(naming.snake_case("already_snake"), "already_snake");
        assert_eq!(naming.snake_case("value16Bit"), "value16_bit");
        assert_eq!(naming.upper_camel_case("e1"), "E1");
        assert_eq!(naming.upper_camel_case("set_point"), "SetPoint");
        assert_eq!(naming.upper_camel_case("Pong"), "Pong");
    }

    #[test]
    fn test_keywords_are_raw() {
        let naming = Naming::new().expect("patterns");
        assert_eq!(naming.field_ident("Foo", "type").expect("ident"), "r#type");
        assert_eq!(naming.variant_ident("Foo", "value").expect("ident"), "Value");
        assert!(matches!(
            naming.field_ident("Foo", "self"),
            Err(EmitError::ReservedName { .. })
        ));
        assert!(matches!(
            naming.type_ident("Self"),
            Err(EmitError::ReservedName { .. })
        ));
    }

    #[test]
    fn test_primitive_type_names_reserved() {
        let naming = Naming::new().expect("patterns");
        for name in ["u8", "f32", "bool", "str", "usize"] {
            assert!(
                matches!(naming.type_ident(name), Err(EmitError::ReservedName { .. })),
                "{name:?} accepted"
            );
        }
        assert_eq!(naming.type_ident("U8").expect("ident"), "U8");
        assert_eq!(naming.field_ident("Foo", "u8").expect("ident"), "u8");
    }

    #[test]
    fn test_invalid_identifiers() {
        let naming = Naming::new().expect("patterns");
        for bad in ["1st", "has space", "", "_", "dash-ed"] {
            assert!(
                matches!(
                    naming.field_ident("Foo", bad),
                    Err(EmitError::InvalidIdentifier { .. })
                ),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn test_scope_collision() {
        let mut scope = Scope::new("Foo");
        scope.claim("fooBar", "foo_bar").expect("first claim");
        let err = scope.claim("foo_bar", "foo_bar").unwrap_err();
        assert_eq!(
            err.to_string(),
            "`fooBar` and `foo_bar` in `Foo` both map to `foo_bar`"
        );
    }
}
