//! Type-expression parsing.
//!
//! A type spread is the lexeme run between a declaration keyword and the
//! declared name, e.g. `ptr:int[10]:const` in
//! `var ptr:int[10]:const foo;`. The spread splits on `:`, `[` and `]`
//! (the scanner already did that), the colons are discarded, and a
//! left-to-right walk accumulates [`TypeEntry`] values: a new base or a
//! `ptr` prefix begins another entry. One entry and no array promotes to
//! a flat scalar/pointer type; one entry plus an array suffix is a
//! dynamic or static array; two entries plus an array suffix reclassify
//! as an associative array `V[K]`.

use rlc_lex::Lexeme;

use crate::Parser;

/// Mutability attribute of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    Immutable,
    Const,
    Mut,
}

impl Mutability {
    /// Map a keyword lexeme to its mutability, if it is one.
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "immutable" => Some(Self::Immutable),
            "const" => Some(Self::Const),
            "mut" => Some(Self::Mut),
            _ => None,
        }
    }
}

/// The composite shape of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// A plain base type, possibly behind a pointer.
    Scalar,
    /// `T[]`
    DynamicArray,
    /// `T[N]`
    StaticArray(u64),
    /// `V[K]`
    Associative,
}

/// One accumulated entry of a composite type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeEntry {
    pub is_pointer: bool,
    pub base: String,
    pub mutability: Option<Mutability>,
}

/// A fully parsed type.
///
/// For the flat case the single entry is promoted into `is_pointer`,
/// `base` and `mutability`; for an associative array the first entry is
/// the value type and the second the key type. The declared identifier
/// the type belongs to is filled in by the declaration parser.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeInfo {
    /// The declared name this type annotates; empty until claimed.
    pub name: String,
    pub is_pointer: bool,
    pub base: String,
    pub mutability: Option<Mutability>,
    pub kind: TypeKind,
    /// The accumulated entries, preserved for composite forms.
    pub entries: Vec<TypeEntry>,
}

impl TypeInfo {
    /// The default `void` return type.
    pub fn void() -> Self {
        Self::scalar("void")
    }

    /// A flat scalar type with the given base.
    pub fn scalar(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            name: String::new(),
            is_pointer: false,
            base: base.clone(),
            mutability: None,
            kind: TypeKind::Scalar,
            entries: vec![TypeEntry {
                is_pointer: false,
                base,
                mutability: None,
            }],
        }
    }

    /// Attach the declared identifier.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<'a> Parser<'a> {
    /// Parse a type spread into a [`TypeInfo`].
    ///
    /// Emits a diagnostic and returns `None` on the first malformed
    /// element; each failure mode carries its own message.
    pub fn parse_type(
        &mut self,
        tokens: &[Lexeme],
        line: u32,
        speculative: bool,
    ) -> Option<TypeInfo> {
        let parts: Vec<&Lexeme> = tokens.iter().filter(|l| l.text != ":").collect();
        if parts.is_empty() {
            self.report(line, "Missing type from declaration.", speculative);
            return None;
        }

        let mut entries: Vec<TypeEntry> = Vec::new();
        let mut current: Option<TypeEntry> = None;
        let mut pending_pointer = false;
        let mut in_array = false;
        let mut array_seen = false;
        let mut size: Option<u64> = None;
        let mut outer_mutability: Option<Mutability> = None;

        for part in &parts {
            let text = part.text.as_str();
            match text {
                "ptr" => {
                    if pending_pointer {
                        self.report(part.line, "Only one pointer attribute is allowed per type.", speculative);
                        return None;
                    }
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    pending_pointer = true;
                },
                "[" => {
                    if array_seen {
                        self.report(part.line, "Only one array declaration is allowed per type.", speculative);
                        return None;
                    }
                    match current.take() {
                        Some(entry) => entries.push(entry),
                        None => {
                            self.report(part.line, "Missing type before array declaration.", speculative);
                            return None;
                        },
                    }
                    in_array = true;
                    array_seen = true;
                },
                "]" => {
                    if !in_array {
                        self.report(part.line, "Unexpected ']' in type declaration.", speculative);
                        return None;
                    }
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    in_array = false;
                },
                _ if Mutability::from_text(text).is_some() => {
                    let mutability = Mutability::from_text(text);
                    if array_seen && !in_array {
                        if outer_mutability.is_some() {
                            self.report(
                                part.line,
                                "Only one attribute may follow a type declaration.",
                                speculative,
                            );
                            return None;
                        }
                        outer_mutability = mutability;
                    } else {
                        match current.as_mut() {
                            Some(entry) => entry.mutability = mutability,
                            None => {
                                self.report(
                                    part.line,
                                    format!("Attribute '{}' must be preceded by a type.", text),
                                    speculative,
                                );
                                return None;
                            },
                        }
                    }
                },
                _ if text.starts_with(|c: char| c.is_ascii_digit()) => {
                    if !in_array {
                        self.report(part.line, format!("Invalid type name '{}'.", text), speculative);
                        return None;
                    }
                    if size.is_some() {
                        self.report(part.line, "Only one size is allowed per array declaration.", speculative);
                        return None;
                    }
                    match text.parse::<u64>() {
                        Ok(value) => size = Some(value),
                        Err(_) => {
                            self.report(part.line, "Array size must be an unsigned integer.", speculative);
                            return None;
                        },
                    }
                },
                _ => {
                    if array_seen && !in_array {
                        self.report(
                            part.line,
                            format!("Unknown attribute '{}' after type declaration.", text),
                            speculative,
                        );
                        return None;
                    }
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    current = Some(TypeEntry {
                        is_pointer: std::mem::take(&mut pending_pointer),
                        base: text.to_string(),
                        mutability: None,
                    });
                },
            }
        }

        if in_array {
            self.report(line, "Missing ']' from type declaration.", speculative);
            return None;
        }
        if pending_pointer {
            self.report(line, "Pointer attribute must precede a type.", speculative);
            return None;
        }
        if let Some(entry) = current.take() {
            entries.push(entry);
        }

        if entries.is_empty() {
            self.report(line, "Missing type from declaration.", speculative);
            return None;
        }
        if entries.len() > 2 || (!array_seen && entries.len() == 2) {
            self.report(line, "Too many types in declaration.", speculative);
            return None;
        }

        let kind = if !array_seen {
            TypeKind::Scalar
        } else if entries.len() == 2 {
            // Two entries around an array suffix: value and key type of
            // an associative array. The dynamic/static shape is dropped.
            TypeKind::Associative
        } else {
            match size {
                Some(value) => TypeKind::StaticArray(value),
                None => TypeKind::DynamicArray,
            }
        };

        let first = &entries[0];
        Some(TypeInfo {
            name: String::new(),
            is_pointer: first.is_pointer,
            base: first.base.clone(),
            mutability: outer_mutability.or(first.mutability),
            kind,
            entries,
        })
    }
}
