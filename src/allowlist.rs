//! Allowlist policies restricting which types deserialization may produce.
//!
//! Types are identified by their canonical name: the value of
//! [`std::any::type_name`] with references stripped and borrowed forms mapped
//! to their owned counterparts, so bytes produced from a `&str` are
//! recognised as a `String`. Names are stable within one build of a program,
//! which matches the in-process scope of this crate.

use std::{any::type_name, borrow::Cow, collections::BTreeSet, fmt};

/// Policy deciding whether a type may be materialised by deserialization.
///
/// Implementations must be pure: the same name always yields the same answer.
pub trait AllowlistPolicy: fmt::Debug + Send + Sync + 'static {
    /// Return `true` when values named `type_name` may be produced.
    fn is_allowed(&self, type_name: &str) -> bool;
}

/// Policy that admits every type.
///
/// Suitable only for contexts whose input is fully trusted.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl AllowlistPolicy for AllowAll {
    fn is_allowed(&self, _type_name: &str) -> bool { true }
}

/// Explicit set of permitted type names.
///
/// ```
/// use ledgerwire::{AllowlistPolicy, TypeAllowlist};
///
/// #[derive(serde::Deserialize)]
/// struct Payment {
///     amount: u64,
/// }
///
/// let policy = TypeAllowlist::builtin().with::<Payment>();
/// assert!(policy.is_allowed(std::any::type_name::<Payment>()));
/// assert!(policy.is_allowed(std::any::type_name::<String>()));
/// assert!(!policy.is_allowed("std::fs::File"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeAllowlist {
    names: BTreeSet<String>,
}

impl TypeAllowlist {
    /// Create an empty allowlist that rejects everything.
    #[must_use]
    pub fn empty() -> Self { Self::default() }

    /// Allowlist containing primitives, `String`, `Vec<u8>` and `()`.
    #[must_use]
    pub fn builtin() -> Self {
        let names = [
            type_name::<()>(),
            type_name::<bool>(),
            type_name::<char>(),
            type_name::<u8>(),
            type_name::<u16>(),
            type_name::<u32>(),
            type_name::<u64>(),
            type_name::<u128>(),
            type_name::<usize>(),
            type_name::<i8>(),
            type_name::<i16>(),
            type_name::<i32>(),
            type_name::<i64>(),
            type_name::<i128>(),
            type_name::<isize>(),
            type_name::<f32>(),
            type_name::<f64>(),
            type_name::<String>(),
            type_name::<Vec<u8>>(),
        ];
        Self {
            names: names.into_iter().map(str::to_owned).collect(),
        }
    }

    /// Return a copy that also admits `T`.
    #[must_use]
    pub fn with<T: ?Sized>(mut self) -> Self {
        self.names.insert(canonical_type_name::<T>().into_owned());
        self
    }

    /// Return a copy that also admits the type named `name`.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Number of admitted names.
    #[must_use]
    pub fn len(&self) -> usize { self.names.len() }

    /// Whether no names are admitted.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.names.is_empty() }
}

impl AllowlistPolicy for TypeAllowlist {
    fn is_allowed(&self, type_name: &str) -> bool { self.names.contains(type_name) }
}

/// Canonical name of `T` as recorded on the wire and checked by allowlists.
///
/// Borrowed forms are replaced by the owned types they deserialize into,
/// at any depth: `&str` becomes `String`, a slice `[T]` becomes `Vec<T>`,
/// and references are dropped. `Vec<&str>`, `&[u64]` and `(&str, u8)`
/// therefore share a name with `Vec<String>`, `Vec<u64>` and
/// `(String, u8)`.
#[must_use]
pub fn canonical_type_name<T: ?Sized>() -> Cow<'static, str> {
    let name = type_name::<T>();
    if !name.contains('&') && !name.starts_with('[') && name != "str" {
        return Cow::Borrowed(name);
    }
    let canonical = canonicalise(name, true);
    if canonical == name {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(canonical)
    }
}

/// `unsized_owned` marks positions where `str` and `[T]` stand for values
/// decoded as `String` and `Vec<T>`: the top level and behind a reference.
/// Elsewhere, as in `Box<str>`, they name themselves.
fn canonicalise(name: &str, unsized_owned: bool) -> String {
    let trimmed = name.trim();
    let name = strip_references(trimmed);
    let unsized_owned = unsized_owned || name.len() != trimmed.len();
    if name == "str" && unsized_owned {
        return type_name::<String>().to_owned();
    }
    if let Some(inner) = name.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return match split_top_level(inner, ';').as_slice() {
            [element] if unsized_owned => vec_of(&canonicalise(element, false)),
            [element] => format!("[{}]", canonicalise(element, false)),
            [element, len] => format!("[{}; {}]", canonicalise(element, false), len.trim()),
            _ => name.to_owned(),
        };
    }
    if let Some(inner) = name.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        let items: Vec<String> = split_top_level(inner, ',')
            .into_iter()
            .filter(|item| !item.trim().is_empty())
            .map(|item| canonicalise(item, false))
            .collect();
        return match items.as_slice() {
            [single] if inner.trim_end().ends_with(',') => format!("({single},)"),
            _ => format!("({})", items.join(", ")),
        };
    }
    if let (Some(open), true) = (name.find('<'), name.ends_with('>')) {
        let args: Vec<String> = split_top_level(&name[open + 1..name.len() - 1], ',')
            .into_iter()
            .map(|arg| canonicalise(arg, false))
            .collect();
        return format!("{}<{}>", &name[..open], args.join(", "));
    }
    name.to_owned()
}

fn strip_references(mut name: &str) -> &str {
    loop {
        if let Some(rest) = name.strip_prefix("&mut ") {
            name = rest;
        } else if let Some(rest) = name.strip_prefix('&') {
            name = rest;
        } else {
            return name;
        }
    }
}

fn vec_of(element: &str) -> String {
    let path = type_name::<Vec<u8>>()
        .strip_suffix("<u8>")
        .unwrap_or("alloc::vec::Vec");
    format!("{path}<{element}>")
}

/// Split `list` on `separator` where it is not nested in brackets.
fn split_top_level(list: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    let mut previous = None;
    for (index, c) in list.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            // `->` in function pointer types is not a closing bracket.
            '>' if previous == Some('-') => {}
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&list[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
        previous = Some(c);
    }
    parts.push(&list[start..]);
    parts
}
