//! Type expressions for the specimen fixture generator.
//!
//! `TypeRef` is the explicit structural description of a target type. It
//! replaces runtime type inspection: composites are looked up by name in a
//! [`TypeRegistry`](crate::TypeRegistry), everything else is built in.
//!
//! # String Format
//!
//! Type expressions are written the same way in code and in YAML catalogs:
//!
//! ```text
//! i32
//! String
//! i64[]                      array of i64
//! List<Person>
//! Set<Uuid>
//! Map<String, List<i32>>
//! Tree<String>               composite `Tree` bound to `String`
//! ```

use crate::error::TypeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Built-in leaf types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Boolean value
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit IEEE 754 floating point
    Float32,
    /// 64-bit IEEE 754 floating point
    Float64,
    /// Single character
    Char,
    /// Unbounded string
    String,
    /// UUID (128-bit)
    Uuid,
    /// Calendar date (YYYY-MM-DD)
    Date,
    /// UTC timestamp
    DateTime,
    /// Amount of time in years, months and days
    Period,
}

impl ScalarKind {
    /// Canonical name used in type expressions.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "i8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
            Self::Char => "char",
            Self::String => "String",
            Self::Uuid => "Uuid",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Period => "Period",
        }
    }

    /// Look up a scalar by its canonical name or lowercase alias.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => Self::Bool,
            "i8" => Self::Int8,
            "i16" => Self::Int16,
            "i32" => Self::Int32,
            "i64" => Self::Int64,
            "f32" => Self::Float32,
            "f64" => Self::Float64,
            "char" => Self::Char,
            "String" | "string" => Self::String,
            "Uuid" | "uuid" => Self::Uuid,
            "Date" | "date" => Self::Date,
            "DateTime" | "datetime" | "date_time" => Self::DateTime,
            "Period" | "period" => Self::Period,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Variable-size collection flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Ordered, duplicates allowed
    List,
    /// Unique elements
    Set,
}

impl CollectionKind {
    fn name(self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Set => "Set",
        }
    }
}

/// A type expression.
///
/// Generic composites carry their type arguments; inside a composite
/// definition, references to the composite's own type parameters are
/// [`TypeRef::Param`] and get substituted when the composite is described.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Built-in leaf type
    Scalar(ScalarKind),

    /// Fixed-length array
    Array(Box<TypeRef>),

    /// List or set
    Collection {
        kind: CollectionKind,
        element: Box<TypeRef>,
    },

    /// Key/value map
    Map { key: Box<TypeRef>, value: Box<TypeRef> },

    /// Composite registered in a `TypeRegistry`
    Named { name: String, args: Vec<TypeRef> },

    /// Unbound type parameter of the enclosing composite
    Param(String),
}

impl TypeRef {
    /// Composite without type arguments.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Composite instantiated with type arguments.
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    /// Type parameter reference, for use inside composite definitions.
    pub fn param(name: impl Into<String>) -> Self {
        Self::Param(name.into())
    }

    pub fn array(element: impl Into<TypeRef>) -> Self {
        Self::Array(Box::new(element.into()))
    }

    pub fn list(element: impl Into<TypeRef>) -> Self {
        Self::Collection {
            kind: CollectionKind::List,
            element: Box::new(element.into()),
        }
    }

    pub fn set(element: impl Into<TypeRef>) -> Self {
        Self::Collection {
            kind: CollectionKind::Set,
            element: Box::new(element.into()),
        }
    }

    pub fn map(key: impl Into<TypeRef>, value: impl Into<TypeRef>) -> Self {
        Self::Map {
            key: Box::new(key.into()),
            value: Box::new(value.into()),
        }
    }

    /// Name of the composite, if this is a composite reference.
    pub fn composite_name(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// First unbound type parameter found in this expression, depth first.
    pub fn first_param(&self) -> Option<&str> {
        match self {
            Self::Scalar(_) => None,
            Self::Param(name) => Some(name),
            Self::Array(element) | Self::Collection { element, .. } => element.first_param(),
            Self::Map { key, value } => key.first_param().or_else(|| value.first_param()),
            Self::Named { args, .. } => args.iter().find_map(|arg| arg.first_param()),
        }
    }

    /// Whether this expression is free of type parameters.
    pub fn is_concrete(&self) -> bool {
        self.first_param().is_none()
    }

    /// Turn bare references to `params` into [`TypeRef::Param`].
    ///
    /// Parsed expressions cannot tell `E` from a composite named `E`; the
    /// owning definition knows its parameter names.
    pub fn bind_params(&self, params: &[String]) -> TypeRef {
        match self {
            Self::Named { name, args } if args.is_empty() && params.contains(name) => {
                Self::Param(name.clone())
            }
            Self::Named { name, args } => Self::Named {
                name: name.clone(),
                args: args.iter().map(|arg| arg.bind_params(params)).collect(),
            },
            Self::Array(element) => Self::Array(Box::new(element.bind_params(params))),
            Self::Collection { kind, element } => Self::Collection {
                kind: *kind,
                element: Box::new(element.bind_params(params)),
            },
            Self::Map { key, value } => Self::Map {
                key: Box::new(key.bind_params(params)),
                value: Box::new(value.bind_params(params)),
            },
            Self::Scalar(_) | Self::Param(_) => self.clone(),
        }
    }

    /// Replace type parameters with their bindings.
    ///
    /// Returns the name of the first parameter without a binding as the error.
    pub fn substitute(&self, bindings: &HashMap<&str, &TypeRef>) -> Result<TypeRef, String> {
        let substituted = match self {
            Self::Param(name) => match bindings.get(name.as_str()) {
                Some(bound) => (*bound).clone(),
                None => return Err(name.clone()),
            },
            Self::Scalar(_) => self.clone(),
            Self::Array(element) => Self::Array(Box::new(element.substitute(bindings)?)),
            Self::Collection { kind, element } => Self::Collection {
                kind: *kind,
                element: Box::new(element.substitute(bindings)?),
            },
            Self::Map { key, value } => Self::Map {
                key: Box::new(key.substitute(bindings)?),
                value: Box::new(value.substitute(bindings)?),
            },
            Self::Named { name, args } => Self::Named {
                name: name.clone(),
                args: args
                    .iter()
                    .map(|arg| arg.substitute(bindings))
                    .collect::<Result<_, _>>()?,
            },
        };
        Ok(substituted)
    }

    /// Whether `name` is reserved for a built-in type.
    pub fn is_builtin_name(name: &str) -> bool {
        ScalarKind::from_name(name).is_some() || matches!(name, "Array" | "List" | "Set" | "Map")
    }
}

impl From<ScalarKind> for TypeRef {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Array(element) => write!(f, "{element}[]"),
            Self::Collection { kind, element } => write!(f, "{}<{element}>", kind.name()),
            Self::Map { key, value } => write!(f, "Map<{key}, {value}>"),
            Self::Param(name) => f.write_str(name),
            Self::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for TypeRef {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeParser { input: s, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_whitespace();
        if parser.pos != s.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

/// Recursive-descent parser for type expressions.
struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn error(&self, reason: &'static str) -> TypeError {
        TypeError::Parse {
            input: self.input.to_string(),
            position: self.pos,
            reason,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<&'a str, TypeError> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            self.pos += c.len_utf8();
        }
        if start == self.pos {
            return Err(self.error("expected a type name"));
        }
        Ok(&self.input[start..self.pos])
    }

    fn parse_type(&mut self) -> Result<TypeRef, TypeError> {
        let name = self.ident()?;
        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.parse_type()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.error("expected ',' or '>'"));
            }
        }

        let mut ty = self.build(name, args)?;
        while self.eat('[') {
            if !self.eat(']') {
                return Err(self.error("expected ']'"));
            }
            ty = TypeRef::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn build(&self, name: &str, mut args: Vec<TypeRef>) -> Result<TypeRef, TypeError> {
        if let Some(kind) = ScalarKind::from_name(name) {
            if !args.is_empty() {
                return Err(self.error("scalar types take no type arguments"));
            }
            return Ok(TypeRef::Scalar(kind));
        }

        let expected = match name {
            "Array" | "List" | "Set" => 1,
            "Map" => 2,
            _ => {
                return Ok(TypeRef::Named {
                    name: name.to_string(),
                    args,
                })
            }
        };
        if args.len() != expected {
            return Err(self.error("wrong number of type arguments"));
        }

        let ty = match name {
            "Array" => TypeRef::Array(Box::new(args.remove(0))),
            "List" => TypeRef::list(args.remove(0)),
            "Set" => TypeRef::set(args.remove(0)),
            _ => {
                let value = args.remove(1);
                TypeRef::map(args.remove(0), value)
            }
        };
        Ok(ty)
    }
}

// Type expressions serialize as their string form, so YAML catalogs can say
// `type: List<Tree<E>>`.

impl Serialize for TypeRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, Visitor};

        struct TypeRefVisitor;

        impl Visitor<'_> for TypeRefVisitor {
            type Value = TypeRef;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a type expression such as \"List<String>\"")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TypeRefVisitor)
    }
}
