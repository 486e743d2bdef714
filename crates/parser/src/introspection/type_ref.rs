//! Generic type descriptors
//!
//! A [`TypeRef`] is a declared type with its type arguments, e.g.
//! `org.springframework.http.ResponseEntity<java.util.List<com.example.UserDto>>`.
//! Facts files may spell a type either as that text form or as a structured
//! object, which is the only way to attach a bound to a type variable.

use restmeta_common::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A declared type and its generic arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TypeRefRepr")]
pub struct TypeRef {
    /// Qualified raw name; array types keep their `[]` suffix
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeRef>,
    /// True for an unresolved type variable such as `T`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub variable: bool,
    /// Declared upper bound of a type variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeRefRepr {
    Text(String),
    Full {
        path: String,
        #[serde(default)]
        args: Vec<TypeRef>,
        #[serde(default)]
        variable: bool,
        #[serde(default)]
        bound: Option<String>,
    },
}

impl TryFrom<TypeRefRepr> for TypeRef {
    type Error = GeneratorError;

    fn try_from(repr: TypeRefRepr) -> Result<Self> {
        match repr {
            TypeRefRepr::Text(text) => TypeRef::parse(&text),
            TypeRefRepr::Full {
                path,
                args,
                variable,
                bound,
            } => Ok(TypeRef {
                path,
                args,
                variable,
                bound,
            }),
        }
    }
}

impl TypeRef {
    /// A non-generic named type
    pub fn named(path: &str) -> Self {
        Self {
            path: path.to_string(),
            args: vec![],
            variable: false,
            bound: None,
        }
    }

    /// A generic type with arguments
    pub fn generic(path: &str, args: Vec<TypeRef>) -> Self {
        Self {
            args,
            ..Self::named(path)
        }
    }

    /// An unresolved type variable
    pub fn variable(name: &str, bound: Option<&str>) -> Self {
        Self {
            variable: true,
            bound: bound.map(str::to_string),
            ..Self::named(name)
        }
    }

    /// Parse the text form `a.b.Outer<a.b.Inner, X>`
    ///
    /// Names made of one upper-case letter, optionally followed by one digit,
    /// are type variables. `?` and `? extends X` wildcards are accepted.
    pub fn parse(text: &str) -> Result<Self> {
        let mut parser = TypeParser {
            src: text,
            pos: 0,
        };
        let parsed = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != text.len() {
            return Err(GeneratorError::Parse(format!(
                "Unexpected trailing input in type '{}' at offset {}",
                text, parser.pos
            )));
        }
        Ok(parsed)
    }

    /// Element type of an array type (`X[]` → `X`)
    pub fn array_element(&self) -> Option<TypeRef> {
        self.path.strip_suffix("[]").map(TypeRef::named)
    }

    /// The raw name this type erases to, if it is known
    pub fn erasure(&self) -> Option<&str> {
        if self.variable {
            self.bound.as_deref()
        } else {
            Some(&self.path)
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

fn is_type_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(first), None, None) => first.is_ascii_uppercase(),
        (Some(first), Some(second), None) => first.is_ascii_uppercase() && second.is_ascii_digit(),
        _ => false,
    }
}

struct TypeParser<'a> {
    src: &'a str,
    pos: usize,
}

impl TypeParser<'_> {
    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '.' || c == '_' || c == '$' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(GeneratorError::Parse(format!(
                "Expected a type name in '{}' at offset {}",
                self.src, start
            )));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn parse_type(&mut self) -> Result<TypeRef> {
        if self.eat('?') {
            self.skip_ws();
            if self.src[self.pos..].starts_with("extends") {
                self.pos += "extends".len();
                return self.parse_type();
            }
            return Ok(TypeRef::variable("?", None));
        }

        let name = self.parse_name()?;
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
                return Err(GeneratorError::Parse(format!(
                    "Unterminated type arguments in '{}'",
                    self.src
                )));
            }
        }

        let mut path = name;
        while self.eat('[') {
            if !self.eat(']') {
                return Err(GeneratorError::Parse(format!(
                    "Malformed array suffix in '{}'",
                    self.src
                )));
            }
            path.push_str("[]");
        }

        if args.is_empty() && is_type_variable_name(&path) {
            return Ok(TypeRef::variable(&path, None));
        }
        Ok(TypeRef::generic(&path, args))
    }
}
