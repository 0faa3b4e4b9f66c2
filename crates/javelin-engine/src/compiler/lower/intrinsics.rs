//! Rewrites for built-in globals and `String` members

use crate::compiler::resolver::join_types;
use crate::compiler::types::JavaType;

/// Print statement a `console` method lowers to.
pub fn console_method(name: &str) -> Option<&'static str> {
    match name {
        "log" | "info" | "debug" | "warn" | "trace" => Some("System.out.println"),
        "error" => Some("System.err.println"),
        _ => None,
    }
}

/// A `String` method with a Java counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringMethod {
    pub java: &'static str,
    pub returns: ReturnKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Int,
    Boolean,
    String,
}

impl ReturnKind {
    pub fn java_type(&self) -> JavaType {
        match self {
            ReturnKind::Int => JavaType::int(),
            ReturnKind::Boolean => JavaType::boolean(),
            ReturnKind::String => JavaType::string(),
        }
    }
}

pub fn string_method(name: &str) -> Option<StringMethod> {
    let (java, returns) = match name {
        "includes" => ("contains", ReturnKind::Boolean),
        "startsWith" => ("startsWith", ReturnKind::Boolean),
        "endsWith" => ("endsWith", ReturnKind::Boolean),
        "indexOf" => ("indexOf", ReturnKind::Int),
        "lastIndexOf" => ("lastIndexOf", ReturnKind::Int),
        "toUpperCase" => ("toUpperCase", ReturnKind::String),
        "toLowerCase" => ("toLowerCase", ReturnKind::String),
        "trim" => ("trim", ReturnKind::String),
        "substring" => ("substring", ReturnKind::String),
        "replace" => ("replace", ReturnKind::String),
        "concat" => ("concat", ReturnKind::String),
        "repeat" => ("repeat", ReturnKind::String),
        _ => return None,
    };
    Some(StringMethod { java, returns })
}

/// `str.length` is a method call in Java.
pub fn string_property(name: &str) -> Option<&'static str> {
    match name {
        "length" => Some("length()"),
        _ => None,
    }
}

/// Result type of `Math.name(args)`; every `Math` member passes through.
pub fn math_call_type(name: &str, args: &[JavaType]) -> JavaType {
    match name {
        "round" => JavaType::long(),
        "max" | "min" | "abs" => join_types(args),
        _ => JavaType::double(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_streams() {
        assert_eq!(console_method("log"), Some("System.out.println"));
        assert_eq!(console_method("error"), Some("System.err.println"));
        assert_eq!(console_method("table"), None);
    }

    #[test]
    fn test_string_members() {
        let includes = string_method("includes").unwrap();
        assert_eq!(includes.java, "contains");
        assert_eq!(includes.returns.java_type(), JavaType::boolean());
        assert_eq!(string_property("length"), Some("length()"));
        assert!(string_method("split").is_none());
    }

    #[test]
    fn test_math_types() {
        assert_eq!(math_call_type("round", &[JavaType::double()]), JavaType::long());
        assert_eq!(
            math_call_type("max", &[JavaType::int(), JavaType::int()]),
            JavaType::int()
        );
        assert_eq!(math_call_type("sqrt", &[JavaType::int()]), JavaType::double());
    }
}
