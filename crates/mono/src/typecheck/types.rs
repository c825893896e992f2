use std::fmt;

use im::HashMap as ImHashMap;

use crate::diagnostics::{Diagnostic, Span};

/// Unique identifier for a type variable during inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(pub u32);

/// A monomorphic type. No quantifiers, no schemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Var(TypeVarId),
    Int,
    Bool,
    Func(Box<Type>, Box<Type>),
    List(Box<Type>),
}

impl Type {
    pub fn func(param: Type, result: Type) -> Self {
        Type::Func(Box::new(param), Box::new(result))
    }

    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Var(id) => write!(f, "t{}", id.0),
            Type::Int => write!(f, "Int"),
            Type::Bool => write!(f, "Bool"),
            Type::Func(param, result) => {
                if matches!(param.as_ref(), Type::Func(_, _)) {
                    write!(f, "({param}) -> {result}")
                } else {
                    write!(f, "{param} -> {result}")
                }
            }
            Type::List(element) => {
                if matches!(element.as_ref(), Type::Func(_, _) | Type::List(_)) {
                    write!(f, "List ({element})")
                } else {
                    write!(f, "List {element}")
                }
            }
        }
    }
}

/// Typing context: program variable name to type. Persistent — `extend`
/// returns a new context sharing structure with the old one, so sibling
/// scopes never observe each other's bindings.
#[derive(Debug, Clone, Default)]
pub struct Context {
    bindings: ImHashMap<String, Type>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            bindings: ImHashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.bindings.get(name)
    }

    pub fn extend(&self, name: impl Into<String>, ty: Type) -> Context {
        Context {
            bindings: self.bindings.update(name.into(), ty),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Type)> {
        self.bindings.iter()
    }
}

/// Inference failures. The first error encountered aborts the run.
#[derive(Debug, Clone)]
pub enum TypeError {
    UnboundVariable {
        name: String,
        span: Span,
    },
    Mismatch {
        expected: Box<Type>,
        found: Box<Type>,
        span: Span,
    },
    InfiniteType {
        var: TypeVarId,
        ty: Box<Type>,
        span: Span,
    },
}

impl TypeError {
    pub fn span(&self) -> &Span {
        match self {
            TypeError::UnboundVariable { span, .. }
            | TypeError::Mismatch { span, .. }
            | TypeError::InfiniteType { span, .. } => span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, message) = match self {
            TypeError::UnboundVariable { name, .. } => {
                ("E2001", format!("unknown name '{name}'"))
            }
            TypeError::Mismatch {
                expected, found, ..
            } => (
                "E2002",
                format!("type mismatch: expected {expected}, found {found}"),
            ),
            TypeError::InfiniteType { var, ty, .. } => (
                "E2003",
                format!("cannot construct the infinite type t{} = {ty}", var.0),
            ),
        };
        Diagnostic {
            code: code.to_string(),
            message,
            span: self.span().clone(),
            labels: Vec::new(),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UnboundVariable { name, .. } => write!(f, "unknown name '{name}'"),
            TypeError::Mismatch {
                expected, found, ..
            } => write!(f, "type mismatch: expected {expected}, found {found}"),
            TypeError::InfiniteType { var, ty, .. } => {
                write!(f, "cannot construct the infinite type t{} = {ty}", var.0)
            }
        }
    }
}
