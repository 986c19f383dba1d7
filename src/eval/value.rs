use std::{fmt::Display, rc::Rc};

use crate::ast::{Expr, FALSE, TRUE};

use super::env::LocalEnv;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Char(char),
    // Result of definitions and side-effecting primitives
    Void,
    Closure(Rc<Closure>),
    Struct(Rc<Struct>),
}

// A lambda paired with the lexical environment it was evaluated in
#[derive(Debug, PartialEq)]
pub struct Closure {
    pub param: String,
    pub body: Rc<Expr>,
    pub env: LocalEnv,
}

// Every algebraic value, booleans and lists included
#[derive(Debug, PartialEq)]
pub struct Struct {
    pub constructor: String,
    pub args: Vec<Value>,
}

impl Value {
    pub fn structure(constructor: impl Into<String>, args: Vec<Value>) -> Value {
        Value::Struct(Rc::new(Struct {
            constructor: constructor.into(),
            args,
        }))
    }

    pub fn bool(b: bool) -> Value {
        Value::structure(if b { TRUE } else { FALSE }, Vec::new())
    }

    // Some(b) only for the nullary True and False constructors
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Struct(s) if s.args.is_empty() && s.constructor == TRUE => Some(true),
            Value::Struct(s) if s.args.is_empty() && s.constructor == FALSE => Some(false),
            _ => None,
        }
    }

    // Runtime tag name, which is what `case` compares non-struct scrutinees against
    pub fn tag_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
            Value::Char(_) => "Char",
            Value::Closure(_) => "Closure",
            Value::Struct(_) => "Struct",
            Value::Void => "Null",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Char(c) => write!(f, "{:?}", c),
            Value::Void => write!(f, "void"),
            Value::Closure(closure) => write!(f, "<closure \\{}>", closure.param),
            Value::Struct(s) if s.args.is_empty() => write!(f, "{}", s.constructor),
            Value::Struct(s) => {
                write!(f, "({}", s.constructor)?;
                for arg in &s.args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_are_nullary_structs() {
        assert_eq!(Value::bool(true).as_bool(), Some(true));
        assert_eq!(Value::bool(false).as_bool(), Some(false));
        assert_eq!(Value::structure(TRUE, vec![Value::Int(1)]).as_bool(), None);
        assert_eq!(Value::Int(1).as_bool(), None);
    }

    #[test]
    fn display() {
        let list = Value::structure(
            "Cons",
            vec![Value::Int(1), Value::structure("Cons", vec![Value::Char('x'), Value::structure("Nil", vec![])])],
        );
        assert_eq!(list.to_string(), "(Cons 1 (Cons 'x' Nil))");
        assert_eq!(Value::Void.to_string(), "void");
    }
}
