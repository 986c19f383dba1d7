use std::{fmt::Display, rc::Rc};

use serde_json::{json, Value as Json};

// Canonical tag names of operators. Binary and unary operators are desugared by
// the parser into applications of variables with these names.
pub const OP_OR: &str = "OR";
pub const OP_AND: &str = "AND";
pub const OP_EQ: &str = "EQ";
pub const OP_NE: &str = "NE";
pub const OP_GE: &str = "GE";
pub const OP_LE: &str = "LE";
pub const OP_GT: &str = "GT";
pub const OP_LT: &str = "LT";
pub const OP_ADD: &str = "ADD";
pub const OP_SUB: &str = "SUB";
pub const OP_MUL: &str = "MUL";
pub const OP_DIV: &str = "DIV";
pub const OP_MOD: &str = "MOD";
pub const OP_NOT: &str = "NOT";
pub const OP_UMINUS: &str = "UMINUS";

pub const CONS: &str = "Cons";
pub const NIL: &str = "Nil";
pub const TRUE: &str = "True";
pub const FALSE: &str = "False";

// Name bound by `e1; e2`
pub const SEQUENCE_BINDER: &str = "_";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub definitions: Vec<Definition>,
}

// A top-level definition. Parameters are desugared into curried lambdas by the
// parser, so `def f x y = e` has body `\x -> \y -> e`.
#[derive(Clone, Debug, PartialEq)]
pub struct Definition {
    pub name: String,
    pub body: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Var(String),
    Constructor(String),
    Number(i64),
    Char(char),
    Lambda {
        param: String,
        // Shared with every closure built from this lambda
        body: Rc<Expr>,
    },
    Apply {
        fun: Box<Expr>,
        arg: Box<Expr>,
    },
    Let {
        name: String,
        value: Box<Expr>,
        body: Box<Expr>,
    },
    Case {
        scrutinee: Box<Expr>,
        branches: Vec<CaseBranch>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaseBranch {
    pub constructor: String,
    pub params: Vec<String>,
    pub body: Expr,
}

impl Program {
    pub fn new(definitions: Vec<Definition>) -> Program {
        Program { definitions }
    }

    pub fn to_json(&self) -> Json {
        Json::Array(self.definitions.iter().map(Definition::to_json).collect())
    }
}

impl Definition {
    pub fn new(name: impl Into<String>, body: Expr) -> Definition {
        Definition {
            name: name.into(),
            body,
        }
    }

    pub fn to_json(&self) -> Json {
        json!(["Def", self.name, self.body.to_json()])
    }
}

impl CaseBranch {
    pub fn new<S: Into<String>>(constructor: impl Into<String>, params: impl IntoIterator<Item = S>, body: Expr) -> CaseBranch {
        CaseBranch {
            constructor: constructor.into(),
            params: params.into_iter().map(Into::into).collect(),
            body,
        }
    }

    pub fn to_json(&self) -> Json {
        json!(["CaseBranch", self.constructor, self.params, self.body.to_json()])
    }
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Expr {
        Expr::Var(name.into())
    }

    pub fn constructor(name: impl Into<String>) -> Expr {
        Expr::Constructor(name.into())
    }

    pub fn lambda(param: impl Into<String>, body: Expr) -> Expr {
        Expr::Lambda {
            param: param.into(),
            body: Rc::new(body),
        }
    }

    pub fn apply(fun: Expr, arg: Expr) -> Expr {
        Expr::Apply {
            fun: Box::new(fun),
            arg: Box::new(arg),
        }
    }

    pub fn let_in(name: impl Into<String>, value: Expr, body: Expr) -> Expr {
        Expr::Let {
            name: name.into(),
            value: Box::new(value),
            body: Box::new(body),
        }
    }

    pub fn case(scrutinee: Expr, branches: Vec<CaseBranch>) -> Expr {
        Expr::Case {
            scrutinee: Box::new(scrutinee),
            branches,
        }
    }

    // `a OP b` => `(OP a) b`
    pub fn binary(op: &str, left: Expr, right: Expr) -> Expr {
        Expr::apply(Expr::apply(Expr::var(op), left), right)
    }

    pub fn unary(op: &str, arg: Expr) -> Expr {
        Expr::apply(Expr::var(op), arg)
    }

    // `e1; e2` => `let _ = e1 in e2`
    pub fn sequence(first: Expr, rest: Expr) -> Expr {
        Expr::let_in(SEQUENCE_BINDER, first, rest)
    }

    // Wrap body in one lambda per parameter, outermost parameter first
    pub fn curry<S: Into<String>>(params: impl IntoIterator<Item = S>, body: Expr) -> Expr {
        let params: Vec<String> = params.into_iter().map(Into::into).collect();
        params
            .into_iter()
            .rev()
            .fold(body, |child, param| Expr::lambda(param, child))
    }

    // "abc" => Cons 'a' (Cons 'b' (Cons 'c' Nil))
    pub fn string(text: &str) -> Expr {
        text.chars().rev().fold(Expr::constructor(NIL), |tail, c| {
            Expr::apply(Expr::apply(Expr::constructor(CONS), Expr::Char(c)), tail)
        })
    }

    pub fn if_then_else(cond: Expr, texpr: Expr, fexpr: Expr) -> Expr {
        Expr::case(
            cond,
            vec![
                CaseBranch::new(TRUE, Vec::<String>::new(), texpr),
                CaseBranch::new(FALSE, Vec::<String>::new(), fexpr),
            ],
        )
    }

    pub fn to_json(&self) -> Json {
        match self {
            Expr::Var(name) => json!(["ExprVar", name]),
            Expr::Constructor(name) => json!(["ExprConstructor", name]),
            Expr::Number(n) => json!(["ExprNumber", n]),
            Expr::Char(c) => json!(["ExprChar", u32::from(*c)]),
            Expr::Lambda { param, body } => json!(["ExprLambda", param, body.to_json()]),
            Expr::Apply { fun, arg } => json!(["ExprApply", fun.to_json(), arg.to_json()]),
            Expr::Let { name, value, body } => json!(["ExprLet", name, value.to_json(), body.to_json()]),
            Expr::Case { scrutinee, branches } => json!([
                "ExprCase",
                scrutinee.to_json(),
                branches.iter().map(CaseBranch::to_json).collect::<Vec<_>>()
            ]),
        }
    }
}

macro_rules! impl_display_as_json {
    ( $( $node:ty ),* ) => {
        $(
            impl Display for $node {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.to_json())
                }
            }
        )*
    };
}

impl_display_as_json!(Program, Definition, CaseBranch, Expr);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_serialization() {
        let cases = vec![
            (Program::default().to_string(), r#"[]"#),
            (
                Definition::new("a", Expr::Number(1)).to_string(),
                r#"["Def","a",["ExprNumber",1]]"#,
            ),
            (Expr::var("v").to_string(), r#"["ExprVar","v"]"#),
            (Expr::constructor("Mk").to_string(), r#"["ExprConstructor","Mk"]"#),
            (Expr::Char('\u{16}').to_string(), r#"["ExprChar",22]"#),
            (
                Expr::case(
                    Expr::var("ls"),
                    vec![CaseBranch::new(NIL, Vec::<String>::new(), Expr::Number(1))],
                )
                .to_string(),
                r#"["ExprCase",["ExprVar","ls"],[["CaseBranch","Nil",[],["ExprNumber",1]]]]"#,
            ),
            (
                Expr::let_in("x", Expr::var("y"), Expr::var("z")).to_string(),
                r#"["ExprLet","x",["ExprVar","y"],["ExprVar","z"]]"#,
            ),
            (
                Expr::lambda("f", Expr::Number(1)).to_string(),
                r#"["ExprLambda","f",["ExprNumber",1]]"#,
            ),
            (
                Expr::apply(Expr::var("fn"), Expr::Number(1)).to_string(),
                r#"["ExprApply",["ExprVar","fn"],["ExprNumber",1]]"#,
            ),
        ];

        for (actual, expected) in cases {
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn program_is_a_bare_array_of_definitions() {
        let program = Program::new(vec![
            Definition::new("a", Expr::Number(1)),
            Definition::new("b", Expr::Number(2)),
        ]);
        assert_eq!(
            program.to_string(),
            r#"[["Def","a",["ExprNumber",1]],["Def","b",["ExprNumber",2]]]"#
        );
    }

    #[test]
    fn string_desugaring() {
        assert_eq!(Expr::string(""), Expr::constructor(NIL));
        assert_eq!(
            Expr::string("ab"),
            Expr::apply(
                Expr::apply(Expr::constructor(CONS), Expr::Char('a')),
                Expr::apply(
                    Expr::apply(Expr::constructor(CONS), Expr::Char('b')),
                    Expr::constructor(NIL),
                ),
            )
        );
    }

    #[test]
    fn currying() {
        assert_eq!(
            Expr::curry(["x", "y"], Expr::Number(1)),
            Expr::lambda("x", Expr::lambda("y", Expr::Number(1)))
        );
        assert_eq!(Expr::curry(Vec::<String>::new(), Expr::Number(1)), Expr::Number(1));
        assert_ne!(Expr::constructor(NIL), Expr::constructor(CONS));
    }
}
