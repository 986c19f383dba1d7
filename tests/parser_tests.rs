use flecha::{
    ast::{CONS, NIL, OP_ADD, OP_LT, OP_MUL},
    parse_expression_source, parse_program_source, CaseBranch, Definition, Expr, ErrorKind, Program,
};

fn program(source: &str) -> Program {
    parse_program_source(source).unwrap_or_else(|e| panic!("failed to parse {:?}: {}", source, e))
}

fn expression(source: &str) -> Expr {
    parse_expression_source(source).unwrap_or_else(|e| panic!("failed to parse {:?}: {}", source, e))
}

#[test]
fn parameters_become_curried_lambdas() {
    let expected = Program::new(vec![Definition::new("a", Expr::lambda("b", Expr::Number(1)))]);
    assert_eq!(program("def a b = 1"), expected);
}

#[test]
fn empty_source_is_an_empty_program() {
    assert_eq!(program(""), Program::default());
    assert_eq!(program("  -- only a comment\n\n"), Program::default());
    assert_eq!(program("").to_string(), "[]");
}

#[test]
fn string_literals() {
    assert_eq!(expression(r#""""#), Expr::constructor(NIL));
    assert_eq!(
        expression(r#""a""#),
        Expr::apply(
            Expr::apply(Expr::constructor(CONS), Expr::Char('a')),
            Expr::constructor(NIL)
        )
    );
}

#[test]
fn canonical_form_of_a_program() {
    let source = "def f x = case x | Nil -> 0 | Cons y ys -> y + 1";
    assert_eq!(
        program(source).to_string(),
        concat!(
            r#"[["Def","f",["ExprLambda","x",["ExprCase",["ExprVar","x"],["#,
            r#"["CaseBranch","Nil",[],["ExprNumber",0]],"#,
            r#"["CaseBranch","Cons",["y","ys"],["ExprApply",["ExprApply",["ExprVar","ADD"],["ExprVar","y"]],["ExprNumber",1]]]"#,
            r#"]]]]]"#,
        )
    );
}

#[test]
fn canonical_form_of_literals() {
    assert_eq!(expression("'\\n'").to_string(), r#"["ExprChar",10]"#);
    assert_eq!(expression("Leaf").to_string(), r#"["ExprConstructor","Leaf"]"#);
    assert_eq!(
        expression("let x = 1 in x").to_string(),
        r#"["ExprLet","x",["ExprNumber",1],["ExprVar","x"]]"#
    );
}

#[test]
fn operators_and_application() {
    // f x + 2 * y < 10
    let expected = Expr::binary(
        OP_LT,
        Expr::binary(
            OP_ADD,
            Expr::apply(Expr::var("f"), Expr::var("x")),
            Expr::binary(OP_MUL, Expr::Number(2), Expr::var("y")),
        ),
        Expr::Number(10),
    );
    assert_eq!(expression("f x + 2 * y < 10"), expected);
}

#[test]
fn elif_chains_nest_in_the_false_branch() {
    let expected = Expr::case(
        Expr::var("a"),
        vec![
            CaseBranch::new("True", Vec::<String>::new(), Expr::Number(1)),
            CaseBranch::new(
                "False",
                Vec::<String>::new(),
                Expr::if_then_else(Expr::var("b"), Expr::Number(2), Expr::Number(3)),
            ),
        ],
    );
    assert_eq!(expression("if a then 1 elif b then 2 else 3"), expected);
}

#[test]
fn definitions_keep_source_order() {
    let parsed = program("def x = 1\ndef y = 2\ndef x = 3");
    let names: Vec<&str> = parsed.definitions.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["x", "y", "x"]);
}

#[test]
fn syntax_errors() {
    let sources = [
        "def = 1",
        "def f x",
        "def main = (1 + 2",
        "def main = 1 == 2 == 3",
        "def main = case x | cons -> 1",
        "def main = if a then b",
        "main = 1",
    ];

    for source in sources {
        match parse_program_source(source) {
            Ok(parsed) => panic!("{:?} parsed as {}", source, parsed),
            Err(e) => assert!(e.kind.is_syntax(), "{:?} failed with {}", source, e),
        }
    }
}

#[test]
fn syntax_error_reports_line() {
    let err = parse_program_source("def main =\n  1 +\n  )").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Syntax { .. }));
    assert_eq!(err.location.map(|l| l.line), Some(3));
}
