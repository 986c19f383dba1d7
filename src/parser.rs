use std::collections::VecDeque;

use log::debug;

use crate::{
    ast::*,
    error::{Error, ErrorKind, Result},
    lexer::{SpannedToken, Token},
    location::Location,
};

// Binding powers of operators. Left associative operators need higher right
// precedence; non-associative operators may not be chained at the same level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Precedence {
    Prefix(u8),
    Infix(u8, u8),
    NonAssoc(u8, u8),
}

impl Precedence {
    fn prefix(prec: u8) -> Precedence {
        Precedence::Prefix(prec * 2)
    }

    fn infl(prec: u8) -> Precedence {
        Precedence::Infix(prec * 2, prec * 2 + 1)
    }

    fn nonassoc(prec: u8) -> Precedence {
        Precedence::NonAssoc(prec * 2, prec * 2 + 1)
    }

    fn power(self) -> u8 {
        match self {
            Precedence::Prefix(power) => power,
            Precedence::Infix(left, _) | Precedence::NonAssoc(left, _) => left,
        }
    }
}

// Lowest to highest: || && ! relational + - * / % unary-minus
fn binary_operator(token: &Token) -> Option<(&'static str, Precedence)> {
    let operator = match token {
        Token::Or => (OP_OR, Precedence::infl(1)),
        Token::And => (OP_AND, Precedence::infl(2)),
        Token::Eq => (OP_EQ, Precedence::nonassoc(4)),
        Token::Ne => (OP_NE, Precedence::nonassoc(4)),
        Token::Ge => (OP_GE, Precedence::nonassoc(4)),
        Token::Le => (OP_LE, Precedence::nonassoc(4)),
        Token::Gt => (OP_GT, Precedence::nonassoc(4)),
        Token::Lt => (OP_LT, Precedence::nonassoc(4)),
        Token::Plus => (OP_ADD, Precedence::infl(5)),
        Token::Minus => (OP_SUB, Precedence::infl(5)),
        Token::Times => (OP_MUL, Precedence::infl(6)),
        Token::Div => (OP_DIV, Precedence::infl(7)),
        Token::Mod => (OP_MOD, Precedence::infl(7)),
        _ => return None,
    };
    Some(operator)
}

fn prefix_operator(token: &Token) -> Option<(&'static str, Precedence)> {
    match token {
        Token::Not => Some((OP_NOT, Precedence::prefix(3))),
        Token::Minus => Some((OP_UMINUS, Precedence::prefix(8))),
        _ => None,
    }
}

fn starts_atom(token: &Token) -> bool {
    matches!(
        token,
        Token::LowerId(_)
            | Token::UpperId(_)
            | Token::Number(_)
            | Token::Char(_)
            | Token::String(_)
            | Token::LeftParen
    )
}

pub struct Parser {
    tokens: VecDeque<SpannedToken>,
    // Location right after the last consumed token, reported when input ends early
    end: Location,
}

impl Parser {
    pub fn new(tokens: impl IntoIterator<Item = SpannedToken>) -> Parser {
        Parser {
            tokens: tokens.into_iter().collect(),
            end: Location::new(0..0, 1),
        }
    }

    // Error pointing at the current token, or at the end of input
    fn error<T>(&self, expected: &str) -> Result<T> {
        let kind_and_location = match self.tokens.front() {
            Some(current) => (
                ErrorKind::Syntax {
                    found: current.token.to_string(),
                    expected: String::from(expected),
                },
                Location::new(current.span.clone(), current.line),
            ),
            None => (
                ErrorKind::UnexpectedEnd {
                    expected: String::from(expected),
                },
                self.end.clone(),
            ),
        };
        Err(Error::new(kind_and_location.0, kind_and_location.1))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.front().map(|t| &t.token)
    }

    fn next(&mut self) -> Option<SpannedToken> {
        let result = self.tokens.pop_front()?;
        self.end = Location::new(result.span.end..result.span.end, result.line);
        Some(result)
    }

    fn at(&self, expected: &Token) -> bool {
        self.peek()
            .is_some_and(|current| std::mem::discriminant(current) == std::mem::discriminant(expected))
    }

    // Consume specific token variant
    fn expect(&mut self, expected: Token) -> Result<Token> {
        if self.at(&expected) {
            // at() guarantees a token is present
            Ok(self.next().map(|t| t.token).unwrap_or(expected))
        } else {
            self.error(&expected.to_string())
        }
    }

    fn expect_lower_id(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::LowerId(ident)) => {
                let ident = ident.clone();
                self.next();
                Ok(ident)
            }
            _ => self.error("lowercase identifier"),
        }
    }

    fn expect_upper_id(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::UpperId(ident)) => {
                let ident = ident.clone();
                self.next();
                Ok(ident)
            }
            _ => self.error("constructor"),
        }
    }

    // Zero or more lowercase identifiers
    fn parse_params(&mut self) -> Vec<String> {
        let mut params = Vec::new();
        while let Some(Token::LowerId(param)) = self.peek() {
            params.push(param.clone());
            self.next();
        }
        params
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        let expr = match self.peek() {
            Some(Token::LowerId(ident)) => Expr::var(ident.clone()),
            Some(Token::UpperId(ident)) => Expr::constructor(ident.clone()),
            Some(Token::Number(n)) => Expr::Number(*n),
            Some(Token::Char(c)) => Expr::Char(*c),
            Some(Token::String(s)) => Expr::string(s),
            Some(Token::LeftParen) => {
                self.next();
                let expr = self.parse_expr()?;
                self.expect(Token::RightParen)?;
                return Ok(expr);
            }
            _ => return self.error("expression"),
        };
        self.next();
        Ok(expr)
    }

    // Application is left associative: f a b => (f a) b
    fn parse_application(&mut self) -> Result<Expr> {
        let mut result = self.parse_atom()?;
        while self.peek().is_some_and(starts_atom) {
            let arg = self.parse_atom()?;
            result = Expr::apply(result, arg);
        }
        Ok(result)
    }

    // Operator expressions, parsed by binding power
    fn parse_inner(&mut self, min_power: u8) -> Result<Expr> {
        let mut lhs = match self.peek().and_then(prefix_operator) {
            Some((op, precedence)) => {
                self.next();
                let operand = self.parse_inner(precedence.power())?;
                Expr::unary(op, operand)
            }
            None => self.parse_application()?,
        };

        let mut after_non_assoc = false;
        while let Some((op, precedence)) = self.peek().and_then(binary_operator) {
            if precedence.power() < min_power {
                break;
            }

            let (right_power, non_assoc) = match precedence {
                Precedence::Infix(_, right) => (right, false),
                Precedence::NonAssoc(_, right) => (right, true),
                Precedence::Prefix(power) => (power, false),
            };
            if non_assoc && after_non_assoc {
                return self.error("end of comparison");
            }

            self.next();
            let rhs = self.parse_inner(right_power)?;
            lhs = Expr::binary(op, lhs, rhs);
            after_non_assoc = non_assoc;
        }

        Ok(lhs)
    }

    // if c then t (elif c then t)* else f
    fn parse_if(&mut self) -> Result<Expr> {
        self.expect(Token::KwIf)?;
        self.parse_conditional()
    }

    fn parse_conditional(&mut self) -> Result<Expr> {
        let cond = self.parse_inner(0)?;
        self.expect(Token::KwThen)?;
        let texpr = self.parse_inner(0)?;

        let fexpr = match self.peek() {
            Some(Token::KwElif) => {
                self.next();
                self.parse_conditional()?
            }
            Some(Token::KwElse) => {
                self.next();
                self.parse_inner(0)?
            }
            _ => return self.error("'elif' or 'else'"),
        };

        Ok(Expr::if_then_else(cond, texpr, fexpr))
    }

    fn parse_case(&mut self) -> Result<Expr> {
        self.expect(Token::KwCase)?;
        let scrutinee = self.parse_inner(0)?;

        let mut branches = Vec::new();
        while self.at(&Token::Pipe) {
            self.next();
            let constructor = self.expect_upper_id()?;
            let params = self.parse_params();
            self.expect(Token::Arrow)?;
            let body = self.parse_inner(0)?;
            branches.push(CaseBranch {
                constructor,
                params,
                body,
            });
        }

        Ok(Expr::case(scrutinee, branches))
    }

    // let f x y = e in body, the bound expression is curried like a definition
    fn parse_let(&mut self) -> Result<Expr> {
        self.expect(Token::KwLet)?;
        let name = self.expect_lower_id()?;
        let params = self.parse_params();
        self.expect(Token::DefEq)?;
        let value = self.parse_inner(0)?;
        self.expect(Token::KwIn)?;
        let body = self.parse_outer()?;

        Ok(Expr::let_in(name, Expr::curry(params, value), body))
    }

    fn parse_lambda(&mut self) -> Result<Expr> {
        self.expect(Token::Backslash)?;
        let params = self.parse_params();
        self.expect(Token::Arrow)?;
        let body = self.parse_outer()?;

        Ok(Expr::curry(params, body))
    }

    fn parse_outer(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::KwIf) => self.parse_if(),
            Some(Token::KwCase) => self.parse_case(),
            Some(Token::KwLet) => self.parse_let(),
            Some(Token::Backslash) => self.parse_lambda(),
            _ => self.parse_inner(0),
        }
    }

    // Sequencing is right associative and binds loosest: a; b; c => a; (b; c)
    pub fn parse_expr(&mut self) -> Result<Expr> {
        let first = self.parse_outer()?;
        if self.at(&Token::Semicolon) {
            self.next();
            let rest = self.parse_expr()?;
            Ok(Expr::sequence(first, rest))
        } else {
            Ok(first)
        }
    }

    // Parse and desugar top-level definition into curried lambdas
    fn parse_definition(&mut self) -> Result<Definition> {
        self.expect(Token::KwDef)?;
        let name = self.expect_lower_id()?;
        let params = self.parse_params();
        self.expect(Token::DefEq)?;
        let body = self.parse_expr()?;

        debug!("parsed definition '{}'", name);
        Ok(Definition::new(name, Expr::curry(params, body)))
    }

    pub fn parse_program(&mut self) -> Result<Program> {
        let mut definitions = Vec::new();
        while self.peek().is_some() {
            definitions.push(self.parse_definition()?);
        }
        Ok(Program::new(definitions))
    }

    pub fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => self.error("end of input"),
        }
    }
}

pub fn parse(tokens: impl IntoIterator<Item = SpannedToken>) -> Result<Program> {
    Parser::new(tokens).parse_program()
}

// Parse a single expression that must span the whole token stream
pub fn parse_expression(tokens: impl IntoIterator<Item = SpannedToken>) -> Result<Expr> {
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    parser.expect_end()?;
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn expr(source: &str) -> Expr {
        parse_expression(tokenize(source).0).unwrap()
    }

    fn syntax_error(source: &str) -> Error {
        parse(tokenize(source).0).unwrap_err()
    }

    fn var(name: &str) -> Expr {
        Expr::var(name)
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        assert_eq!(
            expr("1 + 2 * 3"),
            Expr::binary(OP_ADD, Expr::Number(1), Expr::binary(OP_MUL, Expr::Number(2), Expr::Number(3)))
        );
    }

    #[test]
    fn division_binds_tighter_than_multiplication() {
        assert_eq!(
            expr("a * b / c"),
            Expr::binary(OP_MUL, var("a"), Expr::binary(OP_DIV, var("b"), var("c")))
        );
    }

    #[test]
    fn arithmetic_is_left_associative() {
        assert_eq!(
            expr("a - b - c"),
            Expr::binary(OP_SUB, Expr::binary(OP_SUB, var("a"), var("b")), var("c"))
        );
    }

    #[test]
    fn unary_minus_binds_tightest_but_not_over_application() {
        assert_eq!(
            expr("-a * b"),
            Expr::binary(OP_MUL, Expr::unary(OP_UMINUS, var("a")), var("b"))
        );
        assert_eq!(
            expr("- f x"),
            Expr::unary(OP_UMINUS, Expr::apply(var("f"), var("x")))
        );
        assert_eq!(
            expr("a - -b"),
            Expr::binary(OP_SUB, var("a"), Expr::unary(OP_UMINUS, var("b")))
        );
    }

    #[test]
    fn not_binds_looser_than_comparison() {
        assert_eq!(
            expr("!a == b && c"),
            Expr::binary(
                OP_AND,
                Expr::unary(OP_NOT, Expr::binary(OP_EQ, var("a"), var("b"))),
                var("c")
            )
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(
            expr("a || b && c"),
            Expr::binary(OP_OR, var("a"), Expr::binary(OP_AND, var("b"), var("c")))
        );
    }

    #[test]
    fn application_is_left_nested() {
        assert_eq!(
            expr("f x (g y) 'c'"),
            Expr::apply(
                Expr::apply(Expr::apply(var("f"), var("x")), Expr::apply(var("g"), var("y"))),
                Expr::Char('c')
            )
        );
    }

    #[test]
    fn comparisons_do_not_chain() {
        let err = syntax_error("def a = 1 == 2 == 3");
        assert!(err.kind.is_syntax());
        assert_eq!(expr("(1 == 2) == b"), Expr::binary(
            OP_EQ,
            Expr::binary(OP_EQ, Expr::Number(1), Expr::Number(2)),
            var("b")
        ));
    }

    #[test]
    fn sequencing_is_right_associative() {
        assert_eq!(
            expr("a; b; c"),
            Expr::sequence(var("a"), Expr::sequence(var("b"), var("c")))
        );
    }

    #[test]
    fn elif_chain_nests_in_false_branch() {
        assert_eq!(
            expr("if a then 1 elif b then 2 else 3"),
            Expr::if_then_else(
                var("a"),
                Expr::Number(1),
                Expr::if_then_else(var("b"), Expr::Number(2), Expr::Number(3))
            )
        );
    }

    #[test]
    fn case_branches() {
        assert_eq!(
            expr("case xs | Nil -> 0 | Cons y ys -> y"),
            Expr::case(
                var("xs"),
                vec![
                    CaseBranch::new(NIL, Vec::<String>::new(), Expr::Number(0)),
                    CaseBranch::new(CONS, ["y", "ys"], var("y")),
                ]
            )
        );
    }

    #[test]
    fn let_and_lambda_parameters_are_curried() {
        assert_eq!(
            expr("let f x y = x in \\a b -> f a b"),
            Expr::let_in(
                "f",
                Expr::lambda("x", Expr::lambda("y", var("x"))),
                Expr::lambda(
                    "a",
                    Expr::lambda("b", Expr::apply(Expr::apply(var("f"), var("a")), var("b")))
                )
            )
        );
    }

    #[test]
    fn lambda_body_does_not_swallow_sequencing() {
        assert_eq!(
            expr("\\x -> x; y"),
            Expr::sequence(Expr::lambda("x", var("x")), var("y"))
        );
    }

    #[test]
    fn definitions_are_curried() {
        assert_eq!(
            parse(tokenize("def a b = 1").0).unwrap(),
            Program::new(vec![Definition::new("a", Expr::lambda("b", Expr::Number(1)))])
        );
        assert_eq!(parse(tokenize("").0).unwrap(), Program::default());
    }

    #[test]
    fn syntax_errors_report_token_and_line() {
        let err = syntax_error("def a = 1\ndef b = )");
        match err.kind {
            ErrorKind::Syntax { found, .. } => assert_eq!(found, "')'"),
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(err.location.unwrap().line, 2);

        let err = syntax_error("def a =");
        assert!(matches!(err.kind, ErrorKind::UnexpectedEnd { .. }));

        let err = syntax_error("def a = if x then y");
        assert!(err.kind.is_syntax());
    }
}
