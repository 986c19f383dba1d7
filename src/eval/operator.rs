use std::io::Write;

use log::trace;

use crate::{
    ast::*,
    error::{Error, ErrorKind, Result},
};

use super::{env::LocalEnv, value::Value, Interpreter};

pub const PRINT_INT: &str = "unsafePrintInt";
pub const PRINT_CHAR: &str = "unsafePrintChar";

// Names that take exactly one argument and are handled by the interpreter
const UNARY_NAMES: [&str; 4] = [PRINT_INT, PRINT_CHAR, OP_NOT, OP_UMINUS];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn from_tag(tag: &str) -> Option<BinaryOp> {
        use BinaryOp::*;

        let op = match tag {
            OP_AND => And,
            OP_OR => Or,
            OP_EQ => Eq,
            OP_NE => Ne,
            OP_GE => Ge,
            OP_LE => Le,
            OP_GT => Gt,
            OP_LT => Lt,
            OP_ADD => Add,
            OP_SUB => Sub,
            OP_MUL => Mul,
            OP_DIV => Div,
            OP_MOD => Mod,
            _ => return None,
        };
        Some(op)
    }

    pub fn tag(self) -> &'static str {
        use BinaryOp::*;

        match self {
            And => OP_AND,
            Or => OP_OR,
            Eq => OP_EQ,
            Ne => OP_NE,
            Ge => OP_GE,
            Le => OP_LE,
            Gt => OP_GT,
            Lt => OP_LT,
            Add => OP_ADD,
            Sub => OP_SUB,
            Mul => OP_MUL,
            Div => OP_DIV,
            Mod => OP_MOD,
        }
    }

    // Relational and arithmetic operators, both operands already evaluated
    fn apply_numeric(self, a: i64, b: i64) -> Result<Value> {
        use BinaryOp::*;

        let overflow = || arithmetic_error(format!("{} {} {} overflows", self.tag(), a, b));

        let value = match self {
            Eq => Value::bool(a == b),
            Ne => Value::bool(a != b),
            Ge => Value::bool(a >= b),
            Le => Value::bool(a <= b),
            Gt => Value::bool(a > b),
            Lt => Value::bool(a < b),
            Add => Value::Int(a.checked_add(b).ok_or_else(overflow)?),
            Sub => Value::Int(a.checked_sub(b).ok_or_else(overflow)?),
            Mul => Value::Int(a.checked_mul(b).ok_or_else(overflow)?),
            Div => Value::Int(floor_div_mod(a, b)?.0),
            Mod => Value::Int(floor_div_mod(a, b)?.1),
            And | Or => return Err(Error::runtime(ErrorKind::UnknownOperator(String::from(self.tag())))),
        };
        Ok(value)
    }
}

fn arithmetic_error(message: String) -> Error {
    Error::runtime(ErrorKind::Arithmetic(message))
}

// Quotient rounds towards negative infinity, so the remainder takes the sign of
// the divisor: q * b + r == a.
pub fn floor_div_mod(a: i64, b: i64) -> Result<(i64, i64)> {
    if b == 0 {
        return Err(arithmetic_error(format!("division of {} by zero", a)));
    }

    let overflow = || arithmetic_error(format!("{} / {} overflows", a, b));
    let quotient = a.checked_div(b).ok_or_else(overflow)?;
    let remainder = a.checked_rem(b).ok_or_else(overflow)?;

    if remainder != 0 && (remainder < 0) != (b < 0) {
        Ok((quotient - 1, remainder + b))
    } else {
        Ok((quotient, remainder))
    }
}

// Walk the application spine down to its head. If the head is a constructor,
// return it with the arguments in application order.
fn constructor_spine<'e>(fun: &'e Expr, arg: &'e Expr) -> Option<(&'e str, Vec<&'e Expr>)> {
    let mut args = vec![arg];
    let mut head = fun;
    while let Expr::Apply { fun, arg } = head {
        args.push(arg.as_ref());
        head = fun.as_ref();
    }

    match head {
        Expr::Constructor(name) => {
            args.reverse();
            Some((name.as_str(), args))
        }
        _ => None,
    }
}

impl<W: Write> Interpreter<W> {
    // Applications carry no tag saying whether they are a primitive, an
    // operator, a constructor or a call, so recognise them by shape. First
    // match wins.
    pub fn evaluate_apply(&mut self, fun: &Expr, arg: &Expr, env: &LocalEnv) -> Result<Value> {
        if let Expr::Var(name) = fun {
            if UNARY_NAMES.contains(&name.as_str()) {
                trace!("unary {}", name);
                let value = self.evaluate(arg, env)?;
                return self.apply_unary(name, value);
            }
        }

        if let Expr::Apply { fun: op, arg: left } = fun {
            if let Expr::Var(tag) = op.as_ref() {
                if let Some(op) = BinaryOp::from_tag(tag) {
                    trace!("binary {}", tag);
                    return self.apply_binary(op, left, arg, env);
                }
            }
        }

        if let Some((constructor, args)) = constructor_spine(fun, arg) {
            trace!("constructor {}/{}", constructor, args.len());
            let values = args
                .into_iter()
                .map(|arg| self.evaluate(arg, env))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Value::structure(constructor, values));
        }

        let argument = self.evaluate(arg, env)?;
        let function = self.evaluate(fun, env)?;
        self.apply_closure(function, argument)
    }

    fn apply_unary(&mut self, name: &str, value: Value) -> Result<Value> {
        match name {
            PRINT_INT => match value {
                Value::Int(n) => {
                    write!(self.out, "{}", n)?;
                    Ok(Value::Void)
                }
                other => Err(Error::type_mismatch("integer", other)),
            },
            PRINT_CHAR => match value {
                Value::Char(c) => {
                    write!(self.out, "{}", c)?;
                    Ok(Value::Void)
                }
                other => Err(Error::type_mismatch("character", other)),
            },
            OP_NOT => match value.as_bool() {
                Some(b) => Ok(Value::bool(!b)),
                None => Err(Error::type_mismatch("boolean", value)),
            },
            OP_UMINUS => match value {
                Value::Int(n) => n
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| arithmetic_error(format!("negating {} overflows", n))),
                other => Err(Error::type_mismatch("integer", other)),
            },
            other => Err(Error::runtime(ErrorKind::UnknownOperator(String::from(other)))),
        }
    }

    fn apply_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, env: &LocalEnv) -> Result<Value> {
        match op {
            // Short-circuiting: the right operand is only evaluated when the
            // left one does not decide the result
            BinaryOp::And | BinaryOp::Or => {
                let left = self.evaluate(left, env)?;
                let truthy = left
                    .as_bool()
                    .ok_or_else(|| Error::type_mismatch("boolean operand", &left))?;

                match (op, truthy) {
                    (BinaryOp::And, false) => Ok(Value::bool(false)),
                    (BinaryOp::Or, true) => Ok(Value::bool(true)),
                    _ => self.evaluate(right, env),
                }
            }
            _ => {
                let left = self.evaluate(left, env)?;
                let right = self.evaluate(right, env)?;
                match (left, right) {
                    (Value::Int(a), Value::Int(b)) => op.apply_numeric(a, b),
                    (Value::Int(_), other) | (other, _) => Err(Error::type_mismatch("numeric operands", other)),
                }
            }
        }
    }
}
