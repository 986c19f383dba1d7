use std::{io::Write, rc::Rc};

use crate::{
    ast::Expr,
    error::{Error, ErrorKind, Result},
};

use super::{
    env::LocalEnv,
    value::{Closure, Value},
    Interpreter,
};

// Grow the stack once less than this much is left
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

impl<W: Write> Interpreter<W> {
    // Local scope first, then the top-level definitions
    pub fn lookup(&self, name: &str, env: &LocalEnv) -> Result<Value> {
        env.lookup(name)
            .or_else(|| self.globals.lookup(name))
            .cloned()
            .ok_or_else(|| Error::runtime(ErrorKind::UnboundName(String::from(name))))
    }

    pub fn evaluate(&mut self, expr: &Expr, env: &LocalEnv) -> Result<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.evaluate_inner(expr, env))
    }

    fn evaluate_inner(&mut self, expr: &Expr, env: &LocalEnv) -> Result<Value> {
        match expr {
            Expr::Var(name) => self.lookup(name, env),

            Expr::Constructor(name) => Ok(Value::structure(name.clone(), Vec::new())),

            Expr::Number(n) => Ok(Value::Int(*n)),

            Expr::Char(c) => Ok(Value::Char(*c)),

            Expr::Lambda { param, body } => Ok(Value::Closure(Rc::new(Closure {
                param: param.clone(),
                body: Rc::clone(body),
                env: env.clone(),
            }))),

            // Not recursive, the bound expression can't see its own name
            Expr::Let { name, value, body } => {
                let bound = self.evaluate(value, env)?;
                self.evaluate(body, &env.extend(name.clone(), bound))
            }

            Expr::Apply { fun, arg } => self.evaluate_apply(fun, arg, env),

            Expr::Case { scrutinee, branches } => self.evaluate_case(scrutinee, branches, env),
        }
    }

    // Call a closure: its body sees the captured scope, never the caller's
    pub fn apply_closure(&mut self, fun: Value, arg: Value) -> Result<Value> {
        match fun {
            Value::Closure(closure) => {
                let env = closure.env.extend(closure.param.clone(), arg);
                self.evaluate(&closure.body, &env)
            }
            other => Err(Error::runtime(ErrorKind::NotAFunction(other.to_string()))),
        }
    }
}
