use std::io::Write;

use log::debug;

use crate::{
    ast::{Definition, Program},
    error::{Error, ErrorKind, Result},
};

mod env;
mod expr;
mod operator;
mod pattern;
mod value;

pub use env::{GlobalEnv, LocalEnv};
pub use operator::{floor_div_mod, BinaryOp, PRINT_CHAR, PRINT_INT};
pub use pattern::match_branch;
pub use value::{Closure, Struct, Value};

pub const MAIN: &str = "main";

// Tree-walking interpreter. Owns the global scope of one program run and the
// sink that the printing primitives append to.
pub struct Interpreter<W: Write> {
    globals: GlobalEnv,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Interpreter<W> {
        Interpreter {
            globals: GlobalEnv::default(),
            out,
        }
    }

    pub fn globals(&self) -> &GlobalEnv {
        &self.globals
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    // Bind every definition in order, then return the value bound to main.
    // Definitions are evaluated eagerly, so main's side effects happen while it
    // is being bound.
    pub fn evaluate_program(&mut self, program: &Program, env: &LocalEnv) -> Result<Value> {
        for definition in &program.definitions {
            self.evaluate_definition(definition, env)?;
        }

        self.globals
            .lookup(MAIN)
            .cloned()
            .ok_or_else(|| Error::runtime(ErrorKind::UnboundName(String::from(MAIN))))
    }

    pub fn evaluate_definition(&mut self, definition: &Definition, env: &LocalEnv) -> Result<Value> {
        let value = self.evaluate(&definition.body, env)?;
        debug!("bound '{}' to {}", definition.name, value);
        self.globals.assign(definition.name.clone(), value);
        Ok(Value::Void)
    }

    pub fn run(&mut self, program: &Program) -> Result<Value> {
        let value = self.evaluate_program(program, &LocalEnv::new())?;
        self.out.flush()?;
        Ok(value)
    }
}

pub fn run<W: Write>(program: &Program, out: W) -> Result<Value> {
    Interpreter::new(out).run(program)
}
