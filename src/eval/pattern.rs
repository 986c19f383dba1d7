use std::io::Write;

use crate::{
    ast::{CaseBranch, Expr},
    error::{Error, ErrorKind, Result},
};

use super::{env::LocalEnv, value::Value, Interpreter};

// Scope for the branch body if the branch matches. Structs match on constructor
// name and arity and bind the branch parameters to their fields. Any other
// value matches a branch named after its tag (`Int`, `Char`, ...) and binds
// nothing.
pub fn match_branch(value: &Value, branch: &CaseBranch, env: &LocalEnv) -> Option<LocalEnv> {
    match value {
        Value::Struct(s) => {
            if s.constructor != branch.constructor || s.args.len() != branch.params.len() {
                return None;
            }

            let extended = branch
                .params
                .iter()
                .zip(s.args.iter())
                .fold(env.clone(), |env, (param, arg)| env.extend(param.clone(), arg.clone()));
            Some(extended)
        }
        // TODO: compare literal values once case supports number and character patterns
        other => (other.tag_name() == branch.constructor).then(|| env.clone()),
    }
}

impl<W: Write> Interpreter<W> {
    pub fn evaluate_case(&mut self, scrutinee: &Expr, branches: &[CaseBranch], env: &LocalEnv) -> Result<Value> {
        let value = self.evaluate(scrutinee, env)?;

        for branch in branches {
            if let Some(branch_env) = match_branch(&value, branch, env) {
                return self.evaluate(&branch.body, &branch_env);
            }
        }

        Err(Error::runtime(ErrorKind::NonExhaustiveMatch(value.to_string())))
    }
}
