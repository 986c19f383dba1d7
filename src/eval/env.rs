use std::collections::HashMap;

use super::value::Value;

// Persistent local scope. Extending returns a new scope sharing structure with
// the old one, so closures can hold on to their scope without copying it and a
// later binding of the same name shadows the earlier one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalEnv(im::HashMap<String, Value>);

impl LocalEnv {
    pub fn new() -> LocalEnv {
        LocalEnv(im::HashMap::new())
    }

    pub fn extend(&self, name: impl Into<String>, value: Value) -> LocalEnv {
        LocalEnv(self.0.update(name.into(), value))
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

// Top-level definitions of one program run, last definition of a name wins
#[derive(Debug, Default)]
pub struct GlobalEnv(HashMap<String, Value>);

impl GlobalEnv {
    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extending_shadows_without_mutating() {
        let outer = LocalEnv::new().extend("x", Value::Int(1));
        let inner = outer.extend("x", Value::Int(2)).extend("y", Value::Int(3));

        assert_eq!(inner.lookup("x"), Some(&Value::Int(2)));
        assert_eq!(inner.lookup("y"), Some(&Value::Int(3)));
        assert_eq!(outer.lookup("x"), Some(&Value::Int(1)));
        assert_eq!(outer.lookup("y"), None);
    }

    #[test]
    fn last_global_assignment_wins() {
        let mut globals = GlobalEnv::default();
        globals.assign("a", Value::Int(1));
        globals.assign("a", Value::Int(2));
        assert_eq!(globals.lookup("a"), Some(&Value::Int(2)));
        assert_eq!(globals.lookup("b"), None);
    }
}
