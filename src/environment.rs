use std::collections::HashMap;

use crate::interpreter::Value;
use crate::parser::Name;

/// The single flat namespace of one run. There is no scoping: every
/// assignment anywhere in the program writes here.
#[derive(Debug, Default)]
pub struct Environment {
    vars: HashMap<Name, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &Name) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set(&mut self, name: Name, value: Value) {
        self.vars.insert(name, value);
    }

    pub fn remove(&mut self, name: &Name) -> Option<Value> {
        self.vars.remove(name)
    }
}

/// Append-only record of everything `Print`/`Display` produced.
#[derive(Debug, Default)]
pub struct OutputLog(Vec<Value>);

impl OutputLog {
    pub fn push(&mut self, value: Value) {
        self.0.push(value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}
