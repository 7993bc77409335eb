//! Ordered variable table and `%{name}` token expansion.

use crate::script::Variable;

/// Variables in first-definition order.
///
/// Redefining a name keeps its original position and replaces the value, so
/// expansion order never changes once a name is known.
#[derive(Debug, Default, Clone)]
pub struct VariableTable {
    variables: Vec<Variable>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `value` against the table as it currently stands, stores the
    /// result under `name` and returns the resolved value.
    pub fn define(&mut self, name: &str, value: &str) -> &str {
        let resolved = self.resolve(value);
        let index = match self.variables.iter().position(|v| v.name == name) {
            Some(index) => {
                self.variables[index].value = resolved;
                index
            }
            None => {
                self.variables.push(Variable {
                    name: name.to_string(),
                    value: resolved,
                });
                self.variables.len() - 1
            }
        };
        &self.variables[index].value
    }

    /// Substitutes each known variable's token once, in table order.
    pub fn resolve(&self, text: &str) -> String {
        let mut resolved = text.to_string();
        for variable in &self.variables {
            let token = token(&variable.name);
            if resolved.contains(&token) {
                resolved = resolved.replace(&token, &variable.value);
            }
        }
        resolved
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }
}

/// The reference token for a variable name.
pub fn token(name: &str) -> String {
    format!("%{{{name}}}")
}
