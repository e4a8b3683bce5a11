// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{cell::RefCell, collections::{HashMap, HashSet}, rc::Rc};

use quantum::QString;

use crate::{RuntimeError, Value};

/// One link of the lexical environment chain. Cloning shares the link, so
/// closures keep the scopes they were created in alive.
#[derive(Clone, Default)]
pub struct Scope {
    inner: Rc<RefCell<ScopeData>>,
}

#[derive(Default)]
struct ScopeData {
    parent: Option<Scope>,
    variables: HashMap<QString, Value>,
    constants: HashSet<QString>,

    /// Function bodies and modules. Plain assignment to an unknown name
    /// lands in the nearest of these.
    is_function: bool,
}

impl Scope {
    #[must_use]
    pub fn new_top_level() -> Self {
        Self::with_parent(None, true)
    }

    fn with_parent(parent: Option<Scope>, is_function: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ScopeData {
                parent,
                variables: HashMap::new(),
                constants: HashSet::new(),
                is_function,
            })),
        }
    }

    /// A child scope for a block.
    #[must_use]
    pub fn push(&self) -> Self {
        Self::with_parent(Some(self.clone()), false)
    }

    /// A child scope for a function call or module body.
    #[must_use]
    pub fn push_function(&self) -> Self {
        Self::with_parent(Some(self.clone()), true)
    }

    /// Creates or overwrites a binding in this scope only. A constant
    /// cannot be declared again in the scope that owns it.
    pub fn define(&self, name: impl Into<QString>, value: Value, is_const: bool) -> Result<(), RuntimeError> {
        let name = name.into();
        let mut data = self.inner.borrow_mut();

        if data.constants.contains(&name) {
            return Err(RuntimeError::runtime(format!("cannot redeclare constant `{name}`")));
        }

        if is_const {
            data.constants.insert(name.clone());
        }

        data.variables.insert(name, value);
        Ok(())
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<Value> {
        let mut scope = self.clone();
        loop {
            let parent = {
                let data = scope.inner.borrow();
                if let Some(value) = data.variables.get(name) {
                    return Some(value.clone());
                }
                data.parent.clone()?
            };
            scope = parent;
        }
    }

    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        self.find(name).ok_or_else(|| RuntimeError::undefined(name))
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Overwrites the nearest binding of `name`.
    pub fn set(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let mut scope = self.clone();
        loop {
            let parent = {
                let mut data = scope.inner.borrow_mut();
                if data.variables.contains_key(name) {
                    if data.constants.contains(name) {
                        return Err(RuntimeError::runtime(format!("cannot assign to constant `{name}`")));
                    }

                    data.variables.insert(name.into(), value);
                    return Ok(());
                }

                data.parent.clone()
            };

            match parent {
                Some(parent) => scope = parent,
                None => return Err(RuntimeError::undefined(name)),
            }
        }
    }

    /// Plain `name = value`: updates an existing binding, or creates one in
    /// the nearest function scope.
    pub fn assign(&self, name: &QString, value: Value) -> Result<(), RuntimeError> {
        if self.has(name) {
            return self.set(name, value);
        }

        self.function_scope().define(name.clone(), value, false)
    }

    fn function_scope(&self) -> Scope {
        let mut scope = self.clone();
        loop {
            let parent = {
                let data = scope.inner.borrow();
                if data.is_function {
                    break;
                }
                data.parent.clone()
            };

            match parent {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        scope
    }

    /// Bindings of this scope alone, sorted by name.
    #[must_use]
    pub fn variables(&self) -> Vec<(QString, Value)> {
        let data = self.inner.borrow();
        let mut variables: Vec<_> = data.variables.iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        variables.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));
        variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn lookup_walks_outwards() {
        let globals = Scope::new_top_level();
        globals.define("x", Value::Number(1.0), false).unwrap();

        let block = globals.push().push();
        assert_eq!(block.get("x").unwrap(), Value::Number(1.0));
        assert!(!block.has("y"));
    }

    #[test]
    fn define_shadows_the_outer_binding() {
        let globals = Scope::new_top_level();
        globals.define("x", Value::Number(1.0), false).unwrap();

        let inner = globals.push_function();
        inner.define("x", Value::Number(2.0), false).unwrap();

        assert_eq!(inner.get("x").unwrap(), Value::Number(2.0));
        assert_eq!(globals.get("x").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn set_updates_the_nearest_binding() {
        let globals = Scope::new_top_level();
        globals.define("x", Value::Number(1.0), false).unwrap();

        globals.push().set("x", Value::Number(3.0)).unwrap();
        assert_eq!(globals.get("x").unwrap(), Value::Number(3.0));
    }

    #[rstest]
    #[case("missing", ErrorKind::NameError)]
    #[case("limit", ErrorKind::RuntimeError)]
    fn set_failures(#[case] name: &str, #[case] kind: ErrorKind) {
        let globals = Scope::new_top_level();
        globals.define("limit", Value::Number(5.0), true).unwrap();

        let error = globals.push().set(name, Value::Nil).unwrap_err();
        assert_eq!(error.kind, kind);
        assert_eq!(globals.get("limit").unwrap(), Value::Number(5.0));
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn constants_cannot_be_redeclared(#[case] is_const: bool) {
        let globals = Scope::new_top_level();
        globals.define("limit", Value::Number(5.0), true).unwrap();

        let error = globals.define("limit", Value::Number(6.0), is_const).unwrap_err();
        assert_eq!(error.kind, ErrorKind::RuntimeError);
        assert_eq!(error.message, "cannot redeclare constant `limit`");

        let error = globals.set("limit", Value::Number(7.0)).unwrap_err();
        assert_eq!(error.kind, ErrorKind::RuntimeError);
        assert_eq!(globals.get("limit").unwrap(), Value::Number(5.0));
    }

    #[test]
    fn constants_can_be_shadowed_in_an_inner_scope() {
        let globals = Scope::new_top_level();
        globals.define("limit", Value::Number(5.0), true).unwrap();

        let inner = globals.push_function();
        inner.define("limit", Value::Number(6.0), false).unwrap();
        inner.set("limit", Value::Number(7.0)).unwrap();

        assert_eq!(inner.get("limit").unwrap(), Value::Number(7.0));
        assert_eq!(globals.get("limit").unwrap(), Value::Number(5.0));
    }

    #[test]
    fn assignment_to_unknown_names_lands_in_the_function_scope() {
        let globals = Scope::new_top_level();
        let function = globals.push_function();
        let block = function.push().push();

        block.assign(&"result".into(), Value::Bool(true)).unwrap();

        assert!(function.variables().iter().any(|(name, _)| name == "result"));
        assert!(!globals.has("result"));
        assert!(block.has("result"));
    }
}
