// ABOUTME: Environment module for managing variable bindings and scopes

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS scope unconditionally (doesn't walk the
    /// parent chain). Redefining the same name in the same scope silently
    /// overwrites it.
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up a name in this scope, then recursively in parent scopes.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(parent) = &self.parent {
            return parent.get(name);
        }

        Err(RuntimeError::new(
            name,
            format!("Undefined variable '{}'.", name.lexeme),
        ))
    }

    /// Overwrites an existing binding, searching this scope then parents,
    /// and mutating the innermost scope where the name is already defined.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(&name.lexeme) {
            self.bindings
                .borrow_mut()
                .insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(parent) = &self.parent {
            return parent.assign(name, value);
        }

        Err(RuntimeError::new(
            name,
            format!("Undefined variable '{}'.", name.lexeme),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, TokenType};

    fn ident(name: &str) -> Token {
        Token::new(TokenType::Identifier, name, Literal::None, 1)
    }

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x".to_string(), Value::Number(42.0));

        match env.get(&ident("x")) {
            Ok(Value::Number(n)) => assert_eq!(n, 42.0),
            other => panic!("expected Number(42.0), got {other:?}"),
        }
    }

    #[test]
    fn undefined_variable_reports_exact_message() {
        let env = Environment::new();
        let err = env.get(&ident("missing")).unwrap_err();
        assert_eq!(err.message, "Undefined variable 'missing'.");
    }

    #[test]
    fn inner_scope_shadows_outer_without_mutating_it() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(42.0));

        let child = Environment::with_parent(parent.clone());
        child.define("x".to_string(), Value::Number(100.0));

        assert_eq!(child.get(&ident("x")).unwrap().to_string(), "100");
        assert_eq!(parent.get(&ident("x")).unwrap().to_string(), "42");
    }

    #[test]
    fn child_sees_parent_bindings() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(42.0));
        let child = Environment::with_parent(parent);

        assert_eq!(child.get(&ident("x")).unwrap().to_string(), "42");
    }

    #[test]
    fn assign_overwrites_innermost_occurrence() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(1.0));
        let child = Environment::with_parent(parent.clone());

        child.assign(&ident("x"), Value::Number(2.0)).unwrap();

        // x was only ever defined in the parent scope, so assignment walked
        // up and overwrote it there.
        assert_eq!(parent.get(&ident("x")).unwrap().to_string(), "2");
    }

    #[test]
    fn assign_to_undefined_name_is_a_runtime_error() {
        let env = Environment::new();
        let err = env.assign(&ident("ghost"), Value::Nil).unwrap_err();
        assert_eq!(err.message, "Undefined variable 'ghost'.");
    }

    #[test]
    fn multiple_levels_of_nesting_all_resolve() {
        let grandparent = Environment::new();
        grandparent.define("a".to_string(), Value::Number(1.0));

        let parent = Environment::with_parent(grandparent);
        parent.define("b".to_string(), Value::Number(2.0));

        let child = Environment::with_parent(parent);
        child.define("c".to_string(), Value::Number(3.0));

        assert_eq!(child.get(&ident("a")).unwrap().to_string(), "1");
        assert_eq!(child.get(&ident("b")).unwrap().to_string(), "2");
        assert_eq!(child.get(&ident("c")).unwrap().to_string(), "3");
    }
}
