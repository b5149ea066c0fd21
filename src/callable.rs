// ABOUTME: The callable contract shared by native built-ins and user-defined functions

use crate::ast::FunctionDecl;
use crate::env::Environment;
use crate::error::{RuntimeError, Unwind};
use crate::interpreter::Interpreter;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Polymorphic callable capability set: arity, call, and a display form for
/// printing a function value. Native built-ins and user-defined functions
/// both implement this so the interpreter's `Call` handling doesn't need to
/// branch on which kind of callable it has.
pub trait Callable: fmt::Display {
    fn arity(&self) -> usize;
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, Unwind>;
}

/// A built-in function implemented in Rust. The only one seeded at
/// construction is `clock`.
pub struct NativeFunction {
    name: &'static str,
    arity: usize,
    func: fn(&[Value]) -> Result<Value, RuntimeError>,
}

impl NativeFunction {
    pub fn new(
        name: &'static str,
        arity: usize,
        func: fn(&[Value]) -> Result<Value, RuntimeError>,
    ) -> Self {
        NativeFunction { name, arity, func }
    }

    pub fn clock() -> Self {
        NativeFunction::new("clock", 0, |_args| {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("system clock is before the Unix epoch");
            Ok(Value::Number(now.as_secs_f64()))
        })
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, _interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, Unwind> {
        Ok((self.func)(&arguments)?)
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

/// A user-defined function: the declaration node plus the environment that
/// was active when the `function` statement ran (its closure).
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Rc<Environment>,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: Rc<Environment>) -> Self {
        LoxFunction {
            declaration,
            closure,
        }
    }
}

impl Callable for LoxFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, Unwind> {
        // The new frame's parent is the closure captured at declaration
        // time, NOT the caller's current environment.
        let call_env = Environment::with_parent(self.closure.clone());
        for (param, arg) in self.declaration.params.iter().zip(arguments) {
            call_env.define(param.lexeme.clone(), arg);
        }

        match interpreter.execute_block(&self.declaration.body, call_env) {
            Ok(()) => Ok(Value::Nil),
            Err(Unwind::Return(value)) => Ok(value),
            Err(err @ Unwind::Error(_)) => Err(err),
        }
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_takes_no_arguments_and_returns_a_number() {
        let clock = NativeFunction::clock();
        assert_eq!(clock.arity(), 0);
    }

    #[test]
    fn native_function_display() {
        let clock = NativeFunction::clock();
        assert_eq!(clock.to_string(), "<native fn clock>");
    }
}
