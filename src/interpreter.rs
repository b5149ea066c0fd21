// ABOUTME: Tree-walking evaluator: executes statements and evaluates expressions

use crate::ast::{Expr, Stmt};
use crate::callable::{LoxFunction, NativeFunction};
use crate::env::Environment;
use crate::error::{Reporter, RuntimeError, Unwind};
use crate::token::{Token, TokenType};
use crate::value::Value;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

pub struct Interpreter {
    pub globals: Rc<Environment>,
    environment: Rc<Environment>,
    writer: Rc<RefCell<dyn io::Write>>,
    reporter: Rc<Reporter>,
}

impl Interpreter {
    pub fn new(writer: Rc<RefCell<dyn io::Write>>, reporter: Rc<Reporter>) -> Self {
        let globals = Environment::new();
        globals.define(
            "clock".to_string(),
            Value::Callable(Rc::new(NativeFunction::clock())),
        );

        Interpreter {
            globals: globals.clone(),
            environment: globals,
            writer,
            reporter,
        }
    }

    /// Creates an interpreter that writes `print` output to standard output.
    pub fn with_stdout(reporter: Rc<Reporter>) -> Self {
        Interpreter::new(Rc::new(RefCell::new(io::stdout())), reporter)
    }

    /// Executes a program, aborting and reporting on the first runtime
    /// error. A `return` escaping every enclosing function call would be a
    /// parser/interpreter bug, not a user-triggerable error, so it panics.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}
                Err(Unwind::Error(err)) => {
                    self.reporter.runtime_error(&err);
                    return;
                }
                Err(Unwind::Return(_)) => {
                    unreachable!("`return` must not escape every enclosing function call")
                }
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.writer.borrow_mut(), "{value}")
                    .expect("writing to the print sink must not fail");
                Ok(())
            }
            Stmt::Let { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::Block(statements) => {
                let child = Environment::with_parent(self.environment.clone());
                self.execute_block(statements, child)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
            Stmt::Function(declaration) => {
                let function = LoxFunction::new(declaration.clone(), self.environment.clone());
                self.environment.define(
                    declaration.name.lexeme.clone(),
                    Value::Callable(Rc::new(function)),
                );
                Ok(())
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Err(Unwind::Return(value))
            }
        }
    }

    /// Runs `statements` inside `environment`, restoring the previous
    /// `current` environment on every exit path — normal completion, an
    /// in-flight `Return`, or a runtime error.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<Environment>,
    ) -> Result<(), Unwind> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = statements.iter().try_for_each(|stmt| self.execute(stmt));
        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, Unwind> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Variable(name) => Ok(self.environment.get(name)?),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Unary { operator, operand } => self.eval_unary(operator, operand),
            Expr::Binary {
                left,
                operator,
                right,
            } => self.eval_binary(left, operator, right),
            Expr::Logical {
                left,
                operator,
                right,
            } => self.eval_logical(left, operator, right),
            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.eval_call(callee, paren, arguments),
        }
    }

    fn eval_unary(&mut self, operator: &Token, operand: &Expr) -> Result<Value, Unwind> {
        let value = self.evaluate(operand)?;
        match operator.kind {
            TokenType::Bang => Ok(Value::Bool(!value.is_truthy())),
            TokenType::Minus => {
                let n = number_operand(operator, &value)?;
                Ok(Value::Number(-n))
            }
            _ => unreachable!("unary operator must be '!' or '-'"),
        }
    }

    fn eval_binary(
        &mut self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> Result<Value, Unwind> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        use TokenType::*;
        let value = match operator.kind {
            Minus => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Number(a - b)
            }
            Star => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Number(a * b)
            }
            Slash => {
                let (a, b) = number_operands(operator, &left, &right)?;
                if b == 0.0 {
                    return Err(RuntimeError::new(operator, "Division by zero.").into());
                }
                Value::Number(a / b)
            }
            Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
                (Value::Str(a), Value::Str(b)) => Value::Str(format!("{a}{b}")),
                (Value::Str(a), Value::Number(b)) => {
                    Value::Str(format!("{a}{}", Value::Number(*b)))
                }
                (Value::Number(a), Value::Str(b)) => {
                    Value::Str(format!("{}{b}", Value::Number(*a)))
                }
                _ => {
                    return Err(RuntimeError::new(
                        operator,
                        "Operands must be two numbers or two strings.",
                    )
                    .into())
                }
            },
            Greater => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Bool(a > b)
            }
            GreaterEqual => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Bool(a >= b)
            }
            Less => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Bool(a < b)
            }
            LessEqual => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Bool(a <= b)
            }
            EqualEqual => Value::Bool(left.is_equal(&right)),
            BangEqual => Value::Bool(!left.is_equal(&right)),
            _ => unreachable!("unexpected binary operator {:?}", operator.kind),
        };
        Ok(value)
    }

    fn eval_logical(
        &mut self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> Result<Value, Unwind> {
        let left = self.evaluate(left)?;
        match operator.kind {
            TokenType::Or if left.is_truthy() => Ok(left),
            TokenType::Or => self.evaluate(right),
            TokenType::And if !left.is_truthy() => Ok(left),
            TokenType::And => self.evaluate(right),
            _ => unreachable!("logical operator must be 'and' or 'or'"),
        }
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        paren: &Token,
        arg_exprs: &[Expr],
    ) -> Result<Value, Unwind> {
        let callee = self.evaluate(callee)?;

        let mut arguments = Vec::with_capacity(arg_exprs.len());
        for arg in arg_exprs {
            arguments.push(self.evaluate(arg)?);
        }

        let Value::Callable(callable) = callee else {
            return Err(
                RuntimeError::new(paren, "Can only call functions and classes.").into(),
            );
        };

        if arguments.len() != callable.arity() {
            return Err(RuntimeError::new(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    arguments.len()
                ),
            )
            .into());
        }

        callable.call(self, arguments)
    }
}

fn number_operand(operator: &Token, value: &Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(RuntimeError::new(operator, "Operand must be a number.")),
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::new(operator, "Operands must be numbers.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn run_capturing(source: &str) -> (String, bool) {
        let reporter = Rc::new(Reporter::new());
        let tokens = Scanner::new(source, &reporter).scan_tokens();
        let statements = Parser::new(tokens, &reporter).parse();
        let output = Rc::new(RefCell::new(Vec::new()));
        let mut interpreter = Interpreter::new(output.clone(), reporter.clone());
        interpreter.interpret(&statements);
        let text = String::from_utf8(output.borrow().clone()).unwrap();
        (text, reporter.had_runtime_error())
    }

    #[test]
    fn arithmetic_precedence() {
        let (out, had_err) = run_capturing("print 1 + 2 * 3;");
        assert_eq!(out, "7\n");
        assert!(!had_err);
    }

    #[test]
    fn string_concatenation() {
        let (out, _) = run_capturing(r#"let a = "hi"; print a + " " + "there";"#);
        assert_eq!(out, "hi there\n");
    }

    #[test]
    fn recursive_function_call() {
        let (out, _) = run_capturing(
            "function fact(n){ if (n<=1) return 1; return n*fact(n-1); } print fact(5);",
        );
        assert_eq!(out, "120\n");
    }

    #[test]
    fn closures_capture_independent_state() {
        let (out, _) = run_capturing(
            "function mk(){ let c=0; function i(){ c=c+1; return c; } return i; }
             let k=mk(); print k(); print k(); print k();",
        );
        assert_eq!(out, "1\n2\n3\n");
    }

    #[test]
    fn two_closures_from_the_same_maker_are_independent() {
        let (out, _) = run_capturing(
            "function mk(){ let c=0; function i(){ c=c+1; return c; } return i; }
             let a=mk(); let b=mk();
             print a(); print a(); print b();",
        );
        assert_eq!(out, "1\n2\n1\n");
    }

    #[test]
    fn for_loop_matches_desugared_while() {
        let (for_out, _) = run_capturing("for (let i=0; i<3; i=i+1) print i;");
        let (while_out, _) = run_capturing(
            "let i=0; while (i<3) { print i; i=i+1; }",
        );
        assert_eq!(for_out, while_out);
        assert_eq!(for_out, "0\n1\n2\n");
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let (out, had_err) = run_capturing("print 1/0;");
        assert_eq!(out, "");
        assert!(had_err);
    }

    #[test]
    fn block_scope_does_not_leak() {
        let (out, _) = run_capturing(
            "let x = 1; { let x = 2; print x; } print x;",
        );
        assert_eq!(out, "2\n1\n");
    }

    #[test]
    fn short_circuit_or_returns_left_value() {
        let (out, _) = run_capturing(r#"print 1 or 2;"#);
        assert_eq!(out, "1\n");
    }

    #[test]
    fn short_circuit_and_returns_left_falsy_value() {
        let (out, _) = run_capturing("print nil and 2;");
        assert_eq!(out, "nil\n");
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        let (out, had_err) = run_capturing("print undefined_name;");
        assert_eq!(out, "");
        assert!(had_err);
    }

    #[test]
    fn calling_a_non_callable_is_a_runtime_error() {
        let (_, had_err) = run_capturing("let x = 1; x();");
        assert!(had_err);
    }

    #[test]
    fn arity_mismatch_is_a_runtime_error() {
        let (_, had_err) = run_capturing("function f(a,b){ return a+b; } f(1);");
        assert!(had_err);
    }

    #[test]
    fn runtime_error_aborts_remaining_statements() {
        let (out, _) = run_capturing("print 1/0; print 2;");
        assert_eq!(out, "");
    }
}
