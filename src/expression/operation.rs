use crate::error::EvalError;
use crate::expression::{Bindings, Operand};
use std::fmt;
use std::sync::Arc;

pub type UnaryCallback =
    Arc<dyn Fn(&mut Bindings, Operand) -> Result<f64, EvalError> + Send + Sync>;
pub type BinaryCallback =
    Arc<dyn Fn(&mut Bindings, Operand, Operand) -> Result<f64, EvalError> + Send + Sync>;
pub type FunctionCallback = Arc<dyn Fn(&[f64]) -> Result<f64, EvalError> + Send + Sync>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Binary,
    Prefix,
    Postfix,
    Function,
    OpenBracket,
    CloseBracket,
}

impl OperationKind {
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            OperationKind::Binary | OperationKind::Prefix | OperationKind::Postfix
        )
    }

    pub fn is_bracket(&self) -> bool {
        matches!(self, OperationKind::OpenBracket | OperationKind::CloseBracket)
    }
}

/// An entry of the [`crate::expression::Registry`]: one recognised spelling
/// and the action it performs on the operand stack.
#[derive(Clone)]
pub enum Operation {
    Binary {
        name: String,
        priority: i32,
        associativity: Associativity,
        callback: BinaryCallback,
    },
    Prefix {
        name: String,
        priority: i32,
        callback: UnaryCallback,
    },
    Postfix {
        name: String,
        callback: UnaryCallback,
    },
    Function {
        name: String,
        arity: usize,
        callback: FunctionCallback,
    },
    OpenBracket {
        name: String,
        transform: Option<UnaryCallback>,
    },
    CloseBracket {
        name: String,
        pare: String,
    },
}

impl Operation {
    /// Left-associative binary operator over plain values.
    pub fn binary<F>(name: impl Into<String>, priority: i32, op: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self::binary_with(name, priority, Associativity::Left, pure_binary(op))
    }

    /// Right-associative binary operator over plain values.
    pub fn binary_right<F>(name: impl Into<String>, priority: i32, op: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self::binary_with(name, priority, Associativity::Right, pure_binary(op))
    }

    /// Binary operator with access to the operands themselves, e.g. to
    /// assign to a variable.
    pub fn binary_with<F>(
        name: impl Into<String>,
        priority: i32,
        associativity: Associativity,
        callback: F,
    ) -> Self
    where
        F: Fn(&mut Bindings, Operand, Operand) -> Result<f64, EvalError> + Send + Sync + 'static,
    {
        Operation::Binary {
            name: name.into(),
            priority,
            associativity,
            callback: Arc::new(callback),
        }
    }

    pub fn prefix<F>(name: impl Into<String>, priority: i32, op: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::prefix_with(name, priority, pure_unary(op))
    }

    pub fn prefix_with<F>(name: impl Into<String>, priority: i32, callback: F) -> Self
    where
        F: Fn(&mut Bindings, Operand) -> Result<f64, EvalError> + Send + Sync + 'static,
    {
        Operation::Prefix {
            name: name.into(),
            priority,
            callback: Arc::new(callback),
        }
    }

    pub fn postfix<F>(name: impl Into<String>, op: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::postfix_with(name, pure_unary(op))
    }

    pub fn postfix_with<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut Bindings, Operand) -> Result<f64, EvalError> + Send + Sync + 'static,
    {
        Operation::Postfix {
            name: name.into(),
            callback: Arc::new(callback),
        }
    }

    /// Function taking exactly `arity` arguments, passed in call order.
    pub fn function<F>(name: impl Into<String>, arity: usize, callback: F) -> Self
    where
        F: Fn(&[f64]) -> Result<f64, EvalError> + Send + Sync + 'static,
    {
        Operation::Function {
            name: name.into(),
            arity,
            callback: Arc::new(callback),
        }
    }

    /// Grouping bracket that passes its content through unchanged.
    pub fn open_bracket(name: impl Into<String>) -> Self {
        Operation::OpenBracket {
            name: name.into(),
            transform: None,
        }
    }

    /// Grouping bracket that transforms its content when closed.
    pub fn open_bracket_with<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&mut Bindings, Operand) -> Result<f64, EvalError> + Send + Sync + 'static,
    {
        Operation::OpenBracket {
            name: name.into(),
            transform: Some(Arc::new(transform)),
        }
    }

    /// Closing bracket that matches the open bracket spelled `pare`.
    pub fn close_bracket(name: impl Into<String>, pare: impl Into<String>) -> Self {
        Operation::CloseBracket {
            name: name.into(),
            pare: pare.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Operation::Binary { name, .. }
            | Operation::Prefix { name, .. }
            | Operation::Postfix { name, .. }
            | Operation::Function { name, .. }
            | Operation::OpenBracket { name, .. }
            | Operation::CloseBracket { name, .. } => name,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Binary { .. } => OperationKind::Binary,
            Operation::Prefix { .. } => OperationKind::Prefix,
            Operation::Postfix { .. } => OperationKind::Postfix,
            Operation::Function { .. } => OperationKind::Function,
            Operation::OpenBracket { .. } => OperationKind::OpenBracket,
            Operation::CloseBracket { .. } => OperationKind::CloseBracket,
        }
    }

    pub fn priority(&self) -> Option<i32> {
        match self {
            Operation::Binary { priority, .. } | Operation::Prefix { priority, .. } => {
                Some(*priority)
            }
            _ => None,
        }
    }

    pub fn associativity(&self) -> Option<Associativity> {
        match self {
            Operation::Binary { associativity, .. } => Some(*associativity),
            _ => None,
        }
    }

    pub fn arity(&self) -> Option<usize> {
        match self {
            Operation::Function { arity, .. } => Some(*arity),
            _ => None,
        }
    }

    pub fn pare(&self) -> Option<&str> {
        match self {
            Operation::CloseBracket { pare, .. } => Some(pare),
            _ => None,
        }
    }

    /// Executes the operation against the operand stack, replacing its
    /// inputs with a single literal result.
    pub fn apply(&self, operands: &mut Vec<Operand>, bindings: &mut Bindings) -> Result<(), EvalError> {
        match self {
            Operation::Binary { callback, .. } => {
                self.ensure_operands(operands, 2)?;
                let (right, left) = (pop(operands)?, pop(operands)?);
                let result = callback(bindings, left, right)?;
                operands.push(Operand::Literal(result));
            }
            Operation::Prefix { callback, .. } | Operation::Postfix { callback, .. } => {
                self.ensure_operands(operands, 1)?;
                let operand = pop(operands)?;
                let result = callback(bindings, operand)?;
                operands.push(Operand::Literal(result));
            }
            Operation::Function {
                arity, callback, ..
            } => {
                self.ensure_operands(operands, *arity)?;
                let args = operands
                    .split_off(operands.len() - arity)
                    .into_iter()
                    .map(|operand| bindings.value(operand))
                    .collect::<Result<Vec<f64>, EvalError>>()?;
                let result = callback(&args)?;
                operands.push(Operand::Literal(result));
            }
            Operation::OpenBracket { transform, .. } => {
                self.ensure_operands(operands, 1)?;
                if let Some(transform) = transform {
                    let operand = pop(operands)?;
                    let result = transform(bindings, operand)?;
                    operands.push(Operand::Literal(result));
                }
            }
            Operation::CloseBracket { .. } => {}
        }
        Ok(())
    }

    fn ensure_operands(&self, operands: &[Operand], expected: usize) -> Result<(), EvalError> {
        if operands.len() < expected {
            return Err(EvalError::InsufficientOperands {
                operation: self.name().to_string(),
                expected,
                found: operands.len(),
            });
        }
        Ok(())
    }
}

fn pop(operands: &mut Vec<Operand>) -> Result<Operand, EvalError> {
    operands.pop().ok_or(EvalError::MalformedExpression)
}

fn pure_binary<F>(op: F) -> impl Fn(&mut Bindings, Operand, Operand) -> Result<f64, EvalError>
where
    F: Fn(f64, f64) -> f64,
{
    move |bindings, left, right| Ok(op(bindings.value(left)?, bindings.value(right)?))
}

fn pure_unary<F>(op: F) -> impl Fn(&mut Bindings, Operand) -> Result<f64, EvalError>
where
    F: Fn(f64) -> f64,
{
    move |bindings, operand| Ok(op(bindings.value(operand)?))
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Binary {
                name,
                priority,
                associativity,
                ..
            } => f
                .debug_struct("Binary")
                .field("name", name)
                .field("priority", priority)
                .field("associativity", associativity)
                .finish_non_exhaustive(),
            Operation::Prefix { name, priority, .. } => f
                .debug_struct("Prefix")
                .field("name", name)
                .field("priority", priority)
                .finish_non_exhaustive(),
            Operation::Postfix { name, .. } => f
                .debug_struct("Postfix")
                .field("name", name)
                .finish_non_exhaustive(),
            Operation::Function { name, arity, .. } => f
                .debug_struct("Function")
                .field("name", name)
                .field("arity", arity)
                .finish_non_exhaustive(),
            Operation::OpenBracket { name, transform } => f
                .debug_struct("OpenBracket")
                .field("name", name)
                .field("transform", &transform.is_some())
                .finish(),
            Operation::CloseBracket { name, pare } => f
                .debug_struct("CloseBracket")
                .field("name", name)
                .field("pare", pare)
                .finish(),
        }
    }
}
