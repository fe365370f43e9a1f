use crate::error::{EvalError, LexError};
use crate::expression::{
    tokenize, Associativity, Bindings, Operand, Operation, OperationKind, Registry, Token,
    TokenKind, VariableStore, CALL_CLOSE, CALL_OPEN,
};
use log::{debug, trace};

/// What the previously processed token turned out to be. Decides whether
/// an operator spelling is read as prefix, binary or postfix.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Element {
    Literal,
    Variable,
    Prefix,
    Postfix,
    Binary,
    Function,
    OpenBracket,
    CloseBracket,
    ArgSeparator,
    CallOpen,
    CallClose,
}

impl Element {
    /// An operand must come next. A closing call parenthesis completes an
    /// operand, so it is not listed here and `f(x) - 1` stays binary.
    fn expects_operand(self) -> bool {
        matches!(
            self,
            Element::Binary
                | Element::ArgSeparator
                | Element::OpenBracket
                | Element::Prefix
                | Element::CallOpen
        )
    }

    /// An operand has just been completed.
    fn completes_operand(self) -> bool {
        matches!(
            self,
            Element::CloseBracket
                | Element::Literal
                | Element::Postfix
                | Element::CallClose
                | Element::Variable
        )
    }
}

/// Shunting-yard evaluator over a [`Registry`], persisting variables in a
/// [`VariableStore`].
pub struct Evaluator<'a> {
    registry: &'a Registry,
    store: &'a VariableStore,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a Registry, store: &'a VariableStore) -> Self {
        Self { registry, store }
    }

    /// Tokenizes and evaluates `expression`.
    ///
    /// Variables touched by the expression are written back to the store
    /// only if the whole evaluation succeeds.
    pub fn evaluate(&self, expression: &str) -> Result<f64, EvalError> {
        debug!("Evaluating expression: {}", expression);
        let tokens = tokenize(self.registry, expression)?;
        self.evaluate_tokens(&tokens)
    }

    /// Evaluates an already tokenized expression.
    pub fn evaluate_tokens(&self, tokens: &[Token]) -> Result<f64, EvalError> {
        let mut run = Run::new(self.registry, self.store);
        for (index, token) in tokens.iter().enumerate() {
            trace!(
                "Token {:?} {:?} after {:?}",
                token.kind(),
                token.text(),
                run.previous
            );
            run.previous = run.process(index, token, tokens.get(index + 1))?;
        }

        let (value, bindings) = run.finish()?;
        self.store.commit(&bindings);
        debug!("Result: {} ({} bindings committed)", value, bindings.len());
        Ok(value)
    }
}

/// An operation waiting on the stack, with the operand height when it was
/// pushed. Calls and grouping brackets only see operands above `base`.
#[derive(Clone, Copy)]
struct Frame<'a> {
    operation: &'a Operation,
    base: usize,
}

/// State of a single evaluation.
struct Run<'a> {
    registry: &'a Registry,
    store: &'a VariableStore,
    operands: Vec<Operand>,
    operations: Vec<Frame<'a>>,
    bindings: Bindings,
    previous: Element,
}

impl<'a> Run<'a> {
    fn new(registry: &'a Registry, store: &'a VariableStore) -> Self {
        Self {
            registry,
            store,
            operands: Vec::new(),
            operations: Vec::new(),
            bindings: Bindings::new(),
            previous: Element::Binary,
        }
    }

    fn process(
        &mut self,
        index: usize,
        token: &Token,
        next: Option<&Token>,
    ) -> Result<Element, EvalError> {
        if self.previous.completes_operand() && starts_operand(self.registry, token) {
            return Err(EvalError::MalformedExpression);
        }

        match token.kind() {
            TokenKind::ArgSeparator => {
                self.unwind_argument()?;
                Ok(Element::ArgSeparator)
            }
            TokenKind::Literal => {
                let value = token.text().parse::<f64>().map_err(|_| {
                    LexError::MalformedLiteral {
                        position: index,
                        text: token.text().to_string(),
                    }
                })?;
                self.operands.push(Operand::Literal(value));
                Ok(Element::Literal)
            }
            TokenKind::Function => {
                let opens_call = next.is_some_and(|next| next.is_char(CALL_OPEN));
                if !opens_call {
                    return Err(EvalError::MissingCall(token.text().to_string()));
                }
                let function = self
                    .registry
                    .lookup_function(token.text())
                    .ok_or_else(|| EvalError::UnknownOperator(token.text().to_string()))?;
                self.push(function);
                Ok(Element::Function)
            }
            TokenKind::Bracket => self.process_bracket(token),
            TokenKind::Operator => self.process_operator(token),
            TokenKind::Variable => {
                let id = self.bindings.resolve(token.text(), self.store);
                self.operands.push(Operand::Variable(id));
                Ok(Element::Variable)
            }
        }
    }

    fn process_bracket(&mut self, token: &Token) -> Result<Element, EvalError> {
        if token.is_char(CALL_OPEN) && self.previous == Element::Function {
            return Ok(Element::CallOpen);
        }

        let mut pare = None;
        match self.registry.lookup_bracket(token.text()) {
            Some(bracket) => match bracket {
                Operation::OpenBracket { .. } => {
                    self.push(bracket);
                    return Ok(Element::OpenBracket);
                }
                Operation::CloseBracket { pare: open, .. } => pare = Some(open.as_str()),
                _ => {}
            },
            None if token.is_char(CALL_OPEN) => {
                return Err(EvalError::MismatchedBracket(token.text().to_string()));
            }
            None => {}
        }

        let closes_call = token.is_char(CALL_CLOSE);
        while let Some(top) = self.top() {
            match top {
                Operation::Function { .. } if closes_call => {
                    self.pop_and_apply()?;
                    return Ok(Element::CallClose);
                }
                Operation::OpenBracket { name, .. } if Some(name.as_str()) == pare => {
                    self.pop_and_apply()?;
                    return Ok(Element::CloseBracket);
                }
                Operation::OpenBracket { .. } | Operation::Function { .. } => {
                    return Err(EvalError::MismatchedBracket(top.name().to_string()));
                }
                _ => self.pop_and_apply()?,
            }
        }
        Err(EvalError::MismatchedBracket(token.text().to_string()))
    }

    fn process_operator(&mut self, token: &Token) -> Result<Element, EvalError> {
        let name = token.text();

        if self.previous.expects_operand() {
            if let Some(prefix) = self.registry.lookup_operator(name, OperationKind::Prefix) {
                self.push(prefix);
                return Ok(Element::Prefix);
            }
        }

        if self.previous.completes_operand() {
            if let Some(binary) = self.registry.lookup_operator(name, OperationKind::Binary) {
                while let Some(top) = self.top() {
                    if !fires_before(top, binary) {
                        break;
                    }
                    self.pop_and_apply()?;
                }
                self.push(binary);
                return Ok(Element::Binary);
            }

            if let Some(postfix) = self.registry.lookup_operator(name, OperationKind::Postfix) {
                postfix.apply(&mut self.operands, &mut self.bindings)?;
                return Ok(Element::Postfix);
            }
        }

        Err(EvalError::UnknownOperator(name.to_string()))
    }

    /// Completes the current function argument. A separator may not reach
    /// across an open grouping bracket.
    fn unwind_argument(&mut self) -> Result<(), EvalError> {
        loop {
            match self.top().map(Operation::kind) {
                None | Some(OperationKind::OpenBracket) => {
                    return Err(EvalError::UnexpectedSeparator)
                }
                Some(OperationKind::Function) => return Ok(()),
                Some(_) => self.pop_and_apply()?,
            }
        }
    }

    fn push(&mut self, operation: &'a Operation) {
        self.operations.push(Frame {
            operation,
            base: self.operands.len(),
        });
    }

    fn top(&self) -> Option<&'a Operation> {
        self.operations.last().map(|frame| frame.operation)
    }

    fn pop_and_apply(&mut self) -> Result<(), EvalError> {
        let Some(Frame { operation, base }) = self.operations.pop() else {
            return Ok(());
        };

        let scoped = match operation {
            Operation::Function { arity, .. } => Some(*arity),
            Operation::OpenBracket { .. } => Some(1),
            _ => None,
        };
        if let Some(expected) = scoped {
            let found = self.operands.len().saturating_sub(base);
            if found < expected {
                return Err(EvalError::InsufficientOperands {
                    operation: operation.name().to_string(),
                    expected,
                    found,
                });
            }
            if found > expected {
                return Err(EvalError::MalformedExpression);
            }
        }

        operation.apply(&mut self.operands, &mut self.bindings)
    }

    fn finish(mut self) -> Result<(f64, Bindings), EvalError> {
        while let Some(top) = self.top() {
            match top.kind() {
                OperationKind::OpenBracket => {
                    return Err(EvalError::UnbalancedBrackets(top.name().to_string()));
                }
                OperationKind::Function => {
                    return Err(EvalError::IncompleteCall(top.name().to_string()));
                }
                _ => self.pop_and_apply()?,
            }
        }

        match self.operands.as_slice() {
            [result] => {
                let value = self.bindings.value(*result)?;
                Ok((value, self.bindings))
            }
            _ => Err(EvalError::MalformedExpression),
        }
    }
}

/// Whether `token` begins a new operand: a literal, a variable, a function
/// call or a grouping bracket.
fn starts_operand(registry: &Registry, token: &Token) -> bool {
    match token.kind() {
        TokenKind::Literal | TokenKind::Variable | TokenKind::Function => true,
        TokenKind::Bracket => matches!(
            registry.lookup_bracket(token.text()),
            Some(Operation::OpenBracket { .. })
        ),
        TokenKind::ArgSeparator | TokenKind::Operator => false,
    }
}

/// Whether `top`, already on the operation stack, must run before the
/// incoming binary operator is pushed.
fn fires_before(top: &Operation, incoming: &Operation) -> bool {
    let Some(incoming) = incoming.priority() else {
        return false;
    };
    match top {
        Operation::Prefix { priority, .. } => *priority > incoming,
        Operation::Binary {
            priority,
            associativity: Associativity::Right,
            ..
        } => *priority > incoming,
        Operation::Binary {
            priority,
            associativity: Associativity::Left,
            ..
        } => *priority >= incoming,
        _ => false,
    }
}
