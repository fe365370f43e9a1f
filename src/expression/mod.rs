mod evaluator;
mod operand;
mod operation;
mod registry;
mod store;
mod token;
mod tokenizer;

pub use evaluator::Evaluator;
pub use operand::{Bindings, Operand, VarId};
pub use operation::{
    Associativity, BinaryCallback, FunctionCallback, Operation, OperationKind, UnaryCallback,
};
pub use registry::{
    is_valid_bracket_name, is_valid_function_name, is_valid_operator_name,
    is_valid_variable_name, Extension, Registry,
};
pub use store::VariableStore;
pub use token::{Token, TokenKind, ARG_SEPARATOR, CALL_CLOSE, CALL_OPEN};
pub use tokenizer::tokenize;
