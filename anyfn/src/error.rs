//! Why an invocation or an extraction was refused.

use thiserror::Error;

use crate::TypeDescriptor;

/// The reason an [`AnyFunction::invoke`](crate::AnyFunction::invoke) call was refused before the
/// callable ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum InvokeError {
    /// The [`AnyFunction`](crate::AnyFunction) wraps no callable.
    #[error("cannot invoke an empty function")]
    Empty,
    /// The argument list has the wrong length.
    #[error("expected {expected} arguments, got {got}")]
    ArityMismatch {
        /// The number of parameters.
        expected: usize,
        /// The number of arguments supplied.
        got: usize,
    },
    /// An argument location does not point at the storage type of its parameter.
    #[error("argument {index} points at `{found}` but the parameter expects `{expected}`")]
    TypeMismatch {
        /// The position of the offending argument.
        index: usize,
        /// The parameter's descriptor.
        expected: TypeDescriptor,
        /// The storage type the argument points at.
        found: TypeDescriptor,
    },
    /// A read-only argument location was given to a parameter that writes or moves.
    #[error("argument {index} is read-only but the parameter `{expected}` needs write access")]
    ReadOnlyArgument {
        /// The position of the offending argument.
        index: usize,
        /// The parameter's descriptor.
        expected: TypeDescriptor,
    },
    /// The callable was invoked again while it was still running.
    #[error("the function is already running")]
    Reentrant,
}

/// An [`AnyResult`](crate::AnyResult) was asked for a type other than the one it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("result holds `{actual}`, not `{requested}`")]
pub struct ExtractError {
    /// The descriptor that was asked for.
    pub requested: TypeDescriptor,
    /// The descriptor of what the result actually holds.
    pub actual: TypeDescriptor,
}
