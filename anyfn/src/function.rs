//! The type-erased callable itself, and the deduction of its signature.

use std::{fmt, rc::Rc};

use crate::{AnyResult, Arg, InvokeError, TypeDescriptor};

/// The largest number of parameters a callable may take and still be wrapped in an
/// [`AnyFunction`].
pub const MAX_ARITY: usize = 12;

/// The erased form of a wrapped callable: bind every argument, call, capture the result.
///
/// Only ever called after the argument list has been validated, or under the caller's promise
/// that it is valid. Fails only if the callable is already running.
type Invoker<'a> = dyn Fn(&[Arg<'_>]) -> Result<AnyResult<'a>, InvokeError> + 'a;

/// A callable of any signature, invoked through a list of opaque argument locations.
///
/// An `AnyFunction` is built from a function pointer, a function item, a closure, or a boxed
/// `dyn FnMut`: anything implementing exactly one `FnMut(A0, ..., An) -> R` with `n <=`
/// [`MAX_ARITY`], every `Ai` a [`Parameter`](crate::Parameter) and `R` a
/// [`ReturnValue`](crate::ReturnValue). The signature is deduced when the `AnyFunction` is built
/// and recorded as [`TypeDescriptor`]s; nothing about it is needed at the call site.
///
/// The callable is moved into the `AnyFunction` and shared between its clones, so a closure
/// that updates its captured state is seen doing so through every clone. Because the
/// thread-safety of the erased callable cannot be recovered, an `AnyFunction` is neither `Send`
/// nor `Sync`.
///
/// # Examples
///
/// ```
/// use anyfn::{args, AnyFunction, TypeDescriptor};
///
/// let f = AnyFunction::new(|a: i32, b: f64, c: f32| a as f64 * b + c as f64);
///
/// assert_eq!(
///     f.parameter_types(),
///     [
///         TypeDescriptor::of::<i32>(),
///         TypeDescriptor::of::<f64>(),
///         TypeDescriptor::of::<f32>(),
///     ]
/// );
/// assert_eq!(f.return_type(), TypeDescriptor::of::<f64>());
///
/// let (a, b, c) = (5_i32, 12.2_f64, 3.14_f32);
/// let result = unsafe { f.invoke(&args![&a, &b, &c]) }.unwrap();
/// assert_eq!(result.value::<f64>().unwrap(), 5.0 * 12.2 + 3.14_f32 as f64);
/// ```
///
/// Reference parameters observe and mutate the caller's storage:
///
/// ```
/// use anyfn::{args, AnyFunction};
///
/// let set = AnyFunction::new(|x: &mut f64| *x = 5.0);
/// let mut x = 0.0;
/// let result = unsafe { set.invoke(&args![&mut x]) }.unwrap();
///
/// assert!(result.is_void());
/// assert_eq!(x, 5.0);
/// ```
#[derive(Derivative)]
#[derivative(Clone, Default)]
pub struct AnyFunction<'a> {
    invoker: Option<Rc<Invoker<'a>>>,
    #[derivative(Default(value = "Rc::from(Vec::new())"))]
    parameter_types: Rc<[TypeDescriptor]>,
    return_type: TypeDescriptor,
}

impl<'a> AnyFunction<'a> {
    /// Wrap `callable`, deducing its signature.
    pub fn new<Marker, F: IntoAnyFunction<'a, Marker>>(callable: F) -> Self {
        callable.into_any_function()
    }

    /// The empty `AnyFunction`: not callable, no parameters, void return type.
    pub fn empty() -> Self {
        AnyFunction::default()
    }

    pub(crate) fn from_parts<F>(
        invoker: F,
        parameter_types: Vec<TypeDescriptor>,
        return_type: TypeDescriptor,
    ) -> Self
    where
        F: Fn(&[Arg<'_>]) -> Result<AnyResult<'a>, InvokeError> + 'a,
    {
        tracing::trace!(
            arity = parameter_types.len(),
            %return_type,
            "captured callable signature"
        );
        let invoker: Rc<Invoker<'a>> = Rc::new(invoker);
        AnyFunction {
            invoker: Some(invoker),
            parameter_types: parameter_types.into(),
            return_type,
        }
    }

    /// Whether this wraps a callable, i.e. was not built empty.
    pub fn is_callable(&self) -> bool {
        self.invoker.is_some()
    }

    /// Whether this is the empty `AnyFunction`.
    pub fn is_empty(&self) -> bool {
        self.invoker.is_none()
    }

    /// The descriptors of the parameters, in order.
    pub fn parameter_types(&self) -> &[TypeDescriptor] {
        &self.parameter_types
    }

    /// The descriptor of the return type; [`TypeDescriptor::void`] for callables returning `()`
    /// and for the empty `AnyFunction`.
    pub fn return_type(&self) -> TypeDescriptor {
        self.return_type
    }

    /// The number of parameters.
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }

    /// Call the wrapped callable with `args`, one location per parameter, after checking that the
    /// call is well-formed.
    ///
    /// Each parameter binds to its location according to its category: value parameters are
    /// cloned from it, reference parameters borrow it, and [`MoveRef`](crate::MoveRef)
    /// parameters borrow it with permission to move out. The returned [`AnyResult`] holds the
    /// produced value by the same rules.
    ///
    /// # Errors
    ///
    /// - [`InvokeError::Empty`] if this `AnyFunction` is empty,
    /// - [`InvokeError::ArityMismatch`] if `args` has the wrong length,
    /// - [`InvokeError::TypeMismatch`] if a location does not point at its parameter's storage
    ///   type,
    /// - [`InvokeError::ReadOnlyArgument`] if a `&mut T` or `MoveRef<T>` parameter is given a
    ///   read-only location,
    /// - [`InvokeError::Reentrant`] if the callable is already running further up the stack.
    ///
    /// # Safety
    ///
    /// The checks above cover everything but lifetimes, which erasure makes invisible:
    ///
    /// - the callable must not keep any reference it is handed beyond the call;
    /// - if the callable returns a reference into one of its arguments, the result must not be
    ///   used after that argument's storage is released.
    pub unsafe fn invoke(&self, args: &[Arg<'_>]) -> Result<AnyResult<'a>, InvokeError> {
        let invoker = match &self.invoker {
            Some(invoker) => invoker,
            None => return Err(rejected(InvokeError::Empty)),
        };
        self.check(args).map_err(rejected)?;
        invoker(args).map_err(rejected)
    }

    /// Call the wrapped callable without checking the call in release builds.
    ///
    /// # Panics
    ///
    /// Panics if this `AnyFunction` is empty, or if the callable is already running.
    ///
    /// # Safety
    ///
    /// Everything [`invoke`](AnyFunction::invoke) requires, and additionally that `invoke` would
    /// not return an error. Debug builds assert the latter.
    pub unsafe fn invoke_unchecked(&self, args: &[Arg<'_>]) -> AnyResult<'a> {
        let invoker = self
            .invoker
            .as_ref()
            .expect("invoked an empty AnyFunction");
        if cfg!(debug_assertions) {
            if let Err(error) = self.check(args) {
                panic!("invalid unchecked invocation: {}", error);
            }
        }
        match invoker(args) {
            Ok(result) => result,
            Err(error) => panic!("invalid unchecked invocation: {}", error),
        }
    }

    fn check(&self, args: &[Arg<'_>]) -> Result<(), InvokeError> {
        if args.len() != self.parameter_types.len() {
            return Err(InvokeError::ArityMismatch {
                expected: self.parameter_types.len(),
                got: args.len(),
            });
        }
        for (index, (arg, expected)) in args.iter().zip(self.parameter_types.iter()).enumerate() {
            if !arg.storage().same_storage(expected) {
                return Err(InvokeError::TypeMismatch {
                    index,
                    expected: *expected,
                    found: arg.storage(),
                });
            }
            if expected.needs_write_access() && !arg.is_writable() {
                return Err(InvokeError::ReadOnlyArgument {
                    index,
                    expected: *expected,
                });
            }
        }
        Ok(())
    }
}

fn rejected(error: InvokeError) -> InvokeError {
    tracing::debug!(%error, "rejected invocation");
    error
}

impl fmt::Debug for AnyFunction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AnyFunction")
            .field("callable", &self.is_callable())
            .field("parameter_types", &self.parameter_types)
            .field("return_type", &self.return_type)
            .finish()
    }
}

/// Callables whose signature can be deduced and erased into an [`AnyFunction`].
///
/// `Marker` is the deduced signature as a function pointer type, `fn(A0, ..., An) -> R`; it
/// only exists to keep the implementations for different arities apart, and is always inferred.
///
/// This is implemented for every `F: FnMut(A0, ..., An) -> R + 'a` with `n <=` [`MAX_ARITY`].
pub trait IntoAnyFunction<'a, Marker> {
    /// Deduce the signature of `self` and erase it.
    fn into_any_function(self) -> AnyFunction<'a>;
}

anyfn_macro::impl_signatures!(12);
