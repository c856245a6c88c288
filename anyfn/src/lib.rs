/*!
![license: MIT](https://img.shields.io/badge/license-MIT-blue)

> **anyfn (crate):** Callables of any signature behind one type, invoked through opaque argument
> locations, that still know the exact types they take and return.

An [`AnyFunction`] wraps a function pointer, a closure, or a boxed `dyn FnMut`, and erases
its signature. What survives erasure is a [`TypeDescriptor`] for every parameter and for the
return type, recording not only *which* type it is but *how* it is bound:

| Rust type | [`Category`] | `is_const` | Binding |
| :-------- | :----------- | :--------- | :------ |
| `T` | [`Value`](Category::Value) | no | cloned from the caller's storage |
| `&T` | [`LvalueRef`](Category::LvalueRef) | yes | borrows the caller's storage |
| `&mut T` | [`LvalueRef`](Category::LvalueRef) | no | borrows the caller's storage uniquely |
| [`MoveRef<T>`] | [`RvalueRef`](Category::RvalueRef) | no | may move out of the caller's storage |
| `()` | *void* | no | nothing |

A caller holding only an `AnyFunction` inspects [`parameter_types`](AnyFunction::parameter_types)
and [`return_type`](AnyFunction::return_type), builds a list of [`Arg`]s (one address per
parameter, usually with [`args!`]), and calls [`invoke`](AnyFunction::invoke). The produced value
comes back in an [`AnyResult`], which owns it if it is a value and merely points at it if it is a
reference, and which hands it out again through [`AnyResult::value`].

```
use anyfn::{args, AnyFunction, MoveRef, TypeDescriptor};

let drain = AnyFunction::new(|v: MoveRef<'_, Vec<u32>>| v.take().len());
assert_eq!(
    drain.parameter_types(),
    [TypeDescriptor::of::<MoveRef<'_, Vec<u32>>>()]
);

let mut items: Vec<u32> = vec![1, 2, 3];
let result = unsafe { drain.invoke(&args![&mut items]) }.unwrap();

assert_eq!(result.value::<usize>().unwrap(), 3);
assert!(items.is_empty());
```

## Checking

Every call through [`AnyFunction::invoke`] is checked before the callable runs: the argument count
must match, every location must point at its parameter's storage type, and parameters which write
to or move out of their argument need a writable location. A failed check is reported as an
[`InvokeError`] and nothing is touched. Extraction from an [`AnyResult`] is checked the same way,
failing with an [`ExtractError`]. The `*_unchecked` variants skip these checks in release builds
and assert them in debug builds.

What erasure cannot check is lifetimes, which is why `invoke` is `unsafe`: a callable must not
hold on to the references it is given, and a result referring to an argument must not be used
after that argument is gone.

## Value types

Which types may be passed and returned by value is opt-in: every value type must be `Clone`, and
is declared with [`by_value!`] or, with the default `derive` feature, `#[derive(Value)]`. The
primitives, `String`, and the standard containers are declared already. Reference parameters
(`&T`, `&mut T`, `MoveRef<T>`) work for any `'static` type.
*/

#![allow(clippy::type_complexity)]
#![warn(missing_docs)]
#![warn(missing_copy_implementations, missing_debug_implementations)]
#![warn(unused_qualifications, unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
// Documentation configuration
#![forbid(broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate derivative;

pub mod convention;
pub mod descriptor;
pub mod error;
pub mod result;

mod arg;
mod function;
mod value;

pub use arg::Arg;
pub use convention::{MoveRef, Parameter};
pub use descriptor::{Category, Describe, TypeDescriptor};
pub use error::{ExtractError, InvokeError};
pub use function::{AnyFunction, IntoAnyFunction, MAX_ARITY};
pub use result::{AnyResult, Extract, ExtractMut, ReturnValue};

#[doc(hidden)]
pub use value::__private;

/// Derive [`by_value!`] for a struct or enum: implements [`Describe`], [`Parameter`],
/// [`ReturnValue`], and [`Extract`], so the type can be passed to and returned from an
/// [`AnyFunction`] by value.
///
/// The type must be `Clone`. Every generic type parameter gets a `Clone + 'static` bound.
///
/// # Examples
///
/// ```
/// use anyfn::{args, AnyFunction, Value};
///
/// #[derive(Clone, Debug, PartialEq, Value)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let flip = AnyFunction::new(|p: Point| Point { x: p.y, y: p.x });
/// let p = Point { x: 1, y: 2 };
/// let result = unsafe { flip.invoke(&args![&p]) }.unwrap();
///
/// assert_eq!(result.value::<Point>().unwrap(), Point { x: 2, y: 1 });
/// ```
#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use anyfn_macro::Value;

/// The prelude module for quickly getting started with anyfn.
///
/// This module is designed to be imported as `use anyfn::prelude::*;`.
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::{args, by_value};
    #[doc(no_inline)]
    pub use crate::{AnyFunction, AnyResult, Arg, MoveRef, TypeDescriptor};
    #[doc(no_inline)]
    #[cfg(feature = "derive")]
    pub use anyfn_macro::Value;
}
