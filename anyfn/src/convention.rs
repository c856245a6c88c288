//! How each parameter binds to the argument location it is handed.
//!
//! Every parameter type of a callable wrapped in an [`AnyFunction`](crate::AnyFunction) must
//! implement [`Parameter`], which says how to produce the parameter from an [`Arg`]. There are
//! four conventions, selected purely by the parameter's Rust type:
//!
//! | Parameter type | Descriptor | Binding |
//! | :------------- | :--------- | :------ |
//! | `T` (a value type) | value | clone the argument's storage |
//! | `&T` | const lvalue reference | borrow the argument's storage |
//! | `&mut T` | lvalue reference | borrow the argument's storage uniquely |
//! | [`MoveRef<T>`] | rvalue reference | borrow uniquely, with permission to move out |
//!
//! Value types are opted in with [`by_value!`](crate::by_value) or `#[derive(Value)]`; the
//! three reference conventions are available for every `'static` type.

use std::{
    fmt,
    mem,
    ops::{Deref, DerefMut},
};

use crate::{Arg, Describe, TypeDescriptor};

/// A type that can be produced from an argument location.
pub trait Parameter: Describe + Sized {
    /// Bind a parameter to `arg`.
    ///
    /// # Safety
    ///
    /// `arg` must point at [`Self::descriptor().storage()`](TypeDescriptor::storage), and must be
    /// writable if [`Self::descriptor().needs_write_access()`](TypeDescriptor::needs_write_access).
    /// Any borrow produced must not be used after the storage behind `arg` is released.
    unsafe fn fetch(arg: &Arg<'_>) -> Self;
}

impl<'r, T: 'static> Parameter for &'r T {
    unsafe fn fetch(arg: &Arg<'_>) -> Self {
        &*arg.cast::<T>()
    }
}

impl<'r, T: 'static> Parameter for &'r mut T {
    unsafe fn fetch(arg: &Arg<'_>) -> Self {
        &mut *arg.cast::<T>()
    }
}

impl<'r, T: 'static> Parameter for MoveRef<'r, T> {
    unsafe fn fetch(arg: &Arg<'_>) -> Self {
        MoveRef(&mut *arg.cast::<T>())
    }
}

/// An rvalue reference: a unique borrow that the holder is entitled to move out of.
///
/// Taking a `MoveRef<T>` parameter means "this argument may be consumed". Moving out with
/// [`take`](MoveRef::take) or [`replace`](MoveRef::replace) leaves the caller's storage in its
/// moved-from state, exactly as if the callable had been called directly. A callable returning a
/// `MoveRef<T>` hands back a binding to existing storage rather than a copy.
///
/// # Examples
///
/// ```
/// use anyfn::MoveRef;
///
/// let mut items = vec![1, 2, 3];
/// let moved = MoveRef::new(&mut items).take();
///
/// assert_eq!(moved, vec![1, 2, 3]);
/// assert!(items.is_empty());
/// ```
pub struct MoveRef<'r, T>(&'r mut T);

impl<'r, T> MoveRef<'r, T> {
    /// Bind an rvalue reference to `value`.
    pub fn new(value: &'r mut T) -> Self {
        MoveRef(value)
    }

    /// Move the value out, leaving `T::default()` behind.
    pub fn take(self) -> T
    where
        T: Default,
    {
        mem::take(self.0)
    }

    /// Move the value out, leaving `with` behind.
    pub fn replace(self, with: T) -> T {
        mem::replace(self.0, with)
    }

    /// Give up the right to move and keep the plain unique borrow.
    pub fn into_inner(self) -> &'r mut T {
        self.0
    }
}

impl<T> Deref for MoveRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.0
    }
}

impl<T> DerefMut for MoveRef<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for MoveRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("MoveRef").field(&self.0).finish()
    }
}

unsafe impl<'r, T: 'static> Describe for MoveRef<'r, T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::value::<T>().as_rvalue_reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_reference_sees_caller_storage() {
        let x = 7_u16;
        let arg = Arg::shared(&x);
        let bound: &u16 = unsafe { Parameter::fetch(&arg) };
        assert!(std::ptr::eq(bound, &x));
    }

    #[test]
    fn unique_reference_writes_through() {
        let mut x = 0.0_f64;
        {
            let arg = Arg::new(&mut x);
            let bound: &mut f64 = unsafe { Parameter::fetch(&arg) };
            *bound = 5.0;
        }
        assert_eq!(x, 5.0);
    }

    #[test]
    fn move_ref_leaves_moved_from_state() {
        let mut s = String::from("moved");
        let taken = {
            let arg = Arg::new(&mut s);
            let bound: MoveRef<'_, String> = unsafe { Parameter::fetch(&arg) };
            bound.take()
        };
        assert_eq!(taken, "moved");
        assert!(s.is_empty());
    }

    #[test]
    fn replace_and_into_inner() {
        let mut v = vec![1];
        let old = MoveRef::new(&mut v).replace(vec![2, 3]);
        assert_eq!(old, vec![1]);
        MoveRef::new(&mut v).into_inner().push(4);
        assert_eq!(v, vec![2, 3, 4]);
    }
}
