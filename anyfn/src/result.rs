//! The container for whatever an [`AnyFunction`](crate::AnyFunction) produced.

use std::{any::Any, fmt, marker::PhantomData, ptr::NonNull};

use crate::{Describe, ExtractError, MoveRef, TypeDescriptor};

/// A single produced value of a type known only at runtime, or no value at all.
///
/// The value category of the produced value decides what is stored:
///
/// - a value (`T`) is moved into storage owned by the container;
/// - a reference (`&T`, `&mut T`, or [`MoveRef<T>`]) is stored as a non-owning address of the
///   referee, which must outlive `'a`;
/// - `()` is stored as nothing: the container is *void*, describes itself with
///   [`TypeDescriptor::void`], and has no address.
///
/// Cloning deep-copies owned storage but only copies the address of a referee, so a clone of a
/// reference result still points at the same external object.
///
/// # Examples
///
/// ```
/// use anyfn::{AnyResult, TypeDescriptor};
///
/// let owned = AnyResult::capture(vec![1, 2, 3]);
/// assert_eq!(owned.descriptor(), TypeDescriptor::of::<Vec<i32>>());
/// assert_eq!(owned.value::<Vec<i32>>().unwrap(), vec![1, 2, 3]);
/// assert!(owned.value::<Vec<u8>>().is_err());
///
/// let x = 42_u64;
/// let borrowed = AnyResult::capture(&x);
/// assert!(std::ptr::eq(borrowed.value::<&u64>().unwrap(), &x));
///
/// let void = AnyResult::void();
/// assert!(void.is_void() && void.address().is_none());
/// ```
#[derive(Clone)]
pub struct AnyResult<'a> {
    descriptor: TypeDescriptor,
    storage: Storage<'a>,
}

enum Storage<'a> {
    Void,
    Owned(Box<dyn OwnedValue>),
    Borrowed(NonNull<()>, PhantomData<&'a ()>),
}

impl Clone for Storage<'_> {
    fn clone(&self) -> Self {
        match self {
            Storage::Void => Storage::Void,
            Storage::Owned(value) => Storage::Owned((**value).clone_boxed()),
            Storage::Borrowed(ptr, _) => Storage::Borrowed(*ptr, PhantomData),
        }
    }
}

trait OwnedValue: Any {
    fn clone_boxed(&self) -> Box<dyn OwnedValue>;
    fn address(&self) -> NonNull<()>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Clone + 'static> OwnedValue for T {
    fn clone_boxed(&self) -> Box<dyn OwnedValue> {
        Box::new(self.clone())
    }

    fn address(&self) -> NonNull<()> {
        NonNull::from(self).cast()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl<'a> AnyResult<'a> {
    /// The void result: no value, the void descriptor, no address.
    pub fn void() -> Self {
        AnyResult {
            descriptor: TypeDescriptor::void(),
            storage: Storage::Void,
        }
    }

    /// Capture `value`, keeping its value category.
    pub fn capture<T: ReturnValue<'a>>(value: T) -> Self {
        value.into_result()
    }

    /// Take ownership of a value.
    pub fn owned<T: Clone + 'static>(value: T) -> Self {
        AnyResult {
            descriptor: TypeDescriptor::value::<T>(),
            storage: Storage::Owned(Box::new(value)),
        }
    }

    /// Remember the address of a referee, described by `R`.
    pub(crate) fn borrowed<R: Describe, T>(referee: NonNull<T>) -> Self {
        AnyResult {
            descriptor: R::descriptor(),
            storage: Storage::Borrowed(referee.cast(), PhantomData),
        }
    }

    /// The descriptor of what this result holds; [`TypeDescriptor::void`] if it holds nothing.
    pub fn descriptor(&self) -> TypeDescriptor {
        self.descriptor
    }

    /// Whether this result holds nothing.
    pub fn is_void(&self) -> bool {
        matches!(self.storage, Storage::Void)
    }

    /// The address of the stored value or of the referee, or `None` for a void result.
    ///
    /// The address of an owned value may only be read through: the container hands out no
    /// unique access to what it owns.
    pub fn address(&self) -> Option<NonNull<()>> {
        match &self.storage {
            Storage::Void => None,
            Storage::Owned(value) => Some((**value).address()),
            Storage::Borrowed(ptr, _) => Some(*ptr),
        }
    }

    /// Extract the result as `T`: a copy of an owned value, or a shared reference to the referee.
    ///
    /// Fails unless `T`'s descriptor is exactly [`self.descriptor()`](AnyResult::descriptor).
    pub fn value<T: Extract<'a>>(&self) -> Result<T, ExtractError> {
        self.check::<T>()?;
        Ok(unsafe { T::extract(self) })
    }

    /// Extract the result as a unique reference (`&mut T`) or move handle ([`MoveRef<T>`]).
    ///
    /// Fails unless `T`'s descriptor is exactly [`self.descriptor()`](AnyResult::descriptor).
    ///
    /// # Safety
    ///
    /// No other reference to the referee may be live while the extracted one is used. That
    /// includes references previously extracted from this result or from any of its clones.
    pub unsafe fn value_mut<T: ExtractMut<'a>>(&self) -> Result<T, ExtractError> {
        self.check::<T>()?;
        Ok(T::extract_mut(self))
    }

    /// Extract without checking the descriptor in release builds.
    ///
    /// # Safety
    ///
    /// `T::descriptor()` must equal [`self.descriptor()`](AnyResult::descriptor).
    pub unsafe fn value_unchecked<T: Extract<'a>>(&self) -> T {
        debug_assert_eq!(T::descriptor(), self.descriptor, "extracted the wrong type");
        T::extract(self)
    }

    /// Move an owned value out without copying it.
    ///
    /// Gives the container back unchanged if it does not own a `T`.
    pub fn into_value<T: 'static>(self) -> Result<T, Self> {
        match self.storage {
            Storage::Owned(value) if (*value).as_any().is::<T>() => {
                let value = value.into_any().downcast::<T>();
                Ok(*value.expect("type identity was checked before downcasting"))
            }
            storage => Err(AnyResult {
                descriptor: self.descriptor,
                storage,
            }),
        }
    }

    /// The address of the stored value or referee.
    ///
    /// # Safety
    ///
    /// The result must not be void.
    pub(crate) unsafe fn address_unchecked(&self) -> NonNull<()> {
        match &self.storage {
            Storage::Owned(value) => (**value).address(),
            Storage::Borrowed(ptr, _) => *ptr,
            Storage::Void => {
                debug_assert!(false, "took the address of a void result");
                NonNull::dangling()
            }
        }
    }

    fn check<T: Describe>(&self) -> Result<(), ExtractError> {
        let requested = T::descriptor();
        if requested == self.descriptor {
            Ok(())
        } else {
            let error = ExtractError {
                requested,
                actual: self.descriptor,
            };
            tracing::debug!(%error, "rejected extraction");
            Err(error)
        }
    }
}

impl Default for AnyResult<'_> {
    fn default() -> Self {
        AnyResult::void()
    }
}

impl fmt::Debug for AnyResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AnyResult")
            .field("descriptor", &self.descriptor)
            .field("address", &self.address())
            .finish()
    }
}

/// A type that can be returned from a callable wrapped in an
/// [`AnyFunction`](crate::AnyFunction), and so captured in an [`AnyResult`].
pub trait ReturnValue<'a>: Describe + Sized {
    /// Capture `self`, choosing owned or borrowed storage by value category.
    fn into_result(self) -> AnyResult<'a>;
}

impl<'a> ReturnValue<'a> for () {
    fn into_result(self) -> AnyResult<'a> {
        AnyResult::void()
    }
}

impl<'a, 'r: 'a, T: 'static> ReturnValue<'a> for &'r T {
    fn into_result(self) -> AnyResult<'a> {
        AnyResult::borrowed::<Self, T>(NonNull::from(self))
    }
}

impl<'a, 'r: 'a, T: 'static> ReturnValue<'a> for &'r mut T {
    fn into_result(self) -> AnyResult<'a> {
        AnyResult::borrowed::<Self, T>(NonNull::from(self))
    }
}

impl<'a, 'r: 'a, T: 'static> ReturnValue<'a> for MoveRef<'r, T> {
    fn into_result(self) -> AnyResult<'a> {
        AnyResult::borrowed::<Self, T>(NonNull::from(self.into_inner()))
    }
}

/// A type that can be extracted from a shared [`AnyResult`]: a copy of a value, or a shared
/// reference.
pub trait Extract<'a>: Describe + Sized {
    /// Read the result as `Self`.
    ///
    /// # Safety
    ///
    /// `Self::descriptor()` must equal `result.descriptor()`.
    unsafe fn extract(result: &AnyResult<'a>) -> Self;
}

impl<'a: 'r, 'r, T: 'static> Extract<'a> for &'r T {
    unsafe fn extract(result: &AnyResult<'a>) -> Self {
        result.address_unchecked().cast::<T>().as_ref()
    }
}

/// A type that can be extracted from an [`AnyResult`] as unique access to its referee.
pub trait ExtractMut<'a>: Describe + Sized {
    /// Read the result as `Self`.
    ///
    /// # Safety
    ///
    /// `Self::descriptor()` must equal `result.descriptor()`, and no other reference to the
    /// referee may be live while the returned one is used.
    unsafe fn extract_mut(result: &AnyResult<'a>) -> Self;
}

impl<'a: 'r, 'r, T: 'static> ExtractMut<'a> for &'r mut T {
    unsafe fn extract_mut(result: &AnyResult<'a>) -> Self {
        result.address_unchecked().cast::<T>().as_mut()
    }
}

impl<'a: 'r, 'r, T: 'static> ExtractMut<'a> for MoveRef<'r, T> {
    unsafe fn extract_mut(result: &AnyResult<'a>) -> Self {
        MoveRef::new(result.address_unchecked().cast::<T>().as_mut())
    }
}
