//! Opaque argument locations.

use std::{fmt, marker::PhantomData, ptr::NonNull};

use crate::TypeDescriptor;

/// The address of one argument to an [`AnyFunction`](crate::AnyFunction), erased to a thin
/// pointer but tagged with the storage type it points at and whether it may be written.
///
/// An `Arg` borrows its storage for `'x`, so the location stays valid for as long as the `Arg`
/// exists. It is deliberately neither `Copy` nor `Clone`: a writable location can appear at most
/// once in an argument list.
///
/// # Examples
///
/// ```
/// use anyfn::{Arg, TypeDescriptor};
///
/// let mut x = 1.5_f64;
/// let label = String::from("speed");
///
/// let a = Arg::new(&mut x);
/// let b = Arg::shared(&label);
///
/// assert!(a.is_writable());
/// assert!(!b.is_writable());
/// assert_eq!(b.storage(), TypeDescriptor::of::<String>());
/// ```
#[allow(missing_copy_implementations)]
pub struct Arg<'x> {
    ptr: NonNull<()>,
    storage: TypeDescriptor,
    writable: bool,
    _borrow: PhantomData<&'x mut ()>,
}

impl<'x> Arg<'x> {
    /// A writable location, usable for every kind of parameter.
    pub fn new<T: 'static>(value: &'x mut T) -> Self {
        Arg {
            ptr: NonNull::from(value).cast(),
            storage: TypeDescriptor::value::<T>(),
            writable: true,
            _borrow: PhantomData,
        }
    }

    /// A read-only location, usable for by-value and `&T` parameters.
    pub fn shared<T: 'static>(value: &'x T) -> Self {
        Arg {
            ptr: NonNull::from(value).cast(),
            storage: TypeDescriptor::value::<T>(),
            writable: false,
            _borrow: PhantomData,
        }
    }

    /// A location known only by its address and the descriptor of what it points at.
    ///
    /// Only the storage type of `storage` is recorded.
    ///
    /// # Safety
    ///
    /// For all of `'x`, `ptr` must point at a live, initialized value of `storage`'s storage
    /// type that nothing else accesses while the `Arg` is used. If `writable` is true, the value
    /// must be valid for writes as well as reads.
    pub unsafe fn from_raw(ptr: NonNull<()>, storage: TypeDescriptor, writable: bool) -> Self {
        Arg {
            ptr,
            storage: storage.storage(),
            writable,
            _borrow: PhantomData,
        }
    }

    /// The descriptor of the value this location points at.
    pub fn storage(&self) -> TypeDescriptor {
        self.storage
    }

    /// Whether parameters that write to or move out of their argument may bind to this location.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// The erased address.
    pub fn as_ptr(&self) -> *mut () {
        self.ptr.as_ptr()
    }

    /// The address cast to its storage type.
    ///
    /// # Safety
    ///
    /// `T` must be the storage type of this location.
    pub(crate) unsafe fn cast<T: 'static>(&self) -> *mut T {
        debug_assert_eq!(self.storage, TypeDescriptor::value::<T>());
        self.ptr.as_ptr().cast()
    }
}

impl<'x, T: 'static> From<&'x mut T> for Arg<'x> {
    fn from(value: &'x mut T) -> Self {
        Arg::new(value)
    }
}

impl<'x, T: 'static> From<&'x T> for Arg<'x> {
    fn from(value: &'x T) -> Self {
        Arg::shared(value)
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Arg")
            .field("ptr", &self.ptr)
            .field("storage", &self.storage)
            .field("writable", &self.writable)
            .finish()
    }
}

/// Build an argument list in place: `&mut x` becomes a writable [`Arg`], `&x` a read-only one.
///
/// # Examples
///
/// ```
/// use anyfn::args;
///
/// let mut total = 0_i64;
/// let step = 3_i64;
/// let list = args![&mut total, &step];
///
/// assert_eq!(list.len(), 2);
/// assert!(list[0].is_writable());
/// assert!(!list[1].is_writable());
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        [$($crate::Arg::from($arg)),*]
    };
}
