//! Value types: types passed into and returned from an [`AnyFunction`](crate::AnyFunction) by
//! copy.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    rc::Rc,
    sync::Arc,
};

/// Declare types that are passed and returned by value.
///
/// A value type is cloned out of its argument location when it is a parameter, owned by the
/// [`AnyResult`](crate::AnyResult) when it is returned, and cloned again when extracted. This
/// macro implements [`Describe`](crate::Describe), [`Parameter`](crate::Parameter),
/// [`ReturnValue`](crate::ReturnValue), and [`Extract`](crate::Extract) for each listed type.
///
/// Concrete types are listed directly. A single generic type is written with an `impl<...>`
/// header; every generic parameter is required to be `Clone + 'static`.
///
/// For your own structs and enums, `#[derive(Value)]` does the same thing.
///
/// # Examples
///
/// ```
/// use anyfn::{by_value, AnyFunction, TypeDescriptor};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Meters(f64);
///
/// #[derive(Clone)]
/// struct Tagged<T>(T, &'static str);
///
/// by_value!(Meters);
/// by_value!(impl<T> Tagged<T>);
///
/// let double = AnyFunction::new(|m: Meters| Meters(m.0 * 2.0));
/// assert_eq!(double.return_type(), TypeDescriptor::of::<Meters>());
/// assert_eq!(double.parameter_types(), [TypeDescriptor::of::<Meters>()]);
/// assert!(TypeDescriptor::of::<Tagged<u8>>() != TypeDescriptor::of::<Tagged<i8>>());
/// ```
#[macro_export]
macro_rules! by_value {
    (@impl [$($param:ident: [$($bound:tt)*]),*] $ty:ty) => {
        unsafe impl<$($param: $($bound)*),*> $crate::Describe for $ty {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::value::<Self>()
            }
        }

        impl<$($param: $($bound)*),*> $crate::Parameter for $ty {
            unsafe fn fetch(arg: &$crate::Arg<'_>) -> Self {
                $crate::__private::clone_arg::<Self>(arg)
            }
        }

        impl<'a, $($param: $($bound)*),*> $crate::ReturnValue<'a> for $ty {
            fn into_result(self) -> $crate::AnyResult<'a> {
                $crate::AnyResult::owned(self)
            }
        }

        impl<'a, $($param: $($bound)*),*> $crate::Extract<'a> for $ty {
            unsafe fn extract(result: &$crate::AnyResult<'a>) -> Self {
                $crate::__private::clone_result::<Self>(result)
            }
        }
    };
    (impl<$($param:ident),+ $(,)?> $ty:ty) => {
        $crate::by_value!(@impl [$($param: [::core::clone::Clone + 'static]),+] $ty);
    };
    ($($ty:ty),+ $(,)?) => {
        $($crate::by_value!(@impl [] $ty);)+
    };
}

by_value!(bool, char, i8, i16, i32, i64, i128, isize);
by_value!(u8, u16, u32, u64, u128, usize, f32, f64, String);
by_value!(impl<T> Vec<T>);
by_value!(impl<T> VecDeque<T>);
by_value!(impl<T> Option<T>);
by_value!(impl<T> Box<T>);
by_value!(impl<K, V> BTreeMap<K, V>);
by_value!(impl<T> BTreeSet<T>);
by_value!(impl<K, V> HashMap<K, V>);
by_value!(impl<T> HashSet<T>);
by_value!(impl<A, B> (A, B));
by_value!(impl<A, B, C> (A, B, C));

// Shared pointers are `Clone` whatever they point at.
by_value!(@impl [T: [?Sized + 'static]] Rc<T>);
by_value!(@impl [T: [?Sized + 'static]] Arc<T>);

#[doc(hidden)]
pub mod __private {
    //! Support for code generated by `by_value!` and `#[derive(Value)]`.

    use crate::{AnyResult, Arg};

    /// Clone the value an argument points at.
    ///
    /// # Safety
    ///
    /// `arg` must point at a `T`.
    pub unsafe fn clone_arg<T: Clone + 'static>(arg: &Arg<'_>) -> T {
        (*arg.cast::<T>()).clone()
    }

    /// Clone the value a non-void result holds.
    ///
    /// # Safety
    ///
    /// `result` must hold a `T`.
    pub unsafe fn clone_result<T: Clone + 'static>(result: &AnyResult<'_>) -> T {
        result.address_unchecked().cast::<T>().as_ref().clone()
    }
}
