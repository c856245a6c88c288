//! Type descriptors: the identity of a type together with its value category and qualifiers.
//!
//! A [`TypeDescriptor`] is what lets a caller check, before touching any opaque memory, whether
//! the type it expects matches what an [`AnyFunction`](crate::AnyFunction) will accept or hand
//! back. Descriptors are produced by [`TypeDescriptor::of`] for every type implementing
//! [`Describe`].

use std::{
    any::{self, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

/// How a value of some type is bound: by value, by lvalue reference, or by rvalue reference.
///
/// This is the three-way policy an [`AnyFunction`](crate::AnyFunction) applies to every
/// parameter and return value:
///
/// - [`Value`](Category::Value) is *copied in*: the argument's storage is cloned.
/// - [`LvalueRef`](Category::LvalueRef) is *borrowed*: the callable sees the caller's storage.
/// - [`RvalueRef`](Category::RvalueRef) is *move-bound*: the callable may move out of the caller's
///   storage, leaving it in its moved-from state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// A plain value: `T`.
    Value,
    /// An lvalue reference: `&T` or `&mut T`.
    LvalueRef,
    /// An rvalue reference: [`MoveRef<T>`](crate::MoveRef).
    RvalueRef,
}

/// An immutable description of a fully qualified type.
///
/// Two descriptors are equal exactly when their type identity, [`Category`], constness, and
/// volatility all match. The human-readable name carried for diagnostics does not participate in
/// equality or hashing.
///
/// # Examples
///
/// ```
/// use anyfn::{MoveRef, TypeDescriptor};
///
/// let value = TypeDescriptor::of::<f64>();
/// let shared = TypeDescriptor::of::<&f64>();
/// let unique = TypeDescriptor::of::<&mut f64>();
/// let moved = TypeDescriptor::of::<MoveRef<'_, f64>>();
///
/// assert!(shared.is_lvalue_reference() && shared.is_const());
/// assert!(unique.is_lvalue_reference() && !unique.is_const());
/// assert!(moved.is_rvalue_reference());
///
/// // All four share the same storage type, but are distinct descriptors.
/// assert_eq!(shared.storage(), value);
/// assert_eq!(moved.storage(), value);
/// assert_ne!(shared, unique);
/// assert_ne!(value, TypeDescriptor::of::<f32>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
    category: Category,
    is_const: bool,
    is_volatile: bool,
}

impl TypeDescriptor {
    /// The descriptor of the fully qualified type `T`.
    pub fn of<T: Describe>() -> Self {
        T::descriptor()
    }

    /// The unqualified, by-value descriptor of any `'static` type, whether or not it implements
    /// [`Describe`].
    pub fn value<T: ?Sized + 'static>() -> Self {
        TypeDescriptor {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
            category: Category::Value,
            is_const: false,
            is_volatile: false,
        }
    }

    /// The descriptor of "no value", returned by callables that return `()`.
    pub fn void() -> Self {
        TypeDescriptor::value::<()>()
    }

    /// This descriptor, bound as an lvalue reference to the same (qualified) type.
    pub const fn as_lvalue_reference(mut self) -> Self {
        self.category = Category::LvalueRef;
        self
    }

    /// This descriptor, bound as an rvalue reference to the same (qualified) type.
    pub const fn as_rvalue_reference(mut self) -> Self {
        self.category = Category::RvalueRef;
        self
    }

    /// This descriptor with the `const` qualifier set on the value or referee.
    pub const fn as_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    /// This descriptor with the `volatile` qualifier set on the value or referee.
    ///
    /// Rust has no volatile types, so deduction never produces this qualifier; it exists so
    /// that hosts describing foreign types can round-trip it.
    pub const fn as_volatile(mut self) -> Self {
        self.is_volatile = true;
        self
    }

    /// The type actually stored in memory: this descriptor with its reference category and all
    /// qualifiers stripped.
    ///
    /// An argument location passed to a parameter must point at exactly this type.
    pub const fn storage(mut self) -> Self {
        self.category = Category::Value;
        self.is_const = false;
        self.is_volatile = false;
        self
    }

    /// The [`TypeId`] of the underlying type.
    pub const fn type_id(&self) -> TypeId {
        self.id
    }

    /// The name of the underlying type, for diagnostics only.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The value category.
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Whether this describes an lvalue reference.
    pub const fn is_lvalue_reference(&self) -> bool {
        matches!(self.category, Category::LvalueRef)
    }

    /// Whether this describes an rvalue reference.
    pub const fn is_rvalue_reference(&self) -> bool {
        matches!(self.category, Category::RvalueRef)
    }

    /// Whether this describes any kind of reference.
    pub const fn is_reference(&self) -> bool {
        !matches!(self.category, Category::Value)
    }

    /// Whether the value (or, for references, the referee) is `const`.
    pub const fn is_const(&self) -> bool {
        self.is_const
    }

    /// Whether the value (or, for references, the referee) is `volatile`.
    pub const fn is_volatile(&self) -> bool {
        self.is_volatile
    }

    /// Whether this is the void descriptor.
    pub fn is_void(&self) -> bool {
        *self == TypeDescriptor::void()
    }

    /// Whether binding a parameter of this type writes to, or moves out of, the caller's storage.
    pub const fn needs_write_access(&self) -> bool {
        match self.category {
            Category::Value => false,
            Category::LvalueRef => !self.is_const,
            Category::RvalueRef => true,
        }
    }

    /// Whether `self` and `other` have the same storage type, ignoring category and qualifiers.
    pub fn same_storage(&self, other: &TypeDescriptor) -> bool {
        self.id == other.id
    }
}

impl Default for TypeDescriptor {
    fn default() -> Self {
        TypeDescriptor::void()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.category == other.category
            && self.is_const == other.is_const
            && self.is_volatile == other.is_volatile
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.category.hash(state);
        self.is_const.hash(state);
        self.is_volatile.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let qualifiers = match (self.is_const, self.is_volatile) {
            (false, false) => "",
            (true, false) => "const ",
            (false, true) => "volatile ",
            (true, true) => "const volatile ",
        };
        match self.category {
            Category::Value => write!(f, "{}{}", qualifiers, self.name),
            // A const lvalue reference is exactly a Rust shared reference.
            Category::LvalueRef if self.is_const && !self.is_volatile => write!(f, "&{}", self.name),
            Category::LvalueRef if self.is_const => write!(f, "&volatile {}", self.name),
            Category::LvalueRef => write!(f, "&mut {}{}", qualifiers, self.name),
            Category::RvalueRef => write!(f, "MoveRef<{}{}>", qualifiers, self.name),
        }
    }
}

/// Types which know their own fully qualified [`TypeDescriptor`].
///
/// This is implemented for every value type (see [`by_value!`](crate::by_value)), for `()`, and
/// for the reference forms `&T`, `&mut T`, and [`MoveRef<T>`](crate::MoveRef).
///
/// # Safety
///
/// The storage type of the returned descriptor ([`TypeDescriptor::storage`]) must be the type
/// whose memory the implementor reads or borrows when it is fetched from an [`Arg`](crate::Arg)
/// or extracted from an [`AnyResult`](crate::AnyResult): argument and result checks compare
/// nothing but descriptors before casting addresses.
pub unsafe trait Describe {
    /// The descriptor for `Self`.
    fn descriptor() -> TypeDescriptor;
}

unsafe impl Describe for () {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::void()
    }
}

unsafe impl<'r, T: 'static> Describe for &'r T {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::value::<T>().as_const().as_lvalue_reference()
    }
}

unsafe impl<'r, T: 'static> Describe for &'r mut T {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::value::<T>().as_lvalue_reference()
    }
}
