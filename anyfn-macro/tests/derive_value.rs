use std::marker::PhantomData;

use anyfn::{
    args, AnyFunction, AnyResult, Category, Describe, Extract, Parameter, ReturnValue,
    TypeDescriptor, Value,
};
use static_assertions::{assert_impl_all, assert_not_impl_any};

#[derive(Clone, Debug, PartialEq, Value)]
struct Celsius(f64);

#[derive(Clone, Debug, PartialEq, Value)]
enum Reading {
    Missing,
    Temperature(Celsius),
    Labeled { label: String, value: i64 },
}

#[derive(Clone, Debug, PartialEq, Value)]
struct Pair<T, U>
where
    U: Default,
{
    first: T,
    second: U,
}

#[derive(Clone, Debug, PartialEq, Value)]
struct Buffer<const N: usize> {
    bytes: [u8; N],
}

#[derive(Clone, Value)]
struct Tag<T>(PhantomData<T>);

struct NotClone;

assert_impl_all!(Celsius: Describe, Parameter, ReturnValue<'static>, Extract<'static>);
assert_impl_all!(Pair<String, u8>: Describe, Parameter, ReturnValue<'static>, Extract<'static>);
assert_impl_all!(Buffer<4>: Describe, Parameter);
assert_not_impl_any!(Tag<NotClone>: Describe, Parameter);

#[test]
fn derived_types_are_values() {
    let descriptor = TypeDescriptor::of::<Celsius>();
    assert_eq!(descriptor.category(), Category::Value);
    assert!(!descriptor.is_const());
    assert_eq!(descriptor, TypeDescriptor::value::<Celsius>());
    assert!(descriptor.name().ends_with("Celsius"));
}

#[test]
fn derived_struct_round_trips_through_a_call() {
    let warm = AnyFunction::new(|c: Celsius, by: f64| Celsius(c.0 + by));
    assert_eq!(
        warm.parameter_types(),
        [TypeDescriptor::of::<Celsius>(), TypeDescriptor::of::<f64>()]
    );
    assert_eq!(warm.return_type(), TypeDescriptor::of::<Celsius>());

    let c = Celsius(20.0);
    let by = 1.5_f64;
    let result = unsafe { warm.invoke(&args![&c, &by]) }.unwrap();
    assert_eq!(result.value::<Celsius>().unwrap(), Celsius(21.5));
    assert_eq!(c, Celsius(20.0));
}

#[test]
fn derived_enum_round_trips_through_a_call() {
    let label = AnyFunction::new(|r: Reading, label: &String| match r {
        Reading::Temperature(Celsius(t)) => Reading::Labeled {
            label: label.clone(),
            value: t as i64,
        },
        other => other,
    });

    let reading = Reading::Temperature(Celsius(36.6));
    let name = String::from("body");
    let result = unsafe { label.invoke(&args![&reading, &name]) }.unwrap();
    assert_eq!(
        result.value::<Reading>().unwrap(),
        Reading::Labeled {
            label: String::from("body"),
            value: 36
        }
    );

    let missing = Reading::Missing;
    let result = unsafe { label.invoke(&args![&missing, &name]) }.unwrap();
    assert_eq!(result.value::<Reading>().unwrap(), Reading::Missing);
}

#[test]
fn generic_instantiations_are_distinct() {
    assert_ne!(
        TypeDescriptor::of::<Pair<u8, u16>>(),
        TypeDescriptor::of::<Pair<u16, u8>>()
    );
    assert_ne!(TypeDescriptor::of::<Buffer<2>>(), TypeDescriptor::of::<Buffer<3>>());

    let swap = AnyFunction::new(|p: Pair<u8, u16>| Pair {
        first: p.second,
        second: p.first,
    });
    let p = Pair {
        first: 1_u8,
        second: 2_u16,
    };
    let result = unsafe { swap.invoke(&args![&p]) }.unwrap();
    assert_eq!(result.descriptor(), TypeDescriptor::of::<Pair<u16, u8>>());
    assert_eq!(
        result.value::<Pair<u16, u8>>().unwrap(),
        Pair {
            first: 2,
            second: 1
        }
    );
}

#[test]
fn derived_values_are_captured_by_copy() {
    let buffer = Buffer { bytes: [9_u8; 4] };
    let result = AnyResult::capture(buffer.clone());
    let copy = result.clone();
    assert_ne!(result.address(), copy.address());
    assert_eq!(copy.into_value::<Buffer<4>>().unwrap(), buffer);
}
