use std::ptr;

use anyfn::{
    args, AnyFunction, AnyResult, Arg, Category, ExtractError, InvokeError, MoveRef,
    TypeDescriptor,
};
use static_assertions::{assert_impl_all, assert_not_impl_any};

assert_impl_all!(AnyFunction<'static>: Clone, Default);
assert_not_impl_any!(AnyFunction<'static>: Send, Sync);
assert_impl_all!(AnyResult<'static>: Clone, Default);
assert_not_impl_any!(AnyResult<'static>: Send, Sync);
assert_not_impl_any!(Arg<'static>: Clone, Copy, Send, Sync);
assert_impl_all!(TypeDescriptor: Copy, Eq, std::hash::Hash, Default);
assert_impl_all!(InvokeError: Copy, Eq, std::error::Error);
assert_impl_all!(ExtractError: Copy, Eq, std::error::Error);

fn weighted_sum(a: i32, b: f64, c: f32) -> f64 {
    a as f64 * b + c as f64
}

fn same<T>(x: T) -> T {
    x
}

#[test]
fn default_is_empty() {
    let f = AnyFunction::default();
    assert!(!f.is_callable());
    assert!(f.is_empty());
    assert!(f.parameter_types().is_empty());
    assert_eq!(f.arity(), 0);
    assert_eq!(f.return_type(), TypeDescriptor::void());
    assert!(f.return_type().is_void());
}

#[test]
fn nullary_callable_is_not_empty() {
    let f = AnyFunction::new(|| {});
    assert!(f.is_callable());
    assert!(f.parameter_types().is_empty());
    assert!(f.return_type().is_void());
}

#[test]
fn signature_is_recorded_exactly() {
    let f = AnyFunction::new(|_: &mut f64, _: &String, _: MoveRef<'_, Vec<u8>>, _: u16| true);
    let params = f.parameter_types();
    assert_eq!(params.len(), 4);

    assert_eq!(params[0], TypeDescriptor::of::<&mut f64>());
    assert_eq!(params[0].category(), Category::LvalueRef);
    assert!(!params[0].is_const());

    assert_eq!(params[1], TypeDescriptor::of::<&String>());
    assert_eq!(params[1].category(), Category::LvalueRef);
    assert!(params[1].is_const());

    assert_eq!(params[2], TypeDescriptor::of::<MoveRef<'_, Vec<u8>>>());
    assert_eq!(params[2].category(), Category::RvalueRef);

    assert_eq!(params[3], TypeDescriptor::of::<u16>());
    assert_eq!(params[3].category(), Category::Value);

    assert!(params.iter().all(|p| !p.is_volatile()));
    assert_eq!(f.return_type(), TypeDescriptor::of::<bool>());
}

#[test]
fn qualifiers_distinguish_descriptors() {
    let value = TypeDescriptor::of::<f64>();
    let shared = TypeDescriptor::of::<&f64>();
    let unique = TypeDescriptor::of::<&mut f64>();
    let moving = TypeDescriptor::of::<MoveRef<'_, f64>>();

    assert_ne!(value, shared);
    assert_ne!(shared, unique);
    assert_ne!(unique, moving);
    assert_ne!(value, value.as_const());
    assert_ne!(value, value.as_volatile());
    assert_ne!(value, TypeDescriptor::of::<f32>());
    assert_eq!(shared, value.as_const().as_lvalue_reference());
}

#[test]
fn value_parameters_are_copied_in() {
    let f = AnyFunction::new(weighted_sum);
    let (a, b, c) = (5_i32, 12.2_f64, 3.14_f32);
    let result = unsafe { f.invoke(&args![&a, &b, &c]) }.unwrap();

    assert_eq!(result.descriptor(), TypeDescriptor::of::<f64>());
    assert_eq!(result.value::<f64>().unwrap(), weighted_sum(5, 12.2, 3.14));
    assert_eq!((a, b, c), (5, 12.2, 3.14));
}

#[test]
fn value_parameters_leave_the_caller_untouched() {
    let f = AnyFunction::new(|mut s: String| {
        s.push('!');
        s
    });
    let s = String::from("hi");
    let result = unsafe { f.invoke(&args![&s]) }.unwrap();
    assert_eq!(result.value::<String>().unwrap(), "hi!");
    assert_eq!(s, "hi");
}

#[test]
fn void_callable_gives_void_result() {
    let f = AnyFunction::new(|_: i32| {});
    let a = 1_i32;
    let result = unsafe { f.invoke(&args![&a]) }.unwrap();
    assert!(result.is_void());
    assert!(result.address().is_none());
    assert_eq!(result.descriptor(), TypeDescriptor::void());
}

#[test]
fn lvalue_reference_parameter_writes_through() {
    let f = AnyFunction::new(|x: &mut f64| *x = 5.0);
    let mut x = 0.0_f64;
    let _ = unsafe { f.invoke(&args![&mut x]) }.unwrap();
    assert_eq!(x, 5.0);
}

#[test]
fn rvalue_reference_parameter_moves_out() {
    let f = AnyFunction::new(|v: MoveRef<'_, Vec<i32>>| v.take());
    let mut v = vec![7; 10];
    let result = unsafe { f.invoke(&args![&mut v]) }.unwrap();

    assert!(v.is_empty());
    let moved = result.into_value::<Vec<i32>>().unwrap();
    assert_eq!(moved.len(), 10);
}

#[test]
fn shared_reference_result_points_at_the_argument() {
    let f = AnyFunction::new(same::<&f64>);
    let x = 2.5_f64;
    let result = unsafe { f.invoke(&args![&x]) }.unwrap();

    assert_eq!(result.descriptor(), TypeDescriptor::of::<&f64>());
    let back: &f64 = result.value().unwrap();
    assert!(ptr::eq(back, &x));
    assert_eq!(result.address().unwrap().as_ptr() as *const f64, &x as *const f64);
}

#[test]
fn unique_reference_result_points_at_the_argument() {
    let f = AnyFunction::new(same::<&mut f64>);
    let mut x = 2.5_f64;
    let addr = &mut x as *mut f64;
    let result = unsafe { f.invoke(&args![&mut x]) }.unwrap();

    assert_eq!(result.descriptor(), TypeDescriptor::of::<&mut f64>());
    assert!(result.value::<&f64>().is_err());
    let back: &mut f64 = unsafe { result.value_mut() }.unwrap();
    assert_eq!(&mut *back as *mut f64, addr);
    *back = 9.0;
    drop(result);
    assert_eq!(x, 9.0);
}

#[test]
fn cloned_reference_result_shares_the_referee() {
    let f = AnyFunction::new(same::<&String>);
    let s = String::from("shared");
    let result = unsafe { f.invoke(&args![&s]) }.unwrap();
    let copy = result.clone();
    assert_eq!(copy.address(), result.address());
    assert!(ptr::eq(copy.value::<&String>().unwrap(), &s));
}

#[test]
fn cloned_owned_result_is_independent() {
    let result = AnyResult::capture(vec![1, 2, 3]);
    let copy = result.clone();
    assert_ne!(copy.address(), result.address());
    assert_eq!(copy.value::<Vec<i32>>().unwrap(), vec![1, 2, 3]);
}

#[test]
fn mismatched_extraction_is_an_error() {
    let result = AnyResult::capture(1_u8);
    assert_eq!(
        result.value::<i8>().unwrap_err(),
        ExtractError {
            requested: TypeDescriptor::of::<i8>(),
            actual: TypeDescriptor::of::<u8>(),
        }
    );
    assert!(AnyResult::void().value::<u8>().is_err());
}

#[test]
fn empty_function_refuses_to_run() {
    let f = AnyFunction::empty();
    assert_eq!(unsafe { f.invoke(&[]) }.unwrap_err(), InvokeError::Empty);
}

#[test]
fn wrong_arity_is_refused() {
    let f = AnyFunction::new(weighted_sum);
    let a = 1_i32;
    assert_eq!(
        unsafe { f.invoke(&args![&a]) }.unwrap_err(),
        InvokeError::ArityMismatch {
            expected: 3,
            got: 1
        }
    );
}

#[test]
fn wrong_storage_type_is_refused() {
    let f = AnyFunction::new(|x: &mut f64| *x = 5.0);
    let mut x = 0.0_f32;
    assert_eq!(
        unsafe { f.invoke(&args![&mut x]) }.unwrap_err(),
        InvokeError::TypeMismatch {
            index: 0,
            expected: TypeDescriptor::of::<&mut f64>(),
            found: TypeDescriptor::of::<f32>(),
        }
    );
    assert_eq!(x, 0.0);
}

#[test]
fn read_only_location_is_refused_for_writers() {
    let f = AnyFunction::new(|x: &mut f64| *x = 5.0);
    let x = 0.0_f64;
    assert_eq!(
        unsafe { f.invoke(&args![&x]) }.unwrap_err(),
        InvokeError::ReadOnlyArgument {
            index: 0,
            expected: TypeDescriptor::of::<&mut f64>(),
        }
    );
    assert_eq!(x, 0.0);
}

#[test]
fn writable_location_serves_readers() {
    let f = AnyFunction::new(|a: &u32, b: u32| a + b);
    let mut a = 1_u32;
    let mut b = 2_u32;
    let result = unsafe { f.invoke(&args![&mut a, &mut b]) }.unwrap();
    assert_eq!(result.value::<u32>().unwrap(), 3);
}

#[test]
fn raw_locations_are_accepted() {
    let f = AnyFunction::new(|x: &mut i64| *x += 1);
    let mut x = 41_i64;
    let arg = unsafe {
        Arg::from_raw(
            ptr::NonNull::from(&mut x).cast(),
            TypeDescriptor::of::<&mut i64>(),
            true,
        )
    };
    assert_eq!(arg.storage(), TypeDescriptor::of::<i64>());
    let _ = unsafe { f.invoke(&[arg]) }.unwrap();
    assert_eq!(x, 42);
}

#[test]
fn function_pointers_and_boxed_callables() {
    let pointer: fn(i32, f64, f32) -> f64 = weighted_sum;
    let boxed: Box<dyn Fn(i32, f64, f32) -> f64> = Box::new(weighted_sum);

    let (a, b, c) = (2_i32, 0.5_f64, 1.0_f32);
    for f in &[AnyFunction::new(pointer), AnyFunction::new(boxed)] {
        assert_eq!(
            f.parameter_types(),
            [
                TypeDescriptor::of::<i32>(),
                TypeDescriptor::of::<f64>(),
                TypeDescriptor::of::<f32>(),
            ]
        );
        let result = unsafe { f.invoke(&args![&a, &b, &c]) }.unwrap();
        assert_eq!(result.value::<f64>().unwrap(), 2.0);
    }
}

#[test]
fn closures_keep_their_captures() {
    let offset = String::from("prefix-");
    let f = AnyFunction::new(move |s: &String| format!("{}{}", offset, s));
    let g = f.clone();
    drop(f);

    let s = String::from("tail");
    let result = unsafe { g.invoke(&args![&s]) }.unwrap();
    assert_eq!(result.value::<String>().unwrap(), "prefix-tail");
}

#[test]
fn heterogeneous_functions_share_one_type() {
    let table: Vec<AnyFunction<'static>> = vec![
        AnyFunction::new(|a: i32, b: i32| a + b),
        AnyFunction::new(|s: &String| s.len()),
        AnyFunction::new(|| true),
        AnyFunction::empty(),
    ];
    let arities: Vec<usize> = table.iter().map(AnyFunction::arity).collect();
    assert_eq!(arities, [2, 1, 0, 0]);
    assert_eq!(table.iter().filter(|f| f.is_callable()).count(), 3);
}

#[test]
fn stateful_closures_keep_their_state() {
    let mut calls = 0_u32;
    let f = AnyFunction::new(move || {
        calls += 1;
        calls
    });
    let count = |f: &AnyFunction<'_>| unsafe { f.invoke(&[]) }.unwrap().value::<u32>().unwrap();

    assert_eq!(count(&f), 1);
    assert_eq!(count(&f), 2);
    let g = f.clone();
    assert_eq!(count(&g), 3);
    assert_eq!(count(&f), 4);

    let mut seen = Vec::new();
    let boxed: Box<dyn FnMut(u8) -> usize> = Box::new(move |b| {
        seen.push(b);
        seen.len()
    });
    let push = AnyFunction::new(boxed);
    let b = 9_u8;
    let _ = unsafe { push.invoke(&args![&b]) }.unwrap();
    let result = unsafe { push.invoke(&args![&b]) }.unwrap();
    assert_eq!(result.value::<usize>().unwrap(), 2);
}

#[test]
fn nullary_reference_result_points_at_external_state() {
    let x = 4.5_f64;
    let f = AnyFunction::new(|| &x);
    assert!(f.parameter_types().is_empty());
    assert_eq!(f.return_type(), TypeDescriptor::of::<&f64>());

    let result = unsafe { f.invoke(&[]) }.unwrap();
    assert!(ptr::eq(result.value::<&f64>().unwrap(), &x));
    assert_eq!(
        result.address().unwrap().as_ptr() as *const f64,
        &x as *const f64
    );
}

fn pass_through(v: MoveRef<'_, Vec<i32>>) -> MoveRef<'_, Vec<i32>> {
    v
}

#[test]
fn rvalue_reference_result_can_be_moved_from() {
    let f = AnyFunction::new(pass_through);
    assert_eq!(f.return_type(), TypeDescriptor::of::<MoveRef<'_, Vec<i32>>>());

    let mut v = vec![3; 10];
    let result = unsafe { f.invoke(&args![&mut v]) }.unwrap();
    assert_eq!(result.descriptor().category(), Category::RvalueRef);
    assert!(result.value::<&Vec<i32>>().is_err());

    let moved = unsafe { result.value_mut::<MoveRef<'_, Vec<i32>>>() }
        .unwrap()
        .take();
    drop(result);
    assert_eq!(moved.len(), 10);
    assert!(v.is_empty());
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "invalid unchecked invocation")]
fn unchecked_invocation_with_wrong_arity_panics_in_debug_builds() {
    let f = AnyFunction::new(weighted_sum);
    let a = 1_i32;
    let _ = unsafe { f.invoke_unchecked(&args![&a]) };
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "extracted the wrong type")]
fn unchecked_extraction_of_wrong_type_panics_in_debug_builds() {
    let result = AnyResult::capture(1_u8);
    let _ = unsafe { result.value_unchecked::<i8>() };
}
