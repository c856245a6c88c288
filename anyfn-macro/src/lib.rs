//! Procedural macros for the `anyfn` crate. Use them through `anyfn` rather than directly.

extern crate proc_macro;

use {
    proc_macro::TokenStream,
    proc_macro2::{Span, TokenStream as TokenStream2},
    proc_macro_crate::FoundCrate,
    quote::{format_ident, quote},
    syn::{parse_macro_input, parse_quote, DeriveInput, GenericParam, LitInt},
};

/// Implement `IntoAnyFunction` for callables of every arity from zero up to and including the
/// given number. Only meaningful inside the `anyfn` crate itself.
#[proc_macro]
pub fn impl_signatures(input: TokenStream) -> TokenStream {
    let max_arity = parse_macro_input!(input as LitInt);
    let max_arity = match max_arity.base10_parse::<usize>() {
        Ok(n) => n,
        Err(error) => return error.to_compile_error().into(),
    };
    (0..=max_arity)
        .map(signature_impl)
        .collect::<TokenStream2>()
        .into()
}

fn signature_impl(arity: usize) -> TokenStream2 {
    let params = (0..arity)
        .map(|i| format_ident!("A{}", i))
        .collect::<Vec<_>>();
    let indices = 0..arity;
    let args = if arity == 0 {
        quote!(_args)
    } else {
        quote!(args)
    };
    let call = quote!((*func)(#(<#params as crate::Parameter>::fetch(&args[#indices])),*));
    let call = if arity == 0 {
        call
    } else {
        quote!(unsafe { #call })
    };

    quote! {
        #[allow(unused_qualifications)]
        impl<'a, Func, Ret, #(#params),*> crate::IntoAnyFunction<'a, fn(#(#params),*) -> Ret> for Func
        where
            Func: FnMut(#(#params),*) -> Ret + 'a,
            Ret: crate::ReturnValue<'a>,
            #(#params: crate::Parameter,)*
        {
            fn into_any_function(self) -> crate::AnyFunction<'a> {
                let func = ::core::cell::RefCell::new(self);
                crate::AnyFunction::from_parts(
                    move |#args: &[crate::Arg<'_>]| {
                        let mut func = func
                            .try_borrow_mut()
                            .map_err(|_| crate::InvokeError::Reentrant)?;
                        Ok(crate::ReturnValue::into_result(#call))
                    },
                    vec![#(<#params as crate::Describe>::descriptor()),*],
                    <Ret as crate::Describe>::descriptor(),
                )
            }
        }
    }
}

/// Declare a struct or enum as passed and returned by value. See `anyfn::Value`.
#[proc_macro_derive(Value)]
pub fn derive_value(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match value_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn value_impl(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    let c = anyfn_crate();
    let name = &input.ident;

    for param in input.generics.params.iter_mut() {
        match param {
            GenericParam::Type(ty) => {
                ty.bounds.push(parse_quote!(::core::clone::Clone));
                ty.bounds.push(parse_quote!('static));
            }
            GenericParam::Lifetime(lifetime) => {
                return Err(syn::Error::new_spanned(
                    lifetime,
                    "value types must be 'static and cannot have lifetime parameters",
                ))
            }
            GenericParam::Const(_) => {}
        }
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut with_lifetime = input.generics.clone();
    with_lifetime.params.insert(0, parse_quote!('__anyfn));
    let (lifetime_impl_generics, _, _) = with_lifetime.split_for_impl();

    Ok(quote! {
        unsafe impl #impl_generics #c::Describe for #name #ty_generics #where_clause {
            fn descriptor() -> #c::TypeDescriptor {
                #c::TypeDescriptor::value::<Self>()
            }
        }

        impl #impl_generics #c::Parameter for #name #ty_generics #where_clause {
            unsafe fn fetch(arg: &#c::Arg<'_>) -> Self {
                #c::__private::clone_arg::<Self>(arg)
            }
        }

        impl #lifetime_impl_generics #c::ReturnValue<'__anyfn> for #name #ty_generics #where_clause {
            fn into_result(self) -> #c::AnyResult<'__anyfn> {
                #c::AnyResult::owned(self)
            }
        }

        impl #lifetime_impl_generics #c::Extract<'__anyfn> for #name #ty_generics #where_clause {
            unsafe fn extract(result: &#c::AnyResult<'__anyfn>) -> Self {
                #c::__private::clone_result::<Self>(result)
            }
        }
    })
}

/// The path to the `anyfn` crate as seen from the crate being compiled.
fn anyfn_crate() -> TokenStream2 {
    match proc_macro_crate::crate_name("anyfn") {
        Ok(FoundCrate::Name(name)) => {
            let name = syn::Ident::new(&name, Span::call_site());
            quote!(::#name)
        }
        // `anyfn`'s own doc tests and integration tests see it as an ordinary dependency.
        Ok(FoundCrate::Itself) | Err(_) => quote!(anyfn),
    }
}
