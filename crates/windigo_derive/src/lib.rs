//! Derive macros for windigo fixtures.
//!
//! These macros discover a fixture's structure so authors don't register it by hand:
//! - `Fixture`: implements `windigo::Fixture`, embedding every field tagged `#[fixture(embed)]` in declaration order
//! - `fixture_methods`: implements `windigo::FixtureMethods` for an inherent impl block, forwarding every method named
//!   `setup`, `tear_down` or `test_*`

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Data, DeriveInput, Error, Field, ImplItem, Index, ItemImpl, Member, parse_macro_input};

const SETUP: &str = "setup";
const TEAR_DOWN: &str = "tear_down";
const TEST_PREFIX: &str = "test_";

/// Implements `windigo::Fixture` for a struct.
///
/// # Example
/// ```ignore
/// #[derive(Default, Fixture)]
/// struct ClonedSet {
///     #[fixture(embed)]
///     populated: PopulatedSet,
///     copy: IntSet,
/// }
///
/// // Generates:
/// impl windigo::Fixture for ClonedSet {
///     fn describe(builder: &mut windigo::FixtureBuilder<Self>) {
///         builder.embed(|fixture: &mut Self| &mut fixture.populated);
///         <Self as windigo::FixtureMethods>::methods(builder);
///     }
/// }
/// ```
///
/// The struct also needs a `#[fixture_methods]` impl block, even an empty one.
#[proc_macro_derive(Fixture, attributes(fixture))]
pub fn derive_fixture(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_fixture(&input).unwrap_or_else(Error::into_compile_error).into()
}

fn expand_fixture(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => return Err(Error::new_spanned(name, format!("`{name}` is not a struct"))),
    };

    let mut embedded = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        if !is_embedded(field)? {
            continue;
        }
        embedded.push(match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index::from(index)),
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::windigo::Fixture for #name #ty_generics #where_clause {
            fn describe(builder: &mut ::windigo::FixtureBuilder<Self>) {
                #( builder.embed(|fixture: &mut Self| &mut fixture.#embedded); )*
                <Self as ::windigo::FixtureMethods>::methods(builder);
            }
        }
    })
}

fn is_embedded(field: &Field) -> syn::Result<bool> {
    let mut embedded = false;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("fixture")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("embed") {
                embedded = true;
                Ok(())
            } else {
                Err(meta.error("unsupported fixture attribute, expected `embed`"))
            }
        })?;
    }
    Ok(embedded)
}

/// Implements `windigo::FixtureMethods` from an inherent impl block.
///
/// Methods named `setup`, `tear_down` or starting with `test_` are registered; they must take `&self` or
/// `&mut self` plus a `&mut TestContext`. Any other method is left alone.
///
/// # Example
/// ```ignore
/// #[fixture_methods]
/// impl PopulatedSet {
///     fn setup(&mut self, t: &mut TestContext) { /* ... */ }
///     fn test_contains_all(&self, t: &mut TestContext) { /* ... */ }
///     fn helper(&self) -> usize { 3 }
/// }
///
/// // Generates, next to the unchanged impl block:
/// impl windigo::FixtureMethods for PopulatedSet {
///     fn methods(builder: &mut windigo::FixtureBuilder<Self>) {
///         builder.method("setup", |fixture: &mut Self, t: &mut windigo::TestContext| { Self::setup(fixture, t); });
///         builder.method("test_contains_all", |fixture: &mut Self, t: &mut windigo::TestContext| {
///             Self::test_contains_all(fixture, t);
///         });
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn fixture_methods(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return Error::new(Span::call_site(), "`#[fixture_methods]` takes no arguments")
            .into_compile_error()
            .into();
    }
    let item = parse_macro_input!(input as ItemImpl);
    expand_methods(&item).unwrap_or_else(Error::into_compile_error).into()
}

fn expand_methods(item: &ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(Error::new_spanned(
            path,
            "`#[fixture_methods]` must be applied to an inherent impl block",
        ));
    }

    let mut registrations = Vec::new();
    for impl_item in &item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let ident = &method.sig.ident;
        let name = ident.to_string();
        if !is_fixture_method(&name) {
            continue;
        }
        match method.sig.receiver() {
            Some(receiver) if receiver.reference.is_some() => {}
            _ => {
                return Err(Error::new_spanned(
                    &method.sig,
                    format!("fixture method `{name}` must take `&self` or `&mut self`"),
                ));
            }
        }
        registrations.push(quote! {
            builder.method(#name, |fixture: &mut Self, t: &mut ::windigo::TestContext| {
                Self::#ident(fixture, t);
            });
        });
    }

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();
    Ok(quote! {
        #item

        impl #impl_generics ::windigo::FixtureMethods for #self_ty #where_clause {
            #[allow(unused_variables)]
            fn methods(builder: &mut ::windigo::FixtureBuilder<Self>) {
                #(#registrations)*
            }
        }
    })
}

fn is_fixture_method(name: &str) -> bool {
    name == SETUP || name == TEAR_DOWN || name.starts_with(TEST_PREFIX)
}
