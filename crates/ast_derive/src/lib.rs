//! `#[derive(WalkAst)]` for `goiface-syntax` AST nodes.
//!
//! The generated `crate::walk::Walk` impl walks every field in declaration
//! order. Fields marked `#[walk(skip)]` are left out, which is how leaf data
//! without a `Walk` impl can live inside a node.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote, quote_spanned};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Field, Fields, Index};

#[proc_macro_derive(WalkAst, attributes(walk))]
pub fn derive_walk_ast(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let span = input.span();

    let body = match walk_body(&input.data) {
        Ok(body) => body,
        Err(err) => return err.into_compile_error().into(),
    };

    quote_spanned! {span =>
        impl<'ast> crate::walk::Walk<'ast> for #name {
            #[inline(always)]
            #[allow(unused_variables)]
            fn walk<V: crate::walk::Visitor<'ast> + ?Sized>(
                &self,
                a: &'ast crate::ast::AstArena,
                v: &mut V
            ) {
                #body
            }
        }
    }
    .into()
}

fn walk_body(data: &Data) -> syn::Result<TokenStream2> {
    match data {
        Data::Struct(data) => {
            let mut calls = Vec::new();
            for (i, field) in data.fields.iter().enumerate() {
                if is_skipped(field)? {
                    continue;
                }
                let access = match &field.ident {
                    Some(ident) => quote! { &self.#ident },
                    None => {
                        let index = Index::from(i);
                        quote! { &self.#index }
                    }
                };
                calls.push(quote! { crate::walk::Walk::walk(#access, a, v); });
            }
            Ok(quote! { #(#calls)* })
        }
        Data::Enum(data) => {
            let arms = data
                .variants
                .iter()
                .map(|variant| variant_arm(&variant.ident, &variant.fields))
                .collect::<syn::Result<Vec<_>>>()?;
            Ok(quote! {
                match self {
                    #(#arms)*
                }
            })
        }
        Data::Union(u) => Err(syn::Error::new_spanned(
            u.union_token,
            "WalkAst cannot be derived for unions",
        )),
    }
}

fn variant_arm(variant: &syn::Ident, fields: &Fields) -> syn::Result<TokenStream2> {
    match fields {
        Fields::Unit => Ok(quote! { Self::#variant => {} }),
        Fields::Named(named) => {
            let mut bindings = Vec::new();
            let mut calls = Vec::new();
            for field in &named.named {
                let Some(ident) = field.ident.as_ref() else {
                    continue;
                };
                bindings.push(ident);
                if !is_skipped(field)? {
                    calls.push(quote! { crate::walk::Walk::walk(#ident, a, v); });
                }
            }
            Ok(quote! {
                Self::#variant { #(#bindings),* } => {
                    #(#calls)*
                }
            })
        }
        Fields::Unnamed(unnamed) => {
            let mut bindings = Vec::new();
            let mut calls = Vec::new();
            for (i, field) in unnamed.unnamed.iter().enumerate() {
                let var = format_ident!("f{}", i);
                if !is_skipped(field)? {
                    calls.push(quote! { crate::walk::Walk::walk(#var, a, v); });
                }
                bindings.push(var);
            }
            Ok(quote! {
                Self::#variant(#(#bindings),*) => {
                    #(#calls)*
                }
            })
        }
    }
}

fn is_skipped(field: &Field) -> syn::Result<bool> {
    let mut skip = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("walk")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}
