use crate::{
    helper::{field_name, split_names},
    ty::{element_type, field_type},
};
use cloneforge_core::{
    config::{CopyConfig, DEFAULT_EXCLUDE_ATTRIBUTE, DEFAULT_METHOD_NAME, DEFAULT_TRIGGER},
    engine::{CopyProvider, UnitOutput, UnitProvider},
    synth::{GeneratedMethod, Statement, ValueCopy},
};
use cloneforge_schema::{
    build::Schema,
    node::{Annotation, FieldDescriptor, TypeDescriptor},
    types::TypeKey,
};
use darling::{FromDeriveInput, FromField, ast::Data, util::Ignored};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::collections::BTreeMap;
use syn::{DeriveInput, Error, Generics, Ident, Type, parse_quote};

// source path recorded for derived types
const SOURCE_PATH: &str = "src";

///
/// CopyableInput
///

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(copy), supports(struct_named))]
struct CopyableInput {
    ident: Ident,
    generics: Generics,
    data: Data<Ignored, CopyableField>,

    #[darling(default, map = "split_names")]
    exclude: Vec<String>,

    #[darling(default)]
    version: Option<String>,

    #[darling(default)]
    method: Option<String>,
}

///
/// CopyableField
///

#[derive(Debug, FromField)]
#[darling(attributes(copy))]
struct CopyableField {
    ident: Option<Ident>,
    ty: Type,

    #[darling(default)]
    skip: bool,

    #[darling(default)]
    deep: bool,

    #[darling(default)]
    version: bool,
}

// derive_copyable
pub fn derive_copyable(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };
    let input = match CopyableInput::from_derive_input(&input) {
        Ok(input) => input,
        Err(err) => return err.write_errors(),
    };

    expand(&input).unwrap_or_else(|err| err.to_compile_error())
}

fn expand(input: &CopyableInput) -> Result<TokenStream, Error> {
    let Some(fields) = input.data.as_ref().take_struct() else {
        return Err(Error::new_spanned(
            &input.ident,
            "Copyable can only be derived for structs with named fields",
        ));
    };

    let mut annotation = Annotation::marker(DEFAULT_TRIGGER);
    if !input.exclude.is_empty() {
        annotation =
            annotation.with_values(DEFAULT_EXCLUDE_ATTRIBUTE, input.exclude.iter().cloned());
    }
    let mut builder = TypeDescriptor::builder(TypeKey::new(input.ident.to_string(), SOURCE_PATH))
        .annotation(annotation);

    let mut members = BTreeMap::new();
    for field in fields.fields {
        let Some(ident) = &field.ident else {
            continue;
        };
        let name = field_name(ident);

        let mut descriptor = FieldDescriptor::new(name.clone(), field_type(&field.ty));
        if field.skip {
            descriptor = descriptor.set_transient();
        }
        if field.version {
            descriptor = descriptor.set_version();
        }
        if field.deep {
            descriptor = descriptor.annotated(DEFAULT_TRIGGER);
        }

        members.insert(name, field);
        builder = builder.field(descriptor);
    }
    let descriptor = builder
        .build()
        .map_err(|err| Error::new_spanned(&input.ident, err))?;

    let config = CopyConfig {
        method_name: input
            .method
            .clone()
            .unwrap_or_else(|| DEFAULT_METHOD_NAME.to_string()),
        version_field: input.version.clone(),
        ..CopyConfig::default()
    };
    config
        .validate()
        .map_err(|err| Error::new_spanned(&input.ident, err))?;

    let mut schema = Schema::new();
    schema
        .insert(descriptor.clone())
        .map_err(|err| Error::new_spanned(&input.ident, err))?;
    let computation = CopyProvider::new(config)
        .compute(&descriptor, &schema.snapshot())
        .map_err(|err| Error::new_spanned(&input.ident, err))?;

    // no participating fields, nothing to generate
    let Some(UnitOutput::Generated(method)) = computation.output else {
        return Ok(TokenStream::new());
    };

    Ok(lower(input, &method, &members))
}

// members maps descriptor field names to the struct fields they came from
type Members<'a> = BTreeMap<String, &'a CopyableField>;

fn lower(input: &CopyableInput, method: &GeneratedMethod, members: &Members<'_>) -> TokenStream {
    let ident = &input.ident;
    let generics = bounded_generics(input, method, members);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let method_ident = format_ident!("{}", method.name);
    let body = method
        .statements
        .iter()
        .map(|statement| lower_statement(statement, &method_ident, members));

    quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            #[must_use]
            pub fn #method_ident(&self) -> Self {
                #(#body)*
            }
        }
    }
}

// bounded_generics
// Generic structs get the bounds the generated body relies on: a default
// value to start from, and `Clone` for every field or element it clones.
fn bounded_generics(
    input: &CopyableInput,
    method: &GeneratedMethod,
    members: &Members<'_>,
) -> Generics {
    let mut generics = input.generics.clone();
    if generics.params.is_empty() {
        return generics;
    }

    let ident = &input.ident;
    let (_, ty_generics, _) = input.generics.split_for_impl();
    let predicates = &mut generics.make_where_clause().predicates;
    predicates.push(parse_quote!(#ident #ty_generics: ::core::default::Default));

    for statement in &method.statements {
        let cloned = match statement {
            Statement::Assign {
                field,
                copy: ValueCopy::Alias,
            } => members.get(field).map(|member| &member.ty),
            Statement::CopyElements {
                field,
                copy: ValueCopy::Value | ValueCopy::Alias,
                ..
            } => members.get(field).and_then(|member| element_type(&member.ty)),
            _ => None,
        };
        if let Some(ty) = cloned {
            predicates.push(parse_quote!(#ty: ::core::clone::Clone));
        }
    }

    generics
}

fn lower_statement(statement: &Statement, method: &Ident, members: &Members<'_>) -> TokenStream {
    let field = statement
        .field()
        .and_then(|name| members.get(name))
        .and_then(|member| member.ident.as_ref());

    match (statement, field) {
        (Statement::NewInstance { .. }, _) => quote! {
            let mut p: Self = ::core::default::Default::default();
        },
        (Statement::Assign { copy, .. }, Some(field)) => {
            let value = match copy {
                ValueCopy::Value => quote!(self.#field),
                ValueCopy::Alias => quote!(::core::clone::Clone::clone(&self.#field)),
                ValueCopy::Deep => quote!(self.#field.#method()),
            };

            quote! {
                p.#field = #value;
            }
        }
        (Statement::CopyElements { copy, .. }, Some(field)) => {
            let value = match copy {
                ValueCopy::Value | ValueCopy::Alias => quote!(::core::clone::Clone::clone(element)),
                ValueCopy::Deep => quote!(element.#method()),
            };

            quote! {
                for element in &self.#field {
                    ::core::iter::Extend::extend(&mut p.#field, ::core::iter::once(#value));
                }
            }
        }
        (Statement::Return, _) => quote!(p),
        _ => TokenStream::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(input: TokenStream) -> String {
        derive_copyable(input).to_string()
    }

    #[test]
    fn lowers_each_copy_strategy() {
        let actual = expand_str(quote! {
            #[copy(exclude = "cache")]
            struct Person {
                age: u32,
                #[copy(deep)]
                home: Address,
                #[copy(deep)]
                addresses: Vec<Address>,
                tags: Vec<u16>,
                nickname: String,
                cache: String,
                #[copy(skip)]
                scratch: u64,
                #[copy(version)]
                version: u64,
                bytes: [u8; 4],
            }
        });

        let expected = quote! {
            impl Person {
                #[must_use]
                pub fn copy(&self) -> Self {
                    let mut p: Self = ::core::default::Default::default();
                    for element in &self.addresses {
                        ::core::iter::Extend::extend(
                            &mut p.addresses,
                            ::core::iter::once(element.copy()),
                        );
                    }
                    p.age = self.age;
                    p.home = self.home.copy();
                    p.nickname = ::core::clone::Clone::clone(&self.nickname);
                    for element in &self.tags {
                        ::core::iter::Extend::extend(
                            &mut p.tags,
                            ::core::iter::once(::core::clone::Clone::clone(element)),
                        );
                    }
                    p
                }
            }
        };

        assert_eq!(actual, expected.to_string());
    }

    #[test]
    fn method_can_be_renamed() {
        let actual = expand_str(quote! {
            #[copy(method = "duplicate")]
            struct Point<T> {
                x: i32,
                label: T,
            }
        });

        let compact = actual.split_whitespace().collect::<String>();
        assert!(compact.contains("impl<T>Point<T>"), "{actual}");
        assert!(compact.contains("pubfnduplicate(&self)->Self"), "{actual}");
    }

    #[test]
    fn generic_structs_are_bounded_by_what_the_body_needs() {
        let actual = expand_str(quote! {
            struct Wrapper<T> {
                label: T,
                items: Vec<T>,
                count: u32,
            }
        });

        let compact = actual.split_whitespace().collect::<String>();
        assert!(compact.contains("impl<T>Wrapper<T>where"), "{actual}");
        assert!(compact.contains("Wrapper<T>:::core::default::Default"), "{actual}");
        assert!(compact.contains("T:::core::clone::Clone"), "{actual}");
        assert!(!compact.contains("u32:"), "copied scalars need no bound: {actual}");
    }

    #[test]
    fn nothing_is_generated_without_participating_fields() {
        let actual = expand_str(quote! {
            struct Marker {
                #[copy(skip)]
                cache: u8,
            }
        });

        assert!(actual.is_empty(), "{actual}");
    }

    #[test]
    fn rejects_non_struct_input() {
        let actual = expand_str(quote! {
            enum Shape { Circle, Square }
        });

        assert!(actual.contains("compile_error"), "{actual}");
    }
}
