use cloneforge_schema::types::{FieldType, Primitive, is_common_collection};
use quote::ToTokens;
use syn::{AngleBracketedGenericArguments, GenericArgument, PathArguments, Type};

/// Map a Rust field type onto the declared-type model.
///
/// Scalars become primitives, arrays become arrays, and a known collection
/// with exactly one type argument becomes a collection. Everything else is
/// an opaque named type.
pub fn field_type(ty: &Type) -> FieldType {
    match ty {
        Type::Array(array) => FieldType::array(field_type(&array.elem)),
        Type::Group(group) => field_type(&group.elem),
        Type::Paren(paren) => field_type(&paren.elem),
        Type::Path(path) if path.qself.is_none() => {
            let Some(last) = path.path.segments.last() else {
                return named(ty);
            };
            let ident = last.ident.to_string();

            match &last.arguments {
                PathArguments::None => Primitive::from_name(&ident)
                    .map_or_else(|| named(ty), FieldType::Primitive),
                PathArguments::AngleBracketed(args) if is_common_collection(&ident) => {
                    match single_type_argument(args) {
                        Some(element) => FieldType::collection(ident, field_type(element)),
                        None => named(ty),
                    }
                }
                _ => named(ty),
            }
        }
        _ => named(ty),
    }
}

/// Element type of a collection field as written, e.g. `T` in `Vec<T>`.
pub fn element_type(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Group(group) => element_type(&group.elem),
        Type::Paren(paren) => element_type(&paren.elem),
        Type::Path(path) if path.qself.is_none() => match &path.path.segments.last()?.arguments {
            PathArguments::AngleBracketed(args) => single_type_argument(args),
            _ => None,
        },
        _ => None,
    }
}

fn single_type_argument(args: &AngleBracketedGenericArguments) -> Option<&Type> {
    let mut types = args.args.iter().filter_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    });

    match (types.next(), types.next()) {
        (Some(element), None) => Some(element),
        _ => None,
    }
}

fn named(ty: &Type) -> FieldType {
    let text = ty.to_token_stream().to_string().replace(' ', "");

    FieldType::named(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn maps_scalars_collections_and_arrays() {
        let cases: [(Type, FieldType); 6] = [
            (parse_quote!(u32), FieldType::Primitive(Primitive::U32)),
            (parse_quote!(bool), FieldType::Primitive(Primitive::Bool)),
            (
                parse_quote!(Vec<Address>),
                FieldType::collection("Vec", FieldType::named("Address")),
            ),
            (
                parse_quote!(std::collections::BTreeSet<i64>),
                FieldType::collection("BTreeSet", FieldType::Primitive(Primitive::I64)),
            ),
            (
                parse_quote!([u8; 4]),
                FieldType::array(FieldType::Primitive(Primitive::U8)),
            ),
            (parse_quote!(String), FieldType::named("String")),
        ];

        for (ty, expected) in cases {
            assert_eq!(field_type(&ty), expected);
        }
    }

    #[test]
    fn element_types_are_taken_as_written() {
        let element = |ty: Type| element_type(&ty).map(|e| e.to_token_stream().to_string());

        assert_eq!(element(parse_quote!(Vec<T>)).as_deref(), Some("T"));
        assert_eq!(element(parse_quote!(std::collections::BTreeSet<Key>)).as_deref(), Some("Key"));
        assert_eq!(element(parse_quote!(HashMap<String, T>)), None);
        assert_eq!(element(parse_quote!(u32)), None);
    }

    #[test]
    fn other_generics_stay_opaque() {
        let ty: Type = parse_quote!(HashMap<String, Address>);
        assert_eq!(field_type(&ty), FieldType::named("HashMap<String,Address>"));

        let ty: Type = parse_quote!(Option<Address>);
        assert_eq!(field_type(&ty), FieldType::named("Option<Address>"));
    }
}
