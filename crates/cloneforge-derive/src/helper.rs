use syn::Ident;

#[must_use]
/// Split a comma-separated list of field names for Darling parsing.
pub fn split_names(s: String) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Field name as it appears in the schema, without any raw prefix.
pub fn field_name(ident: &Ident) -> String {
    use syn::ext::IdentExt;

    ident.unraw().to_string()
}
