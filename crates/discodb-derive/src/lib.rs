use proc_macro::TokenStream;

mod field;
mod record;

/// Derive `FieldSet` for a struct embedded into records with
/// `#[record(embed)]`.
#[proc_macro_derive(Fields, attributes(record, sql))]
pub fn derive_fields(input: TokenStream) -> TokenStream {
    record::derive_fields(input.into()).into()
}

/// Derive `FieldSet` and `Record`.
///
/// ```ignore
/// #[derive(Clone, Debug, Default, Record)]
/// #[record(table = "Widget")]
/// struct Widget {
///     #[sql("pk")]
///     id: i64,
///     #[sql("key, unique(name)")]
///     group: String,
///     #[record(labels)]
///     labels: Labels,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record, sql))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}
