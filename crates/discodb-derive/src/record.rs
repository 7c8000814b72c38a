use crate::field::RecordField;
use darling::{FromDeriveInput, ast::Data};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Error, Generics, Ident};

///
/// RecordInput
///

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(record), supports(struct_named))]
struct RecordInput {
    ident: Ident,
    generics: Generics,
    data: Data<(), RecordField>,

    /// Table name; defaults to the struct name.
    #[darling(default)]
    table: Option<String>,
}

// derive_fields
pub fn derive_fields(input: TokenStream) -> TokenStream {
    expand(input, false).unwrap_or_else(darling::Error::write_errors)
}

// derive_record
pub fn derive_record(input: TokenStream) -> TokenStream {
    expand(input, true).unwrap_or_else(darling::Error::write_errors)
}

fn expand(input: TokenStream, record: bool) -> darling::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let input = RecordInput::from_derive_input(&input)?;

    let Data::Struct(fields) = &input.data else {
        return Err(darling::Error::unsupported_shape("enum").with_span(&input.ident));
    };

    let mut errors = darling::Error::accumulator();
    let mut columns = Vec::new();
    let mut pull = Vec::new();
    let mut push = Vec::new();
    let mut labels: Option<&Ident> = None;

    for field in fields.iter() {
        if let Some(tokens) = errors.handle(field.expand().map_err(darling::Error::from)) {
            columns.push(tokens.columns);
            pull.push(tokens.pull);
            push.push(tokens.push);
        }

        if field.labels {
            let Some(ident) = errors.handle(field.ident().map_err(darling::Error::from)) else {
                continue;
            };
            if !record {
                errors.push(
                    Error::new_spanned(ident, "`labels` fields are only allowed on records")
                        .into(),
                );
            } else if labels.is_some() {
                errors.push(Error::new_spanned(ident, "duplicate `labels` field").into());
            } else {
                labels = Some(ident);
            }
        }
    }

    let ident = &input.ident;
    let table = input.table.clone().unwrap_or_else(|| ident.to_string());
    if !record && input.table.is_some() {
        errors.push(
            Error::new_spanned(ident, "`table` only applies to #[derive(Record)]").into(),
        );
    }
    if let Err(err) = discodb_schema::ident::validate(&table) {
        errors.push(Error::new_spanned(ident, format!("table '{table}': {err}")).into());
    }

    errors.finish()?;

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let field_set = quote! {
        #[allow(unused_variables)]
        impl #impl_generics ::discodb::model::FieldSet for #ident #ty_generics #where_clause {
            fn columns(columns: &mut ::std::vec::Vec<::discodb::model::ColumnDef>) {
                #(#columns)*
            }

            fn pull(
                &self,
                cells: &mut ::std::vec::Vec<::discodb::bind::Cell>,
            ) -> ::std::result::Result<(), ::discodb::bind::BindError> {
                #(#pull)*
                ::std::result::Result::Ok(())
            }

            fn push(
                &mut self,
                cells: &mut ::discodb::bind::CellIter,
            ) -> ::std::result::Result<(), ::discodb::bind::BindError> {
                #(#push)*
                ::std::result::Result::Ok(())
            }
        }
    };

    if !record {
        return Ok(field_set);
    }

    let labels_fn = labels.map(|field| {
        quote! {
            fn labels(&self) -> ::discodb::model::Labels {
                ::std::clone::Clone::clone(&self.#field)
            }
        }
    });

    Ok(quote! {
        #field_set

        impl #impl_generics ::discodb::model::Record for #ident #ty_generics #where_clause {
            const TABLE: &'static str = #table;

            #labels_fn
        }
    })
}
