use darling::FromField;
use discodb_schema::FieldTags;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Error, Ident, LitStr, Type, ext::IdentExt};

/// Scalar types with a `ColumnValue` impl in the runtime.
const SCALARS: &[&str] = &[
    "String", "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize",
];

///
/// RecordField
///

#[derive(Debug, FromField)]
#[darling(attributes(record), forward_attrs(sql))]
pub struct RecordField {
    pub ident: Option<Ident>,
    pub ty: Type,
    pub attrs: Vec<Attribute>,

    /// Column name when it differs from the field name.
    #[darling(default)]
    pub column: Option<String>,

    /// Flatten the columns of a nested `Fields` struct here.
    #[darling(default)]
    pub embed: bool,

    /// The record's label set; not a column.
    #[darling(default)]
    pub labels: bool,
}

///
/// FieldTokens
/// Generated statements for one field, one per `FieldSet` method.
///

#[derive(Default)]
pub struct FieldTokens {
    pub columns: TokenStream,
    pub pull: TokenStream,
    pub push: TokenStream,
}

impl RecordField {
    pub fn ident(&self) -> syn::Result<&Ident> {
        self.ident
            .as_ref()
            .ok_or_else(|| Error::new_spanned(&self.ty, "record fields must be named"))
    }

    pub fn expand(&self) -> syn::Result<FieldTokens> {
        let ident = self.ident()?;
        let tag = self.tag()?;

        if self.embed && self.labels {
            return Err(Error::new_spanned(
                ident,
                "a field cannot be both `embed` and `labels`",
            ));
        }
        if (self.embed || self.labels) && (tag.is_some() || self.column.is_some()) {
            return Err(Error::new_spanned(
                ident,
                "`embed` and `labels` fields take no #[sql] tag or column name",
            ));
        }

        if self.labels {
            return Ok(FieldTokens::default());
        }

        let ty = &self.ty;
        if self.embed {
            return Ok(FieldTokens {
                columns: quote! {
                    <#ty as ::discodb::model::FieldSet>::columns(columns);
                },
                pull: quote! {
                    ::discodb::model::FieldSet::pull(&self.#ident, cells)?;
                },
                push: quote! {
                    ::discodb::model::FieldSet::push(&mut self.#ident, cells)?;
                },
            });
        }

        let name = self
            .column
            .clone()
            .unwrap_or_else(|| ident.unraw().to_string());
        let tag = tag.map_or_else(String::new, |lit| lit.value());

        if is_scalar(ty) {
            Ok(FieldTokens {
                columns: quote! {
                    columns.push(::discodb::model::ColumnDef::new(
                        #name,
                        #tag,
                        <#ty as ::discodb::bind::ColumnValue>::KIND,
                    ));
                },
                pull: quote! {
                    cells.push(::discodb::bind::ColumnValue::to_cell(&self.#ident, #name)?);
                },
                push: quote! {
                    self.#ident = ::discodb::bind::take(cells, #name)?;
                },
            })
        } else {
            // Kept as a column so registration can reject it by name.
            let type_name = quote!(#ty).to_string().replace(' ', "");

            Ok(FieldTokens {
                columns: quote! {
                    columns.push(::discodb::model::ColumnDef::new(
                        #name,
                        #tag,
                        ::discodb::model::FieldKind::Unsupported { type_name: #type_name },
                    ));
                },
                pull: quote! {
                    cells.push(::discodb::bind::Cell::Unsupported);
                },
                push: quote! {
                    ::discodb::bind::skip(cells, #name)?;
                },
            })
        }
    }

    // The #[sql("...")] tag, checked against the tag grammar.
    fn tag(&self) -> syn::Result<Option<LitStr>> {
        let mut found: Option<LitStr> = None;

        for attr in self.attrs.iter().filter(|a| a.path().is_ident("sql")) {
            if found.is_some() {
                return Err(Error::new_spanned(attr, "duplicate #[sql] attribute"));
            }

            let lit: LitStr = attr.parse_args()?;
            FieldTags::parse(&lit.value()).map_err(|err| Error::new(lit.span(), err))?;
            found = Some(lit);
        }

        Ok(found)
    }
}

fn is_scalar(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    if path.qself.is_some() {
        return false;
    }

    path.path.segments.last().is_some_and(|segment| {
        segment.arguments.is_none() && SCALARS.iter().any(|s| segment.ident == s)
    })
}
