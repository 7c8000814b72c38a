//! Field tag grammar.
//!
//! A tag is a comma-separated list of options:
//!
//! - `pk` primary key
//! - `key` natural key
//! - `const` never updated
//! - `fk:<table>(<field>)` foreign key, cascades on delete
//! - `unique(<group>)` member of a composite UNIQUE constraint
//! - `index(<group>)` member of a composite non-unique index
//!
//! Whitespace around options is ignored and empty options are skipped.

use crate::ident::{self, IdentError};
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// TagError
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TagError {
    #[error("option '{option}' has an empty argument")]
    EmptyArgument { option: String },

    #[error("option '{option}': {source}")]
    Ident {
        option: String,
        #[source]
        source: IdentError,
    },

    #[error("malformed foreign key '{0}', expected fk:<table>(<field>)")]
    MalformedForeignKey(String),

    #[error("malformed option '{0}', expected <name>(<group>)")]
    MalformedGroup(String),

    #[error("unknown tag option '{0}'")]
    UnknownOption(String),
}

///
/// ForeignKey
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ForeignKey {
    pub table: String,
    pub field: String,
}

impl Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.table, self.field)
    }
}

///
/// FieldTags
///
/// Parsed relational options of one field.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldTags {
    pub pk: bool,
    pub key: bool,
    pub immutable: bool,
    pub fk: Option<ForeignKey>,
    pub unique: Vec<String>,
    pub index: Vec<String>,
}

impl FieldTags {
    pub fn parse(tag: &str) -> Result<Self, TagError> {
        let mut tags = Self::default();

        for option in tag.split(',').map(str::trim).filter(|o| !o.is_empty()) {
            match option {
                "pk" => tags.pk = true,
                "key" => tags.key = true,
                "const" => tags.immutable = true,
                _ if option.starts_with("fk:") => {
                    tags.fk = Some(parse_foreign_key(option)?);
                }
                _ if option.starts_with("unique") => {
                    tags.unique.push(parse_group(option, "unique")?);
                }
                _ if option.starts_with("index") => {
                    tags.index.push(parse_group(option, "index")?);
                }
                _ => return Err(TagError::UnknownOption(option.to_string())),
            }
        }

        Ok(tags)
    }

    /// Fields that are neither the pk nor `const` are written by UPDATE.
    #[must_use]
    pub const fn is_mutable(&self) -> bool {
        !self.pk && !self.immutable
    }
}

// Split `<name>(<arg>)` and return the trimmed argument.
fn call_argument<'a>(option: &'a str, name: &str) -> Option<&'a str> {
    option
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
        .map(str::trim)
}

fn checked_ident(option: &str, value: &str) -> Result<String, TagError> {
    if value.is_empty() {
        return Err(TagError::EmptyArgument {
            option: option.to_string(),
        });
    }
    ident::validate(value).map_err(|source| TagError::Ident {
        option: option.to_string(),
        source,
    })?;

    Ok(value.to_string())
}

fn parse_group(option: &str, name: &str) -> Result<String, TagError> {
    let group = call_argument(option, name)
        .ok_or_else(|| TagError::MalformedGroup(option.to_string()))?;

    checked_ident(option, group)
}

fn parse_foreign_key(option: &str) -> Result<ForeignKey, TagError> {
    let malformed = || TagError::MalformedForeignKey(option.to_string());

    let body = option.strip_prefix("fk:").ok_or_else(malformed)?.trim();
    let open = body.find('(').ok_or_else(malformed)?;
    let table = body[..open].trim();
    let field = call_argument(&body[open..], "").ok_or_else(malformed)?;

    Ok(ForeignKey {
        table: checked_ident(option, table)?,
        field: checked_ident(option, field)?,
    })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tag_is_plain_column() {
        let tags = FieldTags::parse("").unwrap();
        assert_eq!(tags, FieldTags::default());
        assert!(tags.is_mutable());
    }

    #[test]
    fn parses_flags_with_whitespace() {
        let tags = FieldTags::parse(" pk , const,, key ").unwrap();
        assert!(tags.pk);
        assert!(tags.key);
        assert!(tags.immutable);
        assert!(!tags.is_mutable());
    }

    #[test]
    fn parses_groups_in_declaration_order() {
        let tags = FieldTags::parse("unique(a), index(by_ns), unique( b )").unwrap();
        assert_eq!(tags.unique, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(tags.index, vec!["by_ns".to_string()]);
    }

    #[test]
    fn parses_foreign_key() {
        let tags = FieldTags::parse("key, fk:Cluster(pk)").unwrap();
        assert_eq!(
            tags.fk,
            Some(ForeignKey {
                table: "Cluster".into(),
                field: "pk".into(),
            })
        );
        assert_eq!(tags.fk.unwrap().to_string(), "Cluster(pk)");
    }

    #[test]
    fn const_field_is_not_mutable() {
        assert!(!FieldTags::parse("const").unwrap().is_mutable());
        assert!(!FieldTags::parse("pk").unwrap().is_mutable());
        assert!(FieldTags::parse("key").unwrap().is_mutable());
    }

    #[test]
    fn rejects_unknown_and_malformed_options() {
        assert_eq!(
            FieldTags::parse("primary"),
            Err(TagError::UnknownOption("primary".into()))
        );
        assert_eq!(
            FieldTags::parse("unique"),
            Err(TagError::MalformedGroup("unique".into()))
        );
        assert_eq!(
            FieldTags::parse("index()"),
            Err(TagError::EmptyArgument {
                option: "index()".into()
            })
        );
        assert_eq!(
            FieldTags::parse("fk:Cluster"),
            Err(TagError::MalformedForeignKey("fk:Cluster".into()))
        );
        assert!(matches!(
            FieldTags::parse("fk:Clu-ster(pk)"),
            Err(TagError::Ident { .. })
        ));
    }
}
