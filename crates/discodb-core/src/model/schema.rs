use crate::{
    bind::Cell,
    db::label::LABEL_TABLE,
    error::Error,
    model::{FieldDescriptor, Record, ValidationError},
};
use discodb_schema::ident;
use std::any::type_name;

///
/// Group
///
/// Named set of field positions forming one UNIQUE constraint or index.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Group<'a> {
    pub name: &'a str,
    pub fields: Vec<usize>,
}

///
/// TableSchema
///
/// Flattened field descriptors of one record type, in declaration order.
/// Positions into `fields` are the only way statements refer to columns.
///

#[derive(Clone, Debug)]
pub struct TableSchema {
    table: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl TableSchema {
    /// Extract descriptors for `T`.
    pub fn of<T: Record>() -> Result<Self, Error> {
        let mut columns = Vec::new();
        T::columns(&mut columns);

        if columns.is_empty() {
            return Err(Error::InvalidModel {
                type_name: type_name::<T>(),
                reason: "record must be a struct with at least one column".to_string(),
            });
        }

        let fields = columns
            .iter()
            .map(|def| {
                FieldDescriptor::parse(def).map_err(|source| ValidationError::Tag {
                    table: T::TABLE,
                    field: def.name,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            table: T::TABLE,
            fields,
        })
    }

    /// Check every descriptor before any SQL is built from them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let table = self.table;
        let ident_err = |name: &str, source| ValidationError::Ident {
            table,
            name: name.to_string(),
            source,
        };

        ident::validate(table).map_err(|e| ident_err(table, e))?;
        if table == LABEL_TABLE {
            return Err(ValidationError::ReservedName {
                table,
                name: table.to_string(),
            });
        }

        let mut pk: Option<&'static str> = None;
        for (i, field) in self.fields.iter().enumerate() {
            if !field.kind.is_supported() {
                return Err(ValidationError::UnsupportedKind {
                    table,
                    field: field.name,
                    kind: field.kind,
                });
            }

            ident::validate(field.name).map_err(|e| ident_err(field.name, e))?;
            if ident::is_reserved(field.name) {
                return Err(ValidationError::ReservedName {
                    table,
                    name: field.name.to_string(),
                });
            }

            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(ValidationError::DuplicateColumn {
                    table,
                    column: field.name,
                });
            }

            if field.is_pk() {
                if let Some(first) = pk {
                    return Err(ValidationError::MultiplePrimaryKeys {
                        table,
                        first,
                        second: field.name,
                    });
                }
                pk = Some(field.name);
            }
        }

        Ok(())
    }

    #[must_use]
    pub const fn table(&self) -> &'static str {
        self.table
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, position: usize) -> &FieldDescriptor {
        &self.fields[position]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of the primary key field.
    #[must_use]
    pub fn pk(&self) -> Option<usize> {
        self.fields.iter().position(FieldDescriptor::is_pk)
    }

    /// Positions of the natural key fields.
    #[must_use]
    pub fn keys(&self) -> Vec<usize> {
        self.positions(FieldDescriptor::is_key)
    }

    /// Positions written by UPDATE.
    #[must_use]
    pub fn mutable(&self) -> Vec<usize> {
        self.positions(FieldDescriptor::is_mutable)
    }

    /// Fields identifying one row for UPDATE and DELETE: the pk if there is
    /// one, else every natural key.
    #[must_use]
    pub fn identity(&self) -> Vec<usize> {
        self.pk().map_or_else(|| self.keys(), |pk| vec![pk])
    }

    /// Fields identifying one row for GET: the pk when it is set, else the
    /// natural keys, else the (unset) pk.
    #[must_use]
    pub fn lookup(&self, cells: &[Cell]) -> Vec<usize> {
        match self.pk() {
            Some(pk) if !cells[pk].is_empty() => vec![pk],
            pk => {
                let keys = self.keys();
                if keys.is_empty() {
                    pk.into_iter().collect()
                } else {
                    keys
                }
            }
        }
    }

    #[must_use]
    pub fn unique_groups(&self) -> Vec<Group<'_>> {
        self.groups(|f| &f.tags.unique)
    }

    #[must_use]
    pub fn index_groups(&self) -> Vec<Group<'_>> {
        self.groups(|f| &f.tags.index)
    }

    fn positions(&self, pred: impl Fn(&FieldDescriptor) -> bool) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| pred(f))
            .map(|(i, _)| i)
            .collect()
    }

    // Groups come out in first-appearance order so generated DDL is stable.
    fn groups<'a>(
        &'a self,
        names: impl Fn(&'a FieldDescriptor) -> &'a Vec<String>,
    ) -> Vec<Group<'a>> {
        let mut groups: Vec<Group<'a>> = Vec::new();

        for (i, field) in self.fields.iter().enumerate() {
            for name in names(field) {
                match groups.iter_mut().find(|g| g.name == name.as_str()) {
                    Some(group) => group.fields.push(i),
                    None => groups.push(Group {
                        name: name.as_str(),
                        fields: vec![i],
                    }),
                }
            }
        }

        groups
    }
}
