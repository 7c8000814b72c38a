use discodb_schema::{FieldKind, FieldTags, ForeignKey, TagError};

///
/// ColumnDef
///
/// Raw, macro-generated column definition. The tag is kept as written and
/// parsed when the schema is registered.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub tag: &'static str,
    pub kind: FieldKind,
}

impl ColumnDef {
    #[must_use]
    pub const fn new(name: &'static str, tag: &'static str, kind: FieldKind) -> Self {
        Self { name, tag, kind }
    }
}

///
/// FieldDescriptor
///
/// One column with its relational role.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub tags: FieldTags,
}

impl FieldDescriptor {
    pub fn parse(def: &ColumnDef) -> Result<Self, TagError> {
        Ok(Self {
            name: def.name,
            kind: def.kind,
            tags: FieldTags::parse(def.tag)?,
        })
    }

    #[must_use]
    pub const fn is_pk(&self) -> bool {
        self.tags.pk
    }

    #[must_use]
    pub const fn is_key(&self) -> bool {
        self.tags.key
    }

    #[must_use]
    pub const fn is_mutable(&self) -> bool {
        self.tags.is_mutable()
    }

    #[must_use]
    pub const fn fk(&self) -> Option<&ForeignKey> {
        self.tags.fk.as_ref()
    }
}
