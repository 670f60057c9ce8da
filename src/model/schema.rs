use serde::{Deserialize, Serialize};

/// Semantic type of a declared field, before it is mapped to a column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Timestamp,
    /// Ordered collection of another entity, realized through a junction table
    Many,
    /// A type the column mapper has no rule for
    Other(&'static str),
}

/// One field of a declared model, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub unique: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            unique: false,
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelShape {
    Record(&'static [FieldDef]),
    /// A bare value with no fields; cannot become a table
    Scalar(FieldKind),
}

/// Static schema description of an entity type.
///
/// Entities declare this once as an associated constant instead of having
/// their layout inspected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDef {
    pub name: &'static str,
    pub shape: ModelShape,
}

impl ModelDef {
    pub const fn record(name: &'static str, fields: &'static [FieldDef]) -> Self {
        Self {
            name,
            shape: ModelShape::Record(fields),
        }
    }

    pub const fn scalar(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            shape: ModelShape::Scalar(kind),
        }
    }
}

/// Implemented by every entity that owns a table.
pub trait Model {
    const MODEL: ModelDef;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub sql_type: String,
    pub is_primary: bool,
    pub is_unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.is_primary)
    }
}

/// A declared many-to-many association between two or more tables.
/// Order is significant: it decides the junction table and column naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDecl {
    pub tables: Vec<String>,
}

impl RelationshipDecl {
    pub fn new<I, T>(tables: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JunctionTable {
    pub name: String,
    /// Referenced tables, in declaration order
    pub sides: Vec<String>,
}

impl JunctionTable {
    /// Foreign-key column name for one side, e.g. `post` -> `post_id`
    pub fn key_column(side: &str) -> String {
        format!("{}_id", side)
    }

    pub fn key_columns(&self) -> Vec<String> {
        self.sides.iter().map(|s| Self::key_column(s)).collect()
    }
}
