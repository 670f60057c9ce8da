use crate::error::{BlogError, Result};
use crate::model::{ColumnSpec, FieldDef, FieldKind, ModelDef, ModelShape, TableDescriptor};

pub const KEY_TYPE: &str = "SERIAL";
pub const TEXT_TYPE: &str = "TEXT";
pub const TIMESTAMP_TYPE: &str = "TIMESTAMP";

/// Relational column type for a field kind, or `None` when the field gets no column.
///
/// `Many` fields are relationships handled by the join table builder; `Other`
/// kinds are skipped without error.
pub fn column_type(kind: &FieldKind) -> Option<&'static str> {
    match kind {
        FieldKind::Integer => Some(KEY_TYPE),
        FieldKind::Text => Some(TEXT_TYPE),
        FieldKind::Timestamp => Some(TIMESTAMP_TYPE),
        FieldKind::Many | FieldKind::Other(_) => None,
    }
}

/// Column specification for one field, or `None` when the field is skipped.
pub fn column_spec(field: &FieldDef) -> Option<ColumnSpec> {
    let sql_type = column_type(&field.kind)?;
    let name = field.name.to_lowercase();
    let is_primary = name == "id";

    Some(ColumnSpec {
        sql_type: if is_primary { KEY_TYPE } else { sql_type }.to_string(),
        name,
        is_primary,
        is_unique: field.unique,
    })
}

/// Derive the table descriptor for a declared model.
pub fn describe(model: &ModelDef) -> Result<TableDescriptor> {
    let fields = match model.shape {
        ModelShape::Record(fields) => fields,
        ModelShape::Scalar(_) => {
            return Err(BlogError::Descriptor(format!(
                "model {} is not a record type",
                model.name
            )))
        }
    };

    let columns: Vec<ColumnSpec> = fields.iter().filter_map(column_spec).collect();

    match columns.iter().filter(|c| c.is_primary).count() {
        1 => {}
        0 => {
            return Err(BlogError::Descriptor(format!(
                "primary key not defined in model {}",
                model.name
            )))
        }
        n => {
            return Err(BlogError::Descriptor(format!(
                "model {} declares {} primary key fields",
                model.name, n
            )))
        }
    }

    Ok(TableDescriptor {
        name: model.name.to_lowercase(),
        columns,
    })
}
