use std::fmt;

/// Position of a column in the file's flattened type tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub u32);

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a column as declared in the file footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrcTypeKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Varchar,
    Char,
    Binary,
    Date,
    Timestamp,
    Decimal,
    List,
    Map,
    Struct,
}

impl OrcTypeKind {
    pub fn name(&self) -> &'static str {
        match self {
            OrcTypeKind::Boolean => "BOOLEAN",
            OrcTypeKind::Byte => "BYTE",
            OrcTypeKind::Short => "SHORT",
            OrcTypeKind::Int => "INT",
            OrcTypeKind::Long => "LONG",
            OrcTypeKind::Float => "FLOAT",
            OrcTypeKind::Double => "DOUBLE",
            OrcTypeKind::String => "STRING",
            OrcTypeKind::Varchar => "VARCHAR",
            OrcTypeKind::Char => "CHAR",
            OrcTypeKind::Binary => "BINARY",
            OrcTypeKind::Date => "DATE",
            OrcTypeKind::Timestamp => "TIMESTAMP",
            OrcTypeKind::Decimal => "DECIMAL",
            OrcTypeKind::List => "LIST",
            OrcTypeKind::Map => "MAP",
            OrcTypeKind::Struct => "STRUCT",
        }
    }
}

impl fmt::Display for OrcTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of the column a reader is bound to.
///
/// Used to look up the column's encoding and streams, and to attribute errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrcColumn {
    data_source_id: String,
    column_id: ColumnId,
    path: String,
    column_type: OrcTypeKind,
}

impl OrcColumn {
    pub fn new(
        data_source_id: impl Into<String>,
        column_id: ColumnId,
        path: impl Into<String>,
        column_type: OrcTypeKind,
    ) -> OrcColumn {
        OrcColumn {
            data_source_id: data_source_id.into(),
            column_id,
            path: path.into(),
            column_type,
        }
    }

    /// Name of the file (or other data source) the column belongs to.
    pub fn data_source_id(&self) -> &str {
        &self.data_source_id
    }

    pub fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Dotted path of the column within the file schema.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn column_type(&self) -> OrcTypeKind {
        self.column_type
    }
}

impl fmt::Display for OrcColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) in {}",
            self.column_id, self.path, self.column_type, self.data_source_id
        )
    }
}
