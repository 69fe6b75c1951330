use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of one column as reported by the catalog.
///
/// Fetched fresh for every request; nothing here is cached between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: DataType,
    /// Type string exactly as the catalog reports it (e.g. `tinyint(1)`).
    pub raw_type: String,
    pub nullable: bool,
    pub key: KeyRole,
    pub default: Option<String>,
    pub max_length: Option<u32>,
    pub numeric_precision: Option<u32>,
    pub numeric_scale: Option<u32>,
    /// Display width for integer types, e.g. 1 for `tinyint(1)`.
    pub display_width: Option<u32>,
    pub enum_values: Option<Vec<String>>,
    /// Auto-increment, identity or generated-expression columns.
    pub auto_generated: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        let raw_type = data_type.to_string();
        Self {
            name: name.into(),
            data_type,
            raw_type,
            nullable: true,
            key: KeyRole::None,
            default: None,
            max_length: None,
            numeric_precision: None,
            numeric_scale: None,
            display_width: None,
            enum_values: None,
            auto_generated: false,
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.key == KeyRole::Primary
    }
}

/// Role a column plays in the table's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    None,
    Primary,
    Unique,
    Foreign,
}

impl KeyRole {
    /// Parse MySQL's `COLUMN_KEY` field (`PRI`, `UNI`, `MUL`, empty).
    pub fn from_column_key(key: &str) -> Self {
        match key.to_uppercase().as_str() {
            "PRI" => KeyRole::Primary,
            "UNI" => KeyRole::Unique,
            _ => KeyRole::None,
        }
    }
}

/// Normalized type category covering the supported databases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// 8-bit integer (tinyint)
    TinyInt,
    /// 16-bit integer (smallint)
    SmallInt,
    /// 24/32-bit integer (mediumint, int, integer)
    Integer,
    /// 64-bit integer (bigint)
    BigInt,
    /// Single-precision float
    Float,
    /// Double-precision float
    Double,
    /// Exact numeric with precision/scale (numeric, decimal)
    Decimal,
    /// Fixed-length string
    Char,
    /// Variable-length string
    VarChar,
    /// Unbounded text (text, tinytext, mediumtext, longtext)
    Text,
    Boolean,
    Date,
    Time,
    DateTime,
    Timestamp,
    Year,
    Json,
    /// Binary/blob data
    Binary,
    /// Database enum or set; values live on the column descriptor.
    Enum,
    Unknown(String),
}

impl DataType {
    /// Parse a raw SQL type string into a normalized DataType.
    pub fn from_raw(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        if normalized.starts_with("character varying") {
            return DataType::VarChar;
        }
        if normalized.starts_with("double precision") {
            return DataType::Double;
        }
        // Drop display widths and modifiers: "int(11) unsigned" -> "int"
        let base = normalized
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or("");

        match base {
            "tinyint" => DataType::TinyInt,
            "smallint" | "int2" => DataType::SmallInt,
            "mediumint" | "int" | "integer" | "int4" => DataType::Integer,
            "bigint" | "int8" => DataType::BigInt,

            "float" | "real" | "float4" => DataType::Float,
            "double" | "float8" => DataType::Double,
            "decimal" | "numeric" | "dec" | "fixed" => DataType::Decimal,

            "char" | "character" | "nchar" => DataType::Char,
            "varchar" | "nvarchar" | "varying" => DataType::VarChar,
            "text" | "tinytext" | "mediumtext" | "longtext" | "clob" => DataType::Text,

            "boolean" | "bool" | "bit" => DataType::Boolean,

            "date" => DataType::Date,
            "time" => DataType::Time,
            "datetime" => DataType::DateTime,
            "timestamp" => DataType::Timestamp,
            "year" => DataType::Year,

            "json" => DataType::Json,

            "blob" | "tinyblob" | "mediumblob" | "longblob" | "binary" | "varbinary" => {
                DataType::Binary
            }

            "enum" | "set" => DataType::Enum,

            _ => DataType::Unknown(normalized.to_string()),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(self, DataType::Char | DataType::VarChar | DataType::Text)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::TinyInt => write!(f, "tinyint"),
            DataType::SmallInt => write!(f, "smallint"),
            DataType::Integer => write!(f, "int"),
            DataType::BigInt => write!(f, "bigint"),
            DataType::Float => write!(f, "float"),
            DataType::Double => write!(f, "double"),
            DataType::Decimal => write!(f, "decimal"),
            DataType::Char => write!(f, "char"),
            DataType::VarChar => write!(f, "varchar"),
            DataType::Text => write!(f, "text"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Date => write!(f, "date"),
            DataType::Time => write!(f, "time"),
            DataType::DateTime => write!(f, "datetime"),
            DataType::Timestamp => write!(f, "timestamp"),
            DataType::Year => write!(f, "year"),
            DataType::Json => write!(f, "json"),
            DataType::Binary => write!(f, "blob"),
            DataType::Enum => write!(f, "enum"),
            DataType::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// A single-column foreign-key relationship.
///
/// Composite constraints are reported as one edge per column pair, all
/// sharing the same constraint name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyEdge {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    pub constraint_name: String,
}

impl ForeignKeyEdge {
    pub fn is_self_reference(&self) -> bool {
        self.source_table == self.target_table
    }
}

/// Edges leaving a table (its own foreign keys) and edges pointing at it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRelations {
    pub outgoing: Vec<ForeignKeyEdge>,
    pub incoming: Vec<ForeignKeyEdge>,
}

impl TableRelations {
    /// Find the outgoing edge whose source is `column`, if any.
    pub fn outgoing_for(&self, column: &str) -> Option<&ForeignKeyEdge> {
        self.outgoing.iter().find(|e| e.source_column == column)
    }
}

/// Everything the catalog knows about one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub outgoing: Vec<ForeignKeyEdge>,
    pub incoming: Vec<ForeignKeyEdge>,
}

impl TableMetadata {
    pub fn new(name: String, columns: Vec<ColumnDescriptor>, relations: TableRelations) -> Self {
        Self {
            name,
            columns,
            outgoing: relations.outgoing,
            incoming: relations.incoming,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn outgoing_for(&self, column: &str) -> Option<&ForeignKeyEdge> {
        self.outgoing.iter().find(|e| e.source_column == column)
    }
}

/// Parse enum/set values from a MySQL column type like `enum('a','b','c')`.
pub fn parse_enum_values(column_type: &str) -> Vec<String> {
    let s = column_type.trim();
    if let (Some(start), Some(end)) = (s.find('('), s.rfind(')')) {
        if start < end {
            return s[start + 1..end]
                .split(',')
                .map(|v| v.trim().trim_matches('\'').replace("''", "'"))
                .filter(|v| !v.is_empty())
                .collect();
        }
    }
    Vec::new()
}

/// Parse the display width from an integer column type like `tinyint(1)`.
pub fn parse_display_width(column_type: &str) -> Option<u32> {
    let s = column_type.trim();
    let start = s.find('(')?;
    let end = s[start..].find(')')? + start;
    s[start + 1..end].trim().parse().ok()
}
