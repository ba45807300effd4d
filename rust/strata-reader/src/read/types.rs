//! SQL-visible types that readers are asked to produce.

use std::fmt;

/// The logical (SQL) type a column is read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Boolean,
    Integer,
    BigInt,
    Double,
    Date,
    Timestamp,
    Decimal { precision: u8, scale: u8 },
    /// Variable-length character string, optionally bounded by a maximum number
    /// of code points.
    Varchar { bound: Option<u32> },
    /// Fixed-width character string of `length` code points, padded with spaces.
    /// Trailing spaces are not significant.
    Char { length: u32 },
    /// Variable-length byte string.
    Varbinary,
}

impl LogicalType {
    pub fn unbounded_varchar() -> LogicalType {
        LogicalType::Varchar { bound: None }
    }

    pub fn varchar(bound: u32) -> LogicalType {
        LogicalType::Varchar { bound: Some(bound) }
    }

    pub fn char(length: u32) -> LogicalType {
        LogicalType::Char { length }
    }

    pub fn is_varchar(&self) -> bool {
        matches!(self, LogicalType::Varchar { .. })
    }

    pub fn is_char(&self) -> bool {
        matches!(self, LogicalType::Char { .. })
    }

    pub fn is_varbinary(&self) -> bool {
        matches!(self, LogicalType::Varbinary)
    }

    /// Types whose values are variable-length byte strings.
    pub fn is_slice_type(&self) -> bool {
        self.is_varchar() || self.is_char() || self.is_varbinary()
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Boolean => f.write_str("boolean"),
            LogicalType::Integer => f.write_str("integer"),
            LogicalType::BigInt => f.write_str("bigint"),
            LogicalType::Double => f.write_str("double"),
            LogicalType::Date => f.write_str("date"),
            LogicalType::Timestamp => f.write_str("timestamp"),
            LogicalType::Decimal { precision, scale } => {
                write!(f, "decimal({precision},{scale})")
            }
            LogicalType::Varchar { bound: None } => f.write_str("varchar"),
            LogicalType::Varchar { bound: Some(bound) } => write!(f, "varchar({bound})"),
            LogicalType::Char { length } => write!(f, "char({length})"),
            LogicalType::Varbinary => f.write_str("varbinary"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(LogicalType::unbounded_varchar().to_string(), "varchar");
        assert_eq!(LogicalType::varchar(10).to_string(), "varchar(10)");
        assert_eq!(LogicalType::char(3).to_string(), "char(3)");
        assert_eq!(
            LogicalType::Decimal {
                precision: 10,
                scale: 2
            }
            .to_string(),
            "decimal(10,2)"
        );
    }

    #[test]
    fn test_slice_types() {
        assert!(LogicalType::varchar(1).is_slice_type());
        assert!(LogicalType::char(1).is_slice_type());
        assert!(LogicalType::Varbinary.is_slice_type());
        assert!(!LogicalType::BigInt.is_slice_type());
        assert!(!LogicalType::Timestamp.is_slice_type());
    }
}
