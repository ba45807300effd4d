pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Fails the enclosing function with an invalid-argument error when the
/// condition does not hold.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

/// Fails the enclosing function with a corruption error attributed to `column`
/// when the condition does not hold. The remaining arguments form the message.
#[macro_export]
macro_rules! verify_column {
    ($column:expr, $expr:expr, $($arg:tt)+) => {{
        if !$expr {
            return Err($crate::error::Error::corruption(
                $column.to_string(),
                format!($($arg)+),
            ));
        }
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    use super::*;

    fn checked_len(len: i64) -> Result<u64> {
        verify_arg!(len, len >= 0);
        Ok(len as u64)
    }

    fn checked_index(column: &str, index: u64, size: u64) -> Result<u64> {
        verify_column!(column, index < size, "index {index} out of {size}");
        Ok(index)
    }

    #[test]
    fn test_verify_arg() {
        assert_eq!(checked_len(5).unwrap(), 5);
        let e = checked_len(-1).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::InvalidArgument { name, .. } if name == "len"));
    }

    #[test]
    fn test_verify_column() {
        assert_eq!(checked_index("c", 1, 2).unwrap(), 1);
        let e = checked_index("c", 2, 2).unwrap_err();
        assert!(e.is_corruption());
        assert!(e.to_string().contains("index 2 out of 2"));
    }
}
