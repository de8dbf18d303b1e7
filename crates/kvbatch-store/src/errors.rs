//! Error handling for kvbatch-store
//!
//! Builds core `StoreError`s with consistent wording for every backend

use kvbatch_core::errors::StoreError;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Wrong number of arguments for an operation
pub fn arity(op: &str, expected: &str, actual: usize) -> StoreError {
    StoreError::OperationArgument {
        op: op.to_string(),
        reason: format!("expected {} arguments, got {}", expected, actual),
    }
}

/// Argument or stored value that should be an integer but is not
pub fn not_integer(op: &str) -> StoreError {
    StoreError::OperationArgument {
        op: op.to_string(),
        reason: "value is not an integer or out of range".to_string(),
    }
}

/// Integer arithmetic left the i64 range
pub fn overflow(op: &str) -> StoreError {
    StoreError::OperationArgument {
        op: op.to_string(),
        reason: "increment or decrement would overflow".to_string(),
    }
}

/// Argument with no textual form (nil or nested array)
pub fn not_scalar(op: &str, position: usize) -> StoreError {
    StoreError::OperationArgument {
        op: op.to_string(),
        reason: format!("argument {} must be a string or integer", position),
    }
}

/// Key holds a value of another kind
pub fn wrong_type(op: &str, key: &str) -> StoreError {
    StoreError::WrongType {
        op: op.to_string(),
        key: key.to_string(),
    }
}

/// Operation declared by a client but not implemented by its backend
pub fn unsupported(op: &str) -> StoreError {
    StoreError::OperationArgument {
        op: op.to_string(),
        reason: "operation is not implemented by this store".to_string(),
    }
}

/// Create a store error from redis::RedisError
///
/// Connection-level failures become `Unavailable`; everything the server
/// reports for the transaction becomes `Transaction` with the server text.
pub fn from_redis(err: redis::RedisError) -> StoreError {
    if err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_timeout()
    {
        return StoreError::Unavailable {
            reason: err.to_string(),
        };
    }

    StoreError::Transaction {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_errors_use_redis_wording() {
        assert_eq!(
            arity("get", "1", 3).to_string(),
            "ERR wrong arguments for 'get': expected 1 arguments, got 3"
        );
        assert!(not_integer("incr").to_string().contains("not an integer"));
    }

    #[test]
    fn test_wrong_type_names_key() {
        let err = wrong_type("lpush", "k1");
        assert_eq!(
            err,
            StoreError::WrongType {
                op: "lpush".to_string(),
                key: "k1".to_string()
            }
        );
    }

    #[test]
    fn test_redis_response_error_is_transaction_error() {
        let err = redis::RedisError::from((
            redis::ErrorKind::ExecAbortError,
            "Transaction discarded",
        ));
        assert!(matches!(from_redis(err), StoreError::Transaction { .. }));
    }

    #[test]
    fn test_redis_io_error_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = redis::RedisError::from(io);
        assert!(matches!(from_redis(err), StoreError::Unavailable { .. }));
    }
}
