//! Scalar types shared by the GraphQL surface

use async_graphql::{Scalar, ScalarType, Value};
use chrono::{DateTime as ChronoDateTime, Utc};

/// DateTime scalar, serialized as RFC 3339
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTime(pub ChronoDateTime<Utc>);

#[Scalar]
impl ScalarType for DateTime {
    fn parse(value: Value) -> async_graphql::InputValueResult<Self> {
        if let Value::String(s) = value {
            Ok(DateTime(
                ChronoDateTime::parse_from_rfc3339(&s)
                    .map_err(|e| format!("Invalid DateTime: {}", e))?
                    .with_timezone(&Utc),
            ))
        } else {
            Err("Expected string for DateTime".into())
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_to_value() {
        let dt = DateTime(Utc::now());
        let value = dt.to_value();
        assert!(matches!(value, Value::String(_)));
    }

    #[test]
    fn test_datetime_round_trip() {
        let dt = DateTime(Utc::now());
        let parsed = DateTime::parse(dt.to_value()).unwrap();
        assert_eq!(parsed.0.timestamp_millis(), dt.0.timestamp_millis());
    }

    #[test]
    fn test_datetime_rejects_non_string() {
        assert!(DateTime::parse(Value::Number(42.into())).is_err());
    }
}
