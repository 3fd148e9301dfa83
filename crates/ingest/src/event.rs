//! Loan decision payload carried by queue messages

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `{ "status": "APPROVED", "approvedAmount": "50056.00" }`
///
/// `approvedAmount` must be a decimal string. JSON numbers are rejected
/// rather than rounded through `f64`. `status` is logged but does not
/// filter: every event is aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalEvent {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub approved_amount: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_string_amount() {
        let event: ApprovalEvent =
            serde_json::from_str(r#"{"status":"APPROVED","approvedAmount":"50056.00"}"#).unwrap();
        assert_eq!(event.status.as_deref(), Some("APPROVED"));
        assert_eq!(event.approved_amount, Some(dec!(50056.00)));
    }

    #[test]
    fn test_numeric_amount_rejected() {
        let result: Result<ApprovalEvent, _> =
            serde_json::from_str(r#"{"status":"APPROVED","approvedAmount":1234567890.123456789}"#);
        assert!(result.is_err());

        let result: Result<ApprovalEvent, _> =
            serde_json::from_str(r#"{"status":"APPROVED","approvedAmount":1500}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_string_amount_keeps_every_digit() {
        let event: ApprovalEvent = serde_json::from_str(
            r#"{"status":"APPROVED","approvedAmount":"1234567890.123456789"}"#,
        )
        .unwrap();
        assert_eq!(event.approved_amount, Some(dec!(1234567890.123456789)));
    }

    #[test]
    fn test_missing_and_null_amount() {
        let missing: ApprovalEvent = serde_json::from_str(r#"{"status":"REJECTED"}"#).unwrap();
        assert_eq!(missing.approved_amount, None);

        let null: ApprovalEvent =
            serde_json::from_str(r#"{"status":"REJECTED","approvedAmount":null}"#).unwrap();
        assert_eq!(null.approved_amount, None);
    }

    #[test]
    fn test_unparsable_amount_fails() {
        let result: Result<ApprovalEvent, _> =
            serde_json::from_str(r#"{"status":"APPROVED","approvedAmount":"lots"}"#);
        assert!(result.is_err());
    }
}
