//! Gateway HTTP response types.

use serde::{Deserialize, Serialize};

/// Status string reported when the connection check succeeds.
pub const CONNECTED_STATUS: &str = "Connected to Databricks Successfully";

/// Status string reported when the connection check fails for any reason.
pub const FAILED_STATUS: &str = "Failed";

/// `/test-connection` body: `{ status, databricks_response }` or `{ status: "Failed", error }`.
/// Always served with 200; callers inspect `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub databricks_response: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionReport {
    pub fn connected(response: serde_json::Value) -> Self {
        Self {
            status: CONNECTED_STATUS.to_string(),
            databricks_response: Some(response),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: FAILED_STATUS.to_string(),
            databricks_response: None,
            error: Some(error.into()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failed_report_wire_shape() {
        let r = ConnectionReport::failed("connection refused");
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"status": "Failed", "error": "connection refused"})
        );
        assert!(!r.is_connected());
    }

    #[test]
    fn connected_report_wire_shape() {
        let r = ConnectionReport::connected(json!({"output": []}));
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({
                "status": "Connected to Databricks Successfully",
                "databricks_response": {"output": []}
            })
        );
        assert!(r.is_connected());
    }
}
