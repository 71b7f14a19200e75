use serde::{Deserialize, Serialize};

use crate::domain::Record;

/// Body posted to the workflow endpoint. Field names are fixed by the upstream automation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(rename = "OrderNumber")]
    pub order_number: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Store")]
    pub store: String,
    #[serde(rename = "Action")]
    pub action: String,
}

impl From<&Record> for SubmissionPayload {
    fn from(record: &Record) -> Self {
        Self {
            order_number: record.order_number.clone(),
            status: record.tracking_status.as_str().to_string(),
            link: record.link.clone(),
            store: record.store.as_str().to_string(),
            action: record.action.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WorkflowReply {
    /// Reads `message` from any JSON value; non-objects and non-string messages yield `None`.
    pub fn from_json(body: &serde_json::Value) -> Self {
        Self {
            message: body
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
        }
    }

    pub fn confirms(&self, accepted_message: &str) -> bool {
        self.message.as_deref() == Some(accepted_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Store, TrackingStatus};

    #[test]
    fn payload_uses_upstream_field_names() {
        let record = Record {
            order_number: "ORD-1".to_string(),
            tracking_status: TrackingStatus::Tracked,
            link: "https://example.test/ord-1".to_string(),
            store: Store::A2k,
            action: "refund".to_string(),
        };

        let value = serde_json::to_value(SubmissionPayload::from(&record)).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "OrderNumber": "ORD-1",
                "Status": "Tracked",
                "Link": "https://example.test/ord-1",
                "Store": "a2k",
                "Action": "refund",
            })
        );
    }

    #[test]
    fn reply_without_message_confirms_nothing() {
        let reply: WorkflowReply = serde_json::from_str(r#"{"status":"ok"}"#).expect("parse");
        assert!(!reply.confirms("Workflow was started"));
    }

    #[test]
    fn non_string_message_is_treated_as_absent() {
        let reply = WorkflowReply::from_json(&serde_json::json!({ "message": 200 }));
        assert_eq!(reply.message, None);
        let reply = WorkflowReply::from_json(&serde_json::json!(["Workflow was started"]));
        assert_eq!(reply.message, None);
    }

    #[test]
    fn reply_match_is_exact() {
        let reply: WorkflowReply =
            serde_json::from_str(r#"{"message":"Workflow was started"}"#).expect("parse");
        assert!(reply.confirms("Workflow was started"));
        assert!(!reply.confirms("Success"));
    }
}
