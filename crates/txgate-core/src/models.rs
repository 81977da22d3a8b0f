//! Core data models for transaction history

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single ledger transaction as returned by the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Opaque identifier, unique within a dataset
    pub id: String,
    /// Sending account identifier
    pub sender: String,
    /// Receiving account identifier
    pub receiver: String,
    /// Non-negative amount
    pub amount: Decimal,
    /// Currency code (e.g., "ETB")
    pub currency: String,
    /// Free-text memo
    pub cause: String,
    /// ISO-8601 creation time, kept as sent
    pub created_at: String,
    /// Derived direction, only present on annotated responses
    #[serde(rename = "type", default, deserialize_with = "discard", skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Fields the remote API sends beyond the ones above, passed through as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accept and drop a field the remote side must not set.
///
/// The key stays a known field, so it never lands in a flattened `extra` map.
pub(crate) fn discard<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
{
    serde::de::IgnoredAny::deserialize(deserializer)?;
    Ok(None)
}

/// Money flow relative to the account holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Incoming => write!(f, "incoming"),
            Direction::Outgoing => write!(f, "outgoing"),
        }
    }
}

impl TransactionRecord {
    /// Classify this record for `current_user`.
    ///
    /// A transfer to oneself is a top-up and counts as incoming.
    pub fn direction(&self, current_user: &str) -> Direction {
        if self.sender == self.receiver || self.receiver == current_user {
            Direction::Incoming
        } else {
            Direction::Outgoing
        }
    }

    /// Copy with the derived `type` field filled in
    pub fn annotated(mut self, current_user: &str) -> Self {
        self.direction = Some(self.direction(current_user));
        self
    }

    /// Case-insensitive substring match over id, sender, receiver and cause.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        [&self.id, &self.sender, &self.receiver, &self.cause]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn record(sender: &str, receiver: &str) -> TransactionRecord {
        TransactionRecord {
            id: "TXN100".to_string(),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount: Decimal::from_str("12.50").unwrap(),
            currency: "ETB".to_string(),
            cause: "Rent payment".to_string(),
            created_at: "2025-08-25T14:10:00Z".to_string(),
            direction: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_direction() {
        assert_eq!(record("John", "me").direction("me"), Direction::Incoming);
        assert_eq!(record("me", "Jane").direction("me"), Direction::Outgoing);
        assert_eq!(record("me", "me").direction("me"), Direction::Incoming);
        // Self transfer of some other account still counts as a top-up
        assert_eq!(record("bob", "bob").direction("me"), Direction::Incoming);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let tx = record("John Doe", "me");
        assert!(tx.matches("rent"));
        assert!(tx.matches("john"));
        assert!(tx.matches("txn100"));
        assert!(!tx.matches("etb"));
    }

    #[test]
    fn test_type_field_only_when_annotated() {
        let tx = record("me", "Jane");
        let plain = serde_json::to_value(&tx).unwrap();
        assert!(plain.get("type").is_none());
        assert_eq!(plain["amount"], serde_json::json!(12.5));

        let annotated = serde_json::to_value(tx.annotated("me")).unwrap();
        assert_eq!(annotated["type"], "outgoing");
    }

    #[test]
    fn test_incoming_type_is_not_deserialized() {
        let json = r#"{"id":"A","sender":"x","receiver":"y","amount":1,"currency":"ETB",
            "cause":"c","created_at":"2025-08-22T17:45:00Z","type":"incoming"}"#;
        let tx: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(tx.direction, None);
        assert!(tx.extra.is_empty());
        assert_eq!(tx.amount, Decimal::from(1));
    }
}
