//! Evosus response envelope and loose-value decoding
//!
//! The API is inconsistent about shapes: ids come back as bare strings,
//! numbers, or objects carrying the id under one of several key spellings;
//! lists sometimes arrive as a single object; booleans arrive as `"Yes"`,
//! `"1"`, `true` or `1`. Everything here accepts all of those.

use evosync_domain::{CustomerAddress, EvosyncError, InventoryItem, RemoteOrder};
use serde::Deserialize;
use serde_json::Value;

/// `{code, message, response}` wrapper around every method result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub response: Value,
}

impl Envelope {
    pub fn is_rejection(&self) -> bool {
        self.code.as_deref().is_some_and(|code| code.eq_ignore_ascii_case("ER"))
    }

    /// Payload, or the remote message as an error when the call was rejected.
    pub fn into_payload(self, status: u16) -> Result<Value, EvosyncError> {
        if self.is_rejection() {
            let message = self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Evosus rejected the request".to_string());
            return Err(EvosyncError::Remote { status, message });
        }
        Ok(self.response)
    }
}

/// Decode a response body; a non-object body is treated as the bare payload.
pub fn parse_envelope(body: &str) -> Result<Envelope, EvosyncError> {
    if body.trim().is_empty() {
        return Ok(Envelope::default());
    }
    let value: Value = serde_json::from_str(body).map_err(|err| EvosyncError::Remote {
        status: 0,
        message: format!("Evosus returned malformed JSON: {err}"),
    })?;
    Ok(envelope_from_value(value))
}

pub fn envelope_from_value(value: Value) -> Envelope {
    let wrapped = value
        .as_object()
        .is_some_and(|map| map.contains_key("response") || map.contains_key("code"));
    if wrapped {
        if let Ok(envelope) = serde_json::from_value::<Envelope>(value.clone()) {
            return envelope;
        }
    }
    Envelope { response: value, ..Envelope::default() }
}

/// Treat a payload as a list: arrays as-is, a single object as one element,
/// null as empty.
pub fn as_list(payload: &Value) -> Vec<&Value> {
    match payload {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        other => vec![other],
    }
}

/// Extract an id from a scalar, an object carrying one of `keys`, or the
/// first element of a list.
pub fn as_id(payload: &Value, keys: &[&str]) -> Option<String> {
    match payload {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => keys.iter().find_map(|key| map.get(*key)).and_then(|v| as_id(v, keys)),
        Value::Array(items) => items.first().and_then(|first| as_id(first, keys)),
        _ => None,
    }
}

/// Normalise the remote's boolean encodings.
pub fn as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "yes" | "y" | "1" | "true")
        }
        _ => false,
    }
}

pub fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| record.get(*key)).filter(|v| !v.is_null())
}

pub const CUSTOMER_ID_KEYS: [&str; 3] = ["CustomerID", "CustomerId", "Customer_ID"];
pub const ORDER_ID_KEYS: [&str; 3] = ["OrderId", "OrderID", "Order_ID"];
const LOCATION_ID_KEYS: [&str; 3] = ["CustomerLocationID", "CustomerLocationId", "LocationId"];

/// First inventory record, if any.
pub fn inventory_item(payload: &Value, requested_code: &str) -> Option<InventoryItem> {
    let record = *as_list(payload).first()?;
    if !record.is_object() {
        return None;
    }
    Some(InventoryItem {
        item_code: field(record, &["ItemCode"])
            .and_then(as_text)
            .unwrap_or_else(|| requested_code.to_string()),
        description: field(record, &["Description"]).and_then(as_text).unwrap_or_default(),
        discontinued: field(record, &["Discontinued"]).is_some_and(as_bool),
        quantity_available: field(record, &["QuantityAvailable"]).map_or(0.0, as_f64),
    })
}

/// Address records that carry a location id.
pub fn customer_addresses(payload: &Value) -> Vec<CustomerAddress> {
    as_list(payload)
        .into_iter()
        .filter_map(|record| {
            let location_id = field(record, &LOCATION_ID_KEYS).and_then(as_text)?;
            Some(CustomerAddress {
                location_id,
                is_default_bill_to: field(record, &["IsDefaultBillTo"]).is_some_and(as_bool),
                is_default_ship_to: field(record, &["IsDefaultShipTo"]).is_some_and(as_bool),
            })
        })
        .collect()
}

pub fn remote_order(record: &Value, fallback_id: &str) -> RemoteOrder {
    RemoteOrder {
        order_id: field(record, &ORDER_ID_KEYS)
            .and_then(as_text)
            .unwrap_or_else(|| fallback_id.to_string()),
        po_number: field(record, &["PoNo", "PONumber"]).and_then(as_text),
        status: field(record, &["Status"]).and_then(as_text),
    }
}

/// Record in a search result whose order id equals `order_id`.
pub fn find_order(payload: &Value, order_id: &str) -> Option<RemoteOrder> {
    as_list(payload)
        .into_iter()
        .find(|record| {
            field(record, &ORDER_ID_KEYS)
                .and_then(as_text)
                .is_some_and(|id| id.trim() == order_id.trim())
        })
        .map(|record| remote_order(record, order_id))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ids_accept_scalar_object_and_list_shapes() {
        assert_eq!(as_id(&json!("C-9"), &CUSTOMER_ID_KEYS).as_deref(), Some("C-9"));
        assert_eq!(as_id(&json!(4411), &CUSTOMER_ID_KEYS).as_deref(), Some("4411"));
        assert_eq!(as_id(&json!({"CustomerId": "C-1"}), &CUSTOMER_ID_KEYS).as_deref(), Some("C-1"));
        assert_eq!(as_id(&json!([{"CustomerID": 7}]), &CUSTOMER_ID_KEYS).as_deref(), Some("7"));
        assert_eq!(as_id(&json!({"OrderId": 55}), &ORDER_ID_KEYS).as_deref(), Some("55"));
        assert_eq!(as_id(&json!([]), &CUSTOMER_ID_KEYS), None);
        assert_eq!(as_id(&json!("  "), &CUSTOMER_ID_KEYS), None);
    }

    #[test]
    fn booleans_are_normalised() {
        for truthy in [json!("Yes"), json!("1"), json!("true"), json!(true), json!(1)] {
            assert!(as_bool(&truthy), "{truthy} should be true");
        }
        for falsy in [json!("No"), json!("0"), json!(false), json!(0), json!(null)] {
            assert!(!as_bool(&falsy), "{falsy} should be false");
        }
    }

    #[test]
    fn rejection_envelope_carries_message_verbatim() {
        let envelope = parse_envelope(r#"{"code":"ER","message":"Invalid ItemCode: X-1","response":null}"#)
            .unwrap();
        let err = envelope.into_payload(200).unwrap_err();
        assert_eq!(err, EvosyncError::Remote { status: 200, message: "Invalid ItemCode: X-1".into() });
    }

    #[test]
    fn bare_payload_without_envelope_is_accepted() {
        let envelope = parse_envelope(r#"[{"CustomerID":"C-2"}]"#).unwrap();
        let payload = envelope.into_payload(200).unwrap();
        assert_eq!(as_id(&payload, &CUSTOMER_ID_KEYS).as_deref(), Some("C-2"));
    }

    #[test]
    fn inventory_record_decodes_loose_fields() {
        let payload = json!([{
            "ItemCode": "PUMP-1",
            "Description": "Pool pump",
            "Discontinued": "Yes",
            "QuantityAvailable": "3"
        }]);
        let item = inventory_item(&payload, "PUMP-1").unwrap();
        assert!(item.discontinued);
        assert_eq!(item.quantity_available, 3.0);
        assert!(inventory_item(&json!([]), "PUMP-1").is_none());
    }

    #[test]
    fn single_address_object_is_treated_as_list() {
        let payload = json!({"CustomerLocationID": 12, "IsDefaultBillTo": "1", "IsDefaultShipTo": "No"});
        let addresses = customer_addresses(&payload);
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].location_id, "12");
        assert!(addresses[0].is_default_bill_to);
        assert!(!addresses[0].is_default_ship_to);
    }

    #[test]
    fn order_search_matches_numeric_and_string_ids() {
        let payload = json!([
            {"OrderId": 100, "PoNo": "1001"},
            {"OrderId": "200", "PoNo": 1002}
        ]);
        assert_eq!(find_order(&payload, "100").unwrap().po_number.as_deref(), Some("1001"));
        assert_eq!(find_order(&payload, "200").unwrap().po_number.as_deref(), Some("1002"));
        assert!(find_order(&payload, "300").is_none());
    }
}
