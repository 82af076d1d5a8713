//! Typed Evosus records
//!
//! Outbound payloads serialize straight to the `args` object the Evosus
//! method endpoints expect. Inbound records are already normalised: the API
//! client is responsible for coping with the remote's loose encodings.

use serde::{Deserialize, Serialize};

/// Inventory state for one item code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_code: String,
    pub description: String,
    pub discontinued: bool,
    pub quantity_available: f64,
}

/// Customer search strategies, tried in this order by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum CustomerQuery {
    Email(String),
    /// Digits only.
    Phone(String),
    /// Approximate match on full name plus first street line.
    NameAndAddress { name: String, address1: String },
}

impl CustomerQuery {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Phone(_) => "phone",
            Self::NameAndAddress { .. } => "name_address",
        }
    }
}

/// Customer location with normalised default flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAddress {
    pub location_id: String,
    pub is_default_bill_to: bool,
    pub is_default_ship_to: bool,
}

/// `Customer_Add` arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    #[serde(rename = "Name_First")]
    pub first_name: String,
    #[serde(rename = "Name_Last")]
    pub last_name: String,
    #[serde(rename = "Name_Company")]
    pub company: String,
    #[serde(rename = "BillTo_ContactName")]
    pub bill_to_contact_name: String,
    #[serde(rename = "BillTo_Address1")]
    pub bill_to_address1: String,
    #[serde(rename = "BillTo_Address2")]
    pub bill_to_address2: String,
    #[serde(rename = "BillTo_City")]
    pub bill_to_city: String,
    #[serde(rename = "BillTo_StateAbbr")]
    pub bill_to_state: String,
    #[serde(rename = "BillTo_PostCode")]
    pub bill_to_postcode: String,
    #[serde(rename = "BillTo_Country")]
    pub bill_to_country: String,
    #[serde(rename = "ShipTo_ContactName")]
    pub ship_to_contact_name: String,
    #[serde(rename = "ShipTo_Address1")]
    pub ship_to_address1: String,
    #[serde(rename = "ShipTo_Address2")]
    pub ship_to_address2: String,
    #[serde(rename = "ShipTo_City")]
    pub ship_to_city: String,
    #[serde(rename = "ShipTo_StateAbbr")]
    pub ship_to_state: String,
    #[serde(rename = "ShipTo_PostCode")]
    pub ship_to_postcode: String,
    #[serde(rename = "ShipTo_Country")]
    pub ship_to_country: String,
    #[serde(rename = "PhoneNumber_Mobile1")]
    pub phone: String,
    #[serde(rename = "EmailAddress1")]
    pub email: String,
    #[serde(rename = "DataConversion_LegacySystemID")]
    pub legacy_system_id: String,
    #[serde(rename = "CustomerNoteText")]
    pub note: String,
    /// Always `"FALSE"`: the resolver's own cascade is the dedup step.
    #[serde(rename = "CheckCustomerDuplicates")]
    pub check_duplicates: String,
}

/// One `LineItems` entry of `Customer_Order_Add`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "ItemCode")]
    pub item_code: String,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,
    #[serde(rename = "Comment")]
    pub comment: String,
}

/// `Customer_Order_Add` arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    #[serde(rename = "Customer_ID")]
    pub customer_id: String,
    #[serde(rename = "BillTo_CustomerLocationID")]
    pub bill_to_location_id: String,
    #[serde(rename = "ShipTo_CustomerLocationID")]
    pub ship_to_location_id: String,
    #[serde(rename = "DistributionMethodID")]
    pub distribution_method_id: String,
    /// Two-decimal string.
    #[serde(rename = "ExpectedOrderTotal")]
    pub expected_order_total: String,
    /// Storefront order number; the cross-reference key.
    #[serde(rename = "PONumber")]
    pub po_number: String,
    #[serde(rename = "Order_Note")]
    pub order_note: String,
    #[serde(rename = "Internal_Note")]
    pub internal_note: String,
    #[serde(rename = "LineItems")]
    pub line_items: Vec<OrderLine>,
    #[serde(rename = "SalesTax_PK", skip_serializing_if = "Option::is_none")]
    pub sales_tax_pk: Option<String>,
}

/// Order as read back from Evosus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub order_id: String,
    pub po_number: Option<String>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_order_omits_absent_tax_code() {
        let order = NewOrder {
            customer_id: "C1".into(),
            bill_to_location_id: "L1".into(),
            ship_to_location_id: "L2".into(),
            distribution_method_id: "1".into(),
            expected_order_total: "10.00".into(),
            po_number: "1001".into(),
            order_note: String::new(),
            internal_note: String::new(),
            line_items: vec![],
            sales_tax_pk: None,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["PONumber"], "1001");
        assert!(json.get("SalesTax_PK").is_none());
    }

    #[test]
    fn new_customer_uses_wire_names() {
        let customer = NewCustomer {
            email: "a@b.c".into(),
            check_duplicates: "FALSE".into(),
            ..NewCustomer::default()
        };
        let json = serde_json::to_value(&customer).unwrap();
        assert_eq!(json["EmailAddress1"], "a@b.c");
        assert_eq!(json["CheckCustomerDuplicates"], "FALSE");
    }
}
