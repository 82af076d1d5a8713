//! In-process stand-in for the Evosus API
//!
//! Answers the same method endpoints with the same wire shapes as the real
//! service so that the full pipeline (envelope decoding included) runs
//! without credentials. Item codes drive the inventory scenarios:
//! `INVALID` is unknown, `DISCONTINUED` is discontinued with nothing on
//! hand, `LOWSTOCK` has 2 available, anything else 100.

use parking_lot::Mutex;
use serde_json::{json, Value};

/// Customer emails the simulated search recognises.
pub const KNOWN_EMAILS: [&str; 2] = ["test@example.com", "existing@customer.com"];

#[derive(Debug, Default)]
struct SimulationState {
    customers_created: u64,
    orders_created: u64,
    /// (order id, PO number), oldest first.
    orders: Vec<(String, String)>,
}

/// Canned Evosus responses keyed by method name
#[derive(Debug, Default)]
pub struct SimulatedEvosus {
    state: Mutex<SimulationState>,
}

impl SimulatedEvosus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full response envelope for `method` called with `args`.
    pub fn respond(&self, method: &str, args: &Value) -> Value {
        let payload = match method {
            "Inventory_Item_Get" => inventory(arg_str(args, "ItemCode")),
            "Customer_Search" => customer_search(args),
            "Customer_Addresses_Get" => addresses(),
            "Customer_Add" => {
                let mut state = self.state.lock();
                state.customers_created += 1;
                json!(format!("MOCK-CUST-{}", state.customers_created))
            }
            "Customer_Order_Add" => {
                let mut state = self.state.lock();
                state.orders_created += 1;
                let order_id = format!("MOCK-ORD-{}", state.orders_created);
                let po_number = arg_str(args, "PONumber").to_string();
                state.orders.push((order_id.clone(), po_number));
                json!({ "OrderId": order_id })
            }
            "Order_Get" => self.order_get(arg_str(args, "OrderID")),
            "TaxCodes_Get" => tax_codes(),
            _ => json!([]),
        };
        json!({ "code": "OK", "message": "", "response": payload })
    }

    /// Number of orders submitted so far.
    pub fn orders_created(&self) -> u64 {
        self.state.lock().orders_created
    }

    fn order_get(&self, order_id: &str) -> Value {
        let state = self.state.lock();
        match state.orders.iter().rev().find(|(id, _)| id == order_id) {
            Some((id, po_number)) => json!([{ "OrderId": id, "PoNo": po_number, "Status": "Open" }]),
            None => json!([]),
        }
    }
}

fn arg_str<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn inventory(item_code: &str) -> Value {
    if item_code.contains("INVALID") {
        return json!([]);
    }
    let (description, discontinued, available) = if item_code.contains("DISCONTINUED") {
        ("Test Product (Discontinued)", "Yes", 0)
    } else if item_code.contains("LOWSTOCK") {
        ("Test Product (Low Stock)", "No", 2)
    } else {
        ("Test Product", "No", 100)
    };
    json!([{
        "ItemCode": item_code,
        "Description": description,
        "Discontinued": discontinued,
        "QuantityAvailable": available
    }])
}

fn customer_search(args: &Value) -> Value {
    let email = arg_str(args, "EmailAddress_List").trim().to_ascii_lowercase();
    match KNOWN_EMAILS.iter().position(|known| *known == email) {
        Some(index) => json!([{ "CustomerID": format!("MOCK-CUST-EXISTING-{}", index + 1) }]),
        None => json!([]),
    }
}

fn addresses() -> Value {
    json!([
        { "CustomerLocationID": "MOCK-LOC-BILL-1", "IsDefaultBillTo": "Yes", "IsDefaultShipTo": "No" },
        { "CustomerLocationID": "MOCK-LOC-SHIP-1", "IsDefaultBillTo": "No", "IsDefaultShipTo": "Yes" }
    ])
}

fn tax_codes() -> Value {
    json!([
        { "SalesTax_PK": 1, "Name": "Exempt", "Rate": 0.0 },
        { "SalesTax_PK": 2, "Name": "GST", "Rate": 0.05 },
        { "SalesTax_PK": 7, "Name": "HST ON", "Rate": 0.13 },
        { "SalesTax_PK": 11, "Name": "HST PEI", "Rate": 0.14 },
        { "SalesTax_PK": 8, "Name": "HST Atlantic", "Rate": 0.15 }
    ])
}
