//! Scriptable Evosus fake

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use evosync_core::ErpClient;
use evosync_domain::{
    CustomerAddress, CustomerQuery, EvosyncError, InventoryItem, NewCustomer, NewOrder,
    RemoteOrder, Result,
};
use serde_json::{json, Value};

#[derive(Default)]
pub struct FakeErp {
    inventory: Mutex<HashMap<String, InventoryItem>>,
    customers: Mutex<Vec<(CustomerQuery, String)>>,
    addresses: Mutex<HashMap<String, Vec<CustomerAddress>>>,
    remote_orders: Mutex<HashMap<String, RemoteOrder>>,
    order_failure: Mutex<Option<EvosyncError>>,
    inventory_failure: Mutex<Option<EvosyncError>>,
    pub searches: Mutex<Vec<CustomerQuery>>,
    pub inventory_lookups: Mutex<Vec<String>>,
    pub created_customers: Mutex<Vec<NewCustomer>>,
    pub created_orders: Mutex<Vec<NewOrder>>,
}

impl FakeErp {
    pub fn with_item(self, code: &str, quantity: f64, discontinued: bool) -> Self {
        self.inventory.lock().unwrap().insert(
            code.into(),
            InventoryItem {
                item_code: code.into(),
                description: format!("{code} description"),
                discontinued,
                quantity_available: quantity,
            },
        );
        self
    }

    pub fn with_customer(self, query: CustomerQuery, customer_id: &str) -> Self {
        self.customers.lock().unwrap().push((query, customer_id.into()));
        self
    }

    pub fn with_addresses(self, customer_id: &str, addresses: Vec<CustomerAddress>) -> Self {
        self.addresses.lock().unwrap().insert(customer_id.into(), addresses);
        self
    }

    pub fn with_remote_order(self, order_id: &str, po_number: &str) -> Self {
        self.remote_orders.lock().unwrap().insert(
            order_id.into(),
            RemoteOrder { order_id: order_id.into(), po_number: Some(po_number.into()), status: None },
        );
        self
    }

    pub fn fail_orders_with(&self, error: EvosyncError) {
        *self.order_failure.lock().unwrap() = Some(error);
    }

    pub fn fail_inventory_with(&self, error: EvosyncError) {
        *self.inventory_failure.lock().unwrap() = Some(error);
    }

    pub fn order_count(&self) -> usize {
        self.created_orders.lock().unwrap().len()
    }

    pub fn last_order(&self) -> NewOrder {
        self.created_orders.lock().unwrap().last().cloned().unwrap()
    }
}

pub fn default_address(location_id: &str) -> CustomerAddress {
    CustomerAddress { location_id: location_id.into(), is_default_bill_to: true, is_default_ship_to: true }
}

#[async_trait]
impl ErpClient for FakeErp {
    async fn get_inventory_item(&self, item_code: &str) -> Result<Option<InventoryItem>> {
        self.inventory_lookups.lock().unwrap().push(item_code.into());
        if let Some(err) = self.inventory_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.inventory.lock().unwrap().get(item_code).cloned())
    }

    async fn search_customer(&self, query: &CustomerQuery) -> Result<Option<String>> {
        self.searches.lock().unwrap().push(query.clone());
        Ok(self.customers.lock().unwrap().iter().find(|(q, _)| q == query).map(|(_, id)| id.clone()))
    }

    async fn get_customer_addresses(&self, customer_id: &str) -> Result<Vec<CustomerAddress>> {
        Ok(self.addresses.lock().unwrap().get(customer_id).cloned().unwrap_or_default())
    }

    async fn add_customer(&self, customer: &NewCustomer) -> Result<String> {
        let mut created = self.created_customers.lock().unwrap();
        created.push(customer.clone());
        Ok(format!("NEW-CUST-{}", created.len()))
    }

    async fn add_order(&self, order: &NewOrder) -> Result<String> {
        if let Some(err) = self.order_failure.lock().unwrap().clone() {
            return Err(err);
        }
        let mut created = self.created_orders.lock().unwrap();
        created.push(order.clone());
        let id = format!("EV-{}", 5000 + created.len());
        self.remote_orders.lock().unwrap().insert(
            id.clone(),
            RemoteOrder { order_id: id.clone(), po_number: Some(order.po_number.clone()), status: None },
        );
        Ok(id)
    }

    async fn get_order(&self, evosus_order_id: &str) -> Result<Option<RemoteOrder>> {
        Ok(self.remote_orders.lock().unwrap().get(evosus_order_id).cloned())
    }

    async fn get_tax_codes(&self) -> Result<Value> {
        Ok(json!([{ "SalesTax_PK": "7", "Name": "HST 13%" }]))
    }
}
