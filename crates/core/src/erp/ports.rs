//! Port interface for the Evosus API
//!
//! Implementations own transport concerns (authentication, retries, audit
//! logging of each call, response-shape normalisation). Expected "nothing
//! there" answers are `Ok(None)`/empty; `Err` means the call itself failed.

use async_trait::async_trait;
use evosync_domain::{
    CustomerAddress, CustomerQuery, InventoryItem, NewCustomer, NewOrder, RemoteOrder, Result,
};

#[async_trait]
pub trait ErpClient: Send + Sync {
    /// `Inventory_Item_Get`; `None` when the item code is unknown.
    async fn get_inventory_item(&self, item_code: &str) -> Result<Option<InventoryItem>>;

    /// `Customer_Search`; id of the first match.
    async fn search_customer(&self, query: &CustomerQuery) -> Result<Option<String>>;

    /// `Customer_Addresses_Get`
    async fn get_customer_addresses(&self, customer_id: &str) -> Result<Vec<CustomerAddress>>;

    /// `Customer_Add`; id of the new customer.
    async fn add_customer(&self, customer: &NewCustomer) -> Result<String>;

    /// `Customer_Order_Add`; id of the new order.
    async fn add_order(&self, order: &NewOrder) -> Result<String>;

    /// Look an order up by id, falling back to open and recently closed
    /// order searches.
    async fn get_order(&self, evosus_order_id: &str) -> Result<Option<RemoteOrder>>;

    /// `TaxCodes_Get`, returned as received for operator inspection.
    async fn get_tax_codes(&self) -> Result<serde_json::Value>;
}
