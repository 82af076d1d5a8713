//! Customer resolver
//!
//! Finds the Evosus customer for an order with a cascading search (email,
//! then phone digits, then name + street), creating one when nothing
//! matches. The cascade is this system's duplicate check, so customers are
//! created with remote duplicate checking disabled.

use std::sync::Arc;

use evosync_domain::{
    CustomerAddress, CustomerQuery, CustomerResolution, EvosyncError, Order, Result,
};
use serde_json::json;
use tracing::{info, instrument};

use super::payload::{digits_only, new_customer_from_order};
use crate::audit::AuditLogger;
use crate::erp::ports::ErpClient;

pub struct CustomerResolver {
    erp: Arc<dyn ErpClient>,
    audit: Arc<AuditLogger>,
}

impl CustomerResolver {
    pub fn new(erp: Arc<dyn ErpClient>, audit: Arc<AuditLogger>) -> Self {
        Self { erp, audit }
    }

    /// Resolve (or create) the customer and bill-to/ship-to locations.
    ///
    /// # Errors
    /// [`EvosyncError::Resolution`] when a customer has no usable address;
    /// transport errors from the Evosus client otherwise.
    #[instrument(skip(self, order), fields(order_id = order.id))]
    pub async fn find_or_create(&self, order: &Order) -> Result<CustomerResolution> {
        if let Some((customer_id, query)) = self.search(order).await? {
            info!(customer_id = %customer_id, matched_by = query.label(), "existing customer found");
            self.audit
                .log_info(
                    &format!("Existing customer found via {}: {customer_id}", query.label()),
                    None,
                    Some(order.id),
                )
                .await;

            let (bill_to, ship_to) = self.locations(&customer_id, order.id).await?.ok_or_else(|| {
                EvosyncError::Resolution(format!(
                    "Customer exists in Evosus (ID: {customer_id}) but has no addresses configured. Please add an address in Evosus first."
                ))
            })?;
            return Ok(CustomerResolution {
                customer_id,
                bill_to_location_id: bill_to,
                ship_to_location_id: ship_to,
                is_new: false,
            });
        }

        self.create(order).await
    }

    async fn search(&self, order: &Order) -> Result<Option<(String, CustomerQuery)>> {
        for query in cascade(order) {
            if let Some(customer_id) = self.erp.search_customer(&query).await? {
                if matches!(query, CustomerQuery::NameAndAddress { .. }) {
                    self.audit
                        .log_info(
                            &format!("Customer {customer_id} matched by name+address (fuzzy match)"),
                            Some(&json!({"query": query})),
                            Some(order.id),
                        )
                        .await;
                }
                return Ok(Some((customer_id, query)));
            }
        }
        Ok(None)
    }

    async fn create(&self, order: &Order) -> Result<CustomerResolution> {
        self.audit
            .log_info("No existing customer found, creating new customer", None, Some(order.id))
            .await;
        let customer_id = self.erp.add_customer(&new_customer_from_order(order)).await?;
        info!(customer_id = %customer_id, "customer created");
        self.audit.log_info(&format!("New customer created: {customer_id}"), None, Some(order.id)).await;

        let (bill_to, ship_to) = self.locations(&customer_id, order.id).await?.ok_or_else(|| {
            EvosyncError::Resolution(format!(
                "Customer created in Evosus (ID: {customer_id}) but no addresses were returned"
            ))
        })?;
        Ok(CustomerResolution {
            customer_id,
            bill_to_location_id: bill_to,
            ship_to_location_id: ship_to,
            is_new: true,
        })
    }

    /// Default bill-to/ship-to locations, each falling back to the first
    /// address. `None` when the customer has no addresses at all.
    async fn locations(&self, customer_id: &str, order_id: i64) -> Result<Option<(String, String)>> {
        let addresses = self.erp.get_customer_addresses(customer_id).await?;
        let Some(selection) = select_locations(&addresses) else {
            self.audit
                .log_error(
                    &format!("Customer {customer_id} has no addresses in Evosus"),
                    None,
                    Some(order_id),
                )
                .await;
            return Ok(None);
        };

        if selection.bill_to_fallback {
            self.audit
                .log_info(
                    &format!(
                        "No default BillTo address found for customer {customer_id}, using first address: {}",
                        selection.bill_to
                    ),
                    None,
                    Some(order_id),
                )
                .await;
        }
        if selection.ship_to_fallback {
            self.audit
                .log_info(
                    &format!(
                        "No default ShipTo address found for customer {customer_id}, using first address: {}",
                        selection.ship_to
                    ),
                    None,
                    Some(order_id),
                )
                .await;
        }
        Ok(Some((selection.bill_to, selection.ship_to)))
    }
}

/// Search stages for `order`, skipping those whose inputs are empty.
fn cascade(order: &Order) -> Vec<CustomerQuery> {
    let billing = &order.billing;
    let mut queries = Vec::with_capacity(3);

    let email = billing.email.trim();
    if !email.is_empty() {
        queries.push(CustomerQuery::Email(email.to_string()));
    }
    let phone = digits_only(&billing.phone);
    if !phone.is_empty() {
        queries.push(CustomerQuery::Phone(phone));
    }
    if !billing.first_name.trim().is_empty() && billing.has_street() {
        queries.push(CustomerQuery::NameAndAddress {
            name: billing.full_name(),
            address1: billing.address_1.clone(),
        });
    }
    queries
}

struct LocationSelection {
    bill_to: String,
    ship_to: String,
    bill_to_fallback: bool,
    ship_to_fallback: bool,
}

fn select_locations(addresses: &[CustomerAddress]) -> Option<LocationSelection> {
    let first = addresses.first()?;
    let default_bill = addresses.iter().rev().find(|a| a.is_default_bill_to);
    let default_ship = addresses.iter().rev().find(|a| a.is_default_ship_to);

    Some(LocationSelection {
        bill_to: default_bill.unwrap_or(first).location_id.clone(),
        ship_to: default_ship.unwrap_or(first).location_id.clone(),
        bill_to_fallback: default_bill.is_none(),
        ship_to_fallback: default_ship.is_none(),
    })
}
