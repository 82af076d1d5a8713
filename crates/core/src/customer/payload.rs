//! `Customer_Add` payload construction

use evosync_domain::constants::LEGACY_CUSTOMER_PREFIX;
use evosync_domain::{NewCustomer, Order};

/// Evosus expects full country names.
pub fn country_name(code: &str) -> String {
    match code.trim().to_ascii_uppercase().as_str() {
        "US" => "United States".to_string(),
        "CA" => "Canada".to_string(),
        _ => code.to_string(),
    }
}

pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Build the new-customer record from the order's billing and shipping
/// blocks; shipping falls back to billing when it has no street line.
pub fn new_customer_from_order(order: &Order) -> NewCustomer {
    let billing = &order.billing;
    let shipping = order.effective_shipping();

    NewCustomer {
        first_name: billing.first_name.clone(),
        last_name: billing.last_name.clone(),
        company: billing.company.clone(),
        bill_to_contact_name: billing.full_name(),
        bill_to_address1: billing.address_1.clone(),
        bill_to_address2: billing.address_2.clone(),
        bill_to_city: billing.city.clone(),
        bill_to_state: billing.state.clone(),
        bill_to_postcode: billing.postcode.clone(),
        bill_to_country: country_name(&billing.country),
        ship_to_contact_name: shipping.full_name(),
        ship_to_address1: shipping.address_1.clone(),
        ship_to_address2: shipping.address_2.clone(),
        ship_to_city: shipping.city.clone(),
        ship_to_state: shipping.state.clone(),
        ship_to_postcode: shipping.postcode.clone(),
        ship_to_country: country_name(&shipping.country),
        phone: digits_only(&billing.phone),
        email: billing.email.clone(),
        legacy_system_id: format!("{LEGACY_CUSTOMER_PREFIX}{}", order.customer_id),
        note: format!("Customer created from WooCommerce Order #{}", order.number),
        check_duplicates: "FALSE".to_string(),
    }
}
