//! Evosus web API client
//!
//! Every method is a `POST {base}/method/<Name>?CompanySN=..&ticket=..`
//! with a `{"args": {...}}` body. Credentials travel in the query string,
//! so endpoints are audit-logged by path only and the audit logger redacts
//! anything that slips through in bodies.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::DateTime;
use evosync_common::Clock;
use evosync_core::{ApiCallRecord, AuditLogger, ErpClient};
use evosync_domain::constants::CLOSED_ORDER_LOOKBACK_DAYS;
use evosync_domain::{
    CustomerAddress, CustomerQuery, EvosusConfig, EvosyncError, InventoryItem, NewCustomer,
    NewOrder, RemoteOrder, Result,
};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::simulation::SimulatedEvosus;
use super::wire::{self, Envelope, CUSTOMER_ID_KEYS, ORDER_ID_KEYS};
use crate::errors::{status_error, InfraError};
use crate::http::{Attempt, HttpClient};

const SECONDS_PER_DAY: i64 = 86_400;
const REMOTE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

enum Transport {
    Http { http: HttpClient, base_url: String, credentials: Option<(String, String)> },
    Simulated(Arc<SimulatedEvosus>),
}

/// [`ErpClient`] over the Evosus HTTP API (or its in-process simulation)
pub struct EvosusClient {
    transport: Transport,
    audit: Arc<AuditLogger>,
    clock: Arc<dyn Clock>,
}

impl EvosusClient {
    /// Build from configuration; `test_mode` selects the simulation.
    pub fn from_config(
        config: &EvosusConfig,
        audit: Arc<AuditLogger>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if config.test_mode {
            info!("Evosus test mode enabled; API calls are simulated");
            return Ok(Self::simulated(Arc::new(SimulatedEvosus::new()), audit, clock));
        }
        let http = HttpClient::for_evosus(config)?;
        let credentials = config
            .has_credentials()
            .then(|| (config.company_sn.trim().to_string(), config.ticket.trim().to_string()));
        if credentials.is_none() {
            warn!("Evosus credentials are not configured; remote calls will be refused");
        }
        Ok(Self {
            transport: Transport::Http { http, base_url: config.base_url.clone(), credentials },
            audit,
            clock,
        })
    }

    pub fn http(
        http: HttpClient,
        base_url: impl Into<String>,
        company_sn: impl Into<String>,
        ticket: impl Into<String>,
        audit: Arc<AuditLogger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport: Transport::Http {
                http,
                base_url: base_url.into(),
                credentials: Some((company_sn.into(), ticket.into())),
            },
            audit,
            clock,
        }
    }

    pub fn simulated(
        simulation: Arc<SimulatedEvosus>,
        audit: Arc<AuditLogger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { transport: Transport::Simulated(simulation), audit, clock }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self.transport, Transport::Simulated(_))
    }

    /// Invoke an Evosus method and return the envelope's `response` payload.
    #[instrument(skip(self, args))]
    pub async fn call(&self, method: &str, args: Value) -> Result<Value> {
        let endpoint = format!("/method/{method}");
        let body = json!({ "args": args });

        match &self.transport {
            Transport::Simulated(simulation) => {
                let started = Instant::now();
                let response = simulation.respond(method, &body["args"]);
                self.audit
                    .log_api_call(ApiCallRecord {
                        endpoint,
                        method: "POST".into(),
                        request: Some(body),
                        response: Some(response.clone()),
                        status_code: Some(200),
                        duration: started.elapsed(),
                        error: None,
                        attempt: 0,
                    })
                    .await;
                wire::envelope_from_value(response).into_payload(200)
            }
            Transport::Http { http, base_url, credentials } => {
                let (company_sn, ticket) = credentials.as_ref().ok_or_else(|| {
                    EvosyncError::Config(
                        "Missing API credentials: set evosus.company_sn and evosus.ticket".into(),
                    )
                })?;
                let url = method_url(base_url, method, company_sn, ticket)?;
                self.send(http, url, endpoint, body).await
            }
        }
    }

    /// Retry loop over single HTTP attempts; every attempt gets its own
    /// audit row.
    async fn send(&self, http: &HttpClient, url: Url, endpoint: String, body: Value) -> Result<Value> {
        let request = http.request(Method::POST, url).json(&body);
        let attempts = http.max_attempts().max(1);

        for attempt in 1..=attempts {
            let last = attempt == attempts;
            let started = Instant::now();
            let record =
                |response: Option<Value>, status_code: Option<u16>, error: Option<String>| ApiCallRecord {
                    endpoint: endpoint.clone(),
                    method: "POST".into(),
                    request: Some(body.clone()),
                    response,
                    status_code,
                    duration: started.elapsed(),
                    error,
                    attempt: u32::try_from(attempt).unwrap_or(u32::MAX),
                };

            let response = match http.attempt(&request, attempt).await? {
                Attempt::Response(response) => response,
                Attempt::Transport { error, retryable } => {
                    self.audit.log_api_call(record(None, None, Some(error.to_string()))).await;
                    if retryable && !last {
                        http.wait_before_retry(attempt).await;
                        continue;
                    }
                    self.audit
                        .log_error(
                            &format!("API request failed after {attempt} attempt(s): {error}"),
                            Some(&json!({ "endpoint": endpoint })),
                            None,
                        )
                        .await;
                    return Err(error);
                }
            };

            let status = response.status();
            let code = status.as_u16();
            let text = response.text().await.map_err(|err| EvosyncError::from(InfraError::from(err)))?;
            let logged: Value = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()));
            let envelope = wire::parse_envelope(&text);

            let error = if !status.is_success() {
                Some(format!("HTTP {code}"))
            } else {
                match &envelope {
                    Ok(env) if env.is_rejection() => env.message.clone(),
                    Ok(_) => None,
                    Err(err) => Some(err.to_string()),
                }
            };
            self.audit.log_api_call(record(Some(logged), Some(code), error)).await;

            if status.is_server_error() && !last {
                http.wait_before_retry(attempt).await;
                continue;
            }
            if !status.is_success() {
                let failure = http_failure(code, status.canonical_reason(), envelope.ok().as_ref());
                self.audit
                    .log_error(
                        &format!("API returned error status: {code}"),
                        Some(&json!({ "endpoint": endpoint })),
                        None,
                    )
                    .await;
                return Err(failure);
            }
            return envelope?.into_payload(code);
        }

        Err(EvosyncError::Internal(format!("{endpoint} exhausted retries without a response")))
    }

    /// Lookups treat a rejection (`ER` envelope, 4xx) as "nothing found";
    /// only transport faults, auth failures and 5xx propagate.
    async fn lookup_stage(&self, method: &str, args: Value) -> Result<Option<Value>> {
        match self.call(method, args).await {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if is_lookup_miss(&err) => {
                debug!(method, error = %err, "lookup found nothing");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

fn method_url(base_url: &str, method: &str, company_sn: &str, ticket: &str) -> Result<Url> {
    let raw = format!("{}/method/{method}", base_url.trim_end_matches('/'));
    let mut url = Url::parse(&raw)
        .map_err(|err| EvosyncError::Config(format!("Invalid Evosus base URL '{base_url}': {err}")))?;
    url.query_pairs_mut().append_pair("CompanySN", company_sn).append_pair("ticket", ticket);
    Ok(url)
}

fn http_failure(code: u16, reason: Option<&str>, envelope: Option<&Envelope>) -> EvosyncError {
    let remote_message = envelope.and_then(|env| env.message.clone()).filter(|m| !m.trim().is_empty());
    match (status_error(code, reason.unwrap_or("unknown status")), remote_message) {
        (EvosyncError::Remote { status, .. }, Some(message)) => EvosyncError::Remote { status, message },
        (mapped, _) => mapped,
    }
}

/// A lookup stage that rejected or missed, as opposed to one that could not run.
fn is_lookup_miss(err: &EvosyncError) -> bool {
    match err {
        EvosyncError::NotFound(_) => true,
        EvosyncError::Remote { status, .. } => (200..500).contains(status),
        _ => false,
    }
}

fn format_remote_date(unix: i64) -> String {
    DateTime::from_timestamp(unix, 0)
        .map(|dt| dt.format(REMOTE_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn missing_id(method: &str, what: &str) -> EvosyncError {
    EvosyncError::Remote { status: 200, message: format!("{method} did not return {what}") }
}

#[async_trait]
impl ErpClient for EvosusClient {
    async fn get_inventory_item(&self, item_code: &str) -> Result<Option<InventoryItem>> {
        Ok(self
            .lookup_stage("Inventory_Item_Get", json!({ "ItemCode": item_code }))
            .await?
            .and_then(|payload| wire::inventory_item(&payload, item_code)))
    }

    async fn search_customer(&self, query: &CustomerQuery) -> Result<Option<String>> {
        let args = match query {
            CustomerQuery::Email(email) => json!({ "EmailAddress_List": email }),
            CustomerQuery::Phone(digits) => json!({ "PhoneNumber_List": digits }),
            CustomerQuery::NameAndAddress { name, address1 } => {
                json!({ "Name": name, "Address1": address1 })
            }
        };
        Ok(self.lookup_stage("Customer_Search", args).await?.and_then(|payload| {
            wire::as_list(&payload).first().and_then(|first| wire::as_id(first, &CUSTOMER_ID_KEYS))
        }))
    }

    async fn get_customer_addresses(&self, customer_id: &str) -> Result<Vec<CustomerAddress>> {
        let payload = self.call("Customer_Addresses_Get", json!({ "Customer_ID": customer_id })).await?;
        Ok(wire::customer_addresses(&payload))
    }

    async fn add_customer(&self, customer: &NewCustomer) -> Result<String> {
        let args = serde_json::to_value(customer).map_err(|err| EvosyncError::from(InfraError::from(err)))?;
        let payload = self.call("Customer_Add", args).await?;
        let customer_id =
            wire::as_id(&payload, &CUSTOMER_ID_KEYS).ok_or_else(|| missing_id("Customer_Add", "a customer id"))?;
        info!(customer_id = %customer_id, "Evosus customer created");
        Ok(customer_id)
    }

    async fn add_order(&self, order: &NewOrder) -> Result<String> {
        let args = serde_json::to_value(order).map_err(|err| EvosyncError::from(InfraError::from(err)))?;
        let payload = self.call("Customer_Order_Add", args).await?;
        let order_id = wire::as_id(&payload, &ORDER_ID_KEYS)
            .ok_or_else(|| missing_id("Customer_Order_Add", "an order id"))?;
        info!(evosus_order_id = %order_id, po_number = %order.po_number, "Evosus order created");
        Ok(order_id)
    }

    async fn get_order(&self, evosus_order_id: &str) -> Result<Option<RemoteOrder>> {
        if let Some(payload) =
            self.lookup_stage("Order_Get", json!({ "OrderID": evosus_order_id })).await?
        {
            let list = wire::as_list(&payload);
            if let Some(first) = list.first().filter(|record| record.is_object()) {
                return Ok(Some(wire::remote_order(first, evosus_order_id)));
            }
        }

        if let Some(payload) = self
            .lookup_stage("Orders_Open_Search", json!({ "OrderID_List": evosus_order_id }))
            .await?
        {
            if let Some(order) = wire::find_order(&payload, evosus_order_id) {
                return Ok(Some(order));
            }
        }

        let now = self.clock.now_unix();
        let args = json!({
            "Begin_Date": format_remote_date(now - CLOSED_ORDER_LOOKBACK_DAYS * SECONDS_PER_DAY),
            "End_Date": format_remote_date(now),
            "OrderID_List": evosus_order_id,
        });
        Ok(self
            .lookup_stage("Orders_Closed_Search", args)
            .await?
            .and_then(|payload| wire::find_order(&payload, evosus_order_id)))
    }

    async fn get_tax_codes(&self) -> Result<Value> {
        self.call("TaxCodes_Get", json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use evosync_common::MockClock;
    use evosync_core::LogRepository;
    use evosync_domain::{LogEntry, LogFilter, LogStat, LogType, OrderLine};
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Default)]
    struct CapturedLogs(Mutex<Vec<LogEntry>>);

    #[async_trait]
    impl LogRepository for CapturedLogs {
        async fn insert(&self, entry: &LogEntry) -> Result<i64> {
            let mut entries = self.0.lock().unwrap();
            entries.push(entry.clone());
            Ok(entries.len() as i64)
        }

        async fn query(&self, _filter: &LogFilter) -> Result<Vec<LogEntry>> {
            Ok(self.0.lock().unwrap().clone())
        }

        async fn delete_older_than(&self, _cutoff: i64) -> Result<u64> {
            Ok(0)
        }

        async fn stats_since(&self, _since: i64) -> Result<Vec<LogStat>> {
            Ok(vec![])
        }
    }

    const NOW: i64 = 1_715_867_100;

    fn client(server: &MockServer, logs: Arc<CapturedLogs>) -> EvosusClient {
        let clock: Arc<dyn Clock> = Arc::new(MockClock::at(NOW));
        let audit = Arc::new(AuditLogger::new(logs, clock.clone()));
        let http = HttpClient::builder()
            .base_backoff(Duration::from_millis(5))
            .max_attempts(4)
            .build()
            .unwrap();
        EvosusClient::http(http, format!("{}/api", server.uri()), "SN-77", "secret-ticket", audit, clock)
    }

    fn ok(payload: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "code": "OK", "message": "", "response": payload }))
    }

    fn sample_order() -> NewOrder {
        NewOrder {
            customer_id: "C-1".into(),
            bill_to_location_id: "L-1".into(),
            ship_to_location_id: "L-2".into(),
            distribution_method_id: "1".into(),
            expected_order_total: "56.50".into(),
            po_number: "1042".into(),
            order_note: "Order from WooCommerce #1042".into(),
            internal_note: String::new(),
            line_items: vec![OrderLine {
                item_code: "PUMP-1".into(),
                quantity: 1,
                unit_price: 50.0,
                comment: "Pump".into(),
            }],
            sales_tax_pk: Some("7".into()),
        }
    }

    #[tokio::test]
    async fn credentials_travel_as_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/method/Inventory_Item_Get"))
            .and(query_param("CompanySN", "SN-77"))
            .and(query_param("ticket", "secret-ticket"))
            .and(body_partial_json(json!({ "args": { "ItemCode": "PUMP-1" } })))
            .respond_with(ok(json!([{
                "ItemCode": "PUMP-1",
                "Description": "Pool pump",
                "Discontinued": "No",
                "QuantityAvailable": 4
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let logs = Arc::new(CapturedLogs::default());
        let item = client(&server, logs.clone()).get_inventory_item("PUMP-1").await.unwrap().unwrap();
        assert_eq!(item.quantity_available, 4.0);
        assert!(!item.discontinued);

        let entries = logs.0.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].log_type, LogType::ApiCall);
        assert_eq!(entries[0].endpoint.as_deref(), Some("/method/Inventory_Item_Get"));
        assert!(!format!("{:?}", entries[0]).contains("secret-ticket"));
    }

    #[tokio::test]
    async fn empty_inventory_list_means_unknown_item() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ok(json!([]))).mount(&server).await;

        let item = client(&server, Arc::default()).get_inventory_item("NOPE").await.unwrap();
        assert!(item.is_none());
    }

    #[tokio::test]
    async fn order_id_accepts_object_or_scalar() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/method/Customer_Order_Add"))
            .and(body_partial_json(json!({ "args": { "PONumber": "1042", "SalesTax_PK": "7" } })))
            .respond_with(ok(json!({ "OrderId": 90210 })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/method/Customer_Add"))
            .respond_with(ok(json!("CUST-5")))
            .mount(&server)
            .await;

        let client = client(&server, Arc::default());
        assert_eq!(client.add_order(&sample_order()).await.unwrap(), "90210");
        assert_eq!(client.add_customer(&NewCustomer::default()).await.unwrap(), "CUST-5");
    }

    #[tokio::test]
    async fn rejection_envelope_surfaces_remote_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "ER",
                "message": "Customer location is inactive",
                "response": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let logs = Arc::new(CapturedLogs::default());
        let err = client(&server, logs.clone()).add_order(&sample_order()).await.unwrap_err();
        assert_eq!(err.user_message(), "Customer location is inactive");
        assert_eq!(logs.0.lock().unwrap()[0].severity, evosync_domain::LogSeverity::Error);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "code": "ER",
                "message": "Invalid ItemCode"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server, Arc::default()).get_tax_codes().await.unwrap_err();
        assert_eq!(err, EvosyncError::Remote { status: 422, message: "Invalid ItemCode".into() });
    }

    #[tokio::test]
    async fn server_errors_are_retried_three_times() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(4)
            .mount(&server)
            .await;

        let logs = Arc::new(CapturedLogs::default());
        let err = client(&server, logs.clone()).get_tax_codes().await.unwrap_err();
        assert!(err.is_transient());

        let entries = logs.0.lock().unwrap();
        let attempts: Vec<Value> = entries
            .iter()
            .filter(|entry| entry.log_type == LogType::ApiCall)
            .map(|entry| serde_json::from_str::<Value>(entry.context.as_deref().unwrap()).unwrap()["attempt"].clone())
            .collect();
        assert_eq!(attempts, vec![json!(1), json!(2), json!(3), json!(4)]);
        assert!(entries.iter().any(|entry| entry.log_type == LogType::Error));
    }

    #[tokio::test]
    async fn rejected_inventory_lookup_is_an_unknown_item() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/method/Inventory_Item_Get"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "ER",
                "message": "Item not found"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let item = client(&server, Arc::default()).get_inventory_item("GHOST-1").await.unwrap();
        assert!(item.is_none());
    }

    #[tokio::test]
    async fn rejection_envelope_on_inventory_lookup_is_an_unknown_item() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/method/Inventory_Item_Get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "ER",
                "message": "ItemCode does not exist",
                "response": null
            })))
            .mount(&server)
            .await;

        assert!(client(&server, Arc::default()).get_inventory_item("GHOST-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejected_customer_search_finds_nobody() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/method/Customer_Search"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "ER",
                "message": "No customers found"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let found = client(&server, Arc::default())
            .search_customer(&CustomerQuery::Email("nobody@example.com".into()))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn unauthorised_lookup_still_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "code": "ER",
                "message": "Invalid ticket"
            })))
            .mount(&server)
            .await;

        let client = client(&server, Arc::default());
        assert!(client.get_inventory_item("PUMP-1").await.is_err());
        assert!(client.search_customer(&CustomerQuery::Phone("5551234567".into())).await.is_err());
    }

    #[tokio::test]
    async fn server_error_on_lookup_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/method/Customer_Search"))
            .respond_with(ResponseTemplate::new(500))
            .expect(4)
            .mount(&server)
            .await;

        let err = client(&server, Arc::default())
            .search_customer(&CustomerQuery::Email("a@b.c".into()))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn addresses_normalise_default_flags() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "args": { "Customer_ID": "C-1" } })))
            .respond_with(ok(json!([
                { "CustomerLocationID": "L-1", "IsDefaultBillTo": "Yes", "IsDefaultShipTo": "No" },
                { "CustomerLocationID": 2, "IsDefaultBillTo": false, "IsDefaultShipTo": 1 }
            ])))
            .mount(&server)
            .await;

        let addresses = client(&server, Arc::default()).get_customer_addresses("C-1").await.unwrap();
        assert_eq!(addresses.len(), 2);
        assert!(addresses[0].is_default_bill_to);
        assert!(addresses[1].is_default_ship_to);
        assert_eq!(addresses[1].location_id, "2");
    }

    #[tokio::test]
    async fn order_lookup_falls_back_to_closed_search() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/method/Order_Get"))
            .respond_with(ok(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/method/Orders_Open_Search"))
            .respond_with(ok(json!([{ "OrderId": "EV-1", "PoNo": "999" }])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/method/Orders_Closed_Search"))
            .and(body_partial_json(json!({ "args": { "End_Date": "2024-05-16 13:45:00" } })))
            .respond_with(ok(json!([{ "OrderId": 5001, "PoNo": "1042", "Status": "Closed" }])))
            .expect(1)
            .mount(&server)
            .await;

        let order = client(&server, Arc::default()).get_order("5001").await.unwrap().unwrap();
        assert_eq!(order.po_number.as_deref(), Some("1042"));
        assert_eq!(order.status.as_deref(), Some("Closed"));
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ok(json!([]))).expect(0).mount(&server).await;

        let clock: Arc<dyn Clock> = Arc::new(MockClock::at(NOW));
        let audit = Arc::new(AuditLogger::new(Arc::new(CapturedLogs::default()), clock.clone()));
        let config = EvosusConfig { base_url: server.uri(), ..EvosusConfig::default() };
        let client = EvosusClient::from_config(&config, audit, clock).unwrap();

        let err = client.get_tax_codes().await.unwrap_err();
        assert!(matches!(err, EvosyncError::Config(msg) if msg.contains("Missing API credentials")));
    }

    #[tokio::test]
    async fn simulation_answers_through_the_same_decoding() {
        let clock: Arc<dyn Clock> = Arc::new(MockClock::at(NOW));
        let logs = Arc::new(CapturedLogs::default());
        let audit = Arc::new(AuditLogger::new(logs.clone(), clock.clone()));
        let config = EvosusConfig { test_mode: true, ..EvosusConfig::default() };
        let client = EvosusClient::from_config(&config, audit, clock).unwrap();
        assert!(client.is_simulated());

        let low = client.get_inventory_item("LOWSTOCK-1").await.unwrap().unwrap();
        assert_eq!(low.quantity_available, 2.0);
        let order_id = client.add_order(&sample_order()).await.unwrap();
        let remote = client.get_order(&order_id).await.unwrap().unwrap();
        assert_eq!(remote.po_number.as_deref(), Some("1042"));
        assert!(logs.0.lock().unwrap().iter().all(|e| e.status_code == Some(200)));
    }
}
