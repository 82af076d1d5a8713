//! Shared test helpers for `evosync-core` integration tests.
//!
//! [`Harness`] wires every service over in-memory ports and a mock clock,
//! so scenario tests only describe the order and the Evosus state.

#![allow(dead_code)]

pub mod erp;
pub mod repositories;

use std::sync::Arc;

use evosync_common::MockClock;
use evosync_core::{
    AuditLogger, AutoSyncTrigger, CustomerResolver, NotifierList, OrderSubmitter, OrderValidator,
    QueueService, QueueSettings, SkuMapper, SyncEvent, SyncObserver, SyncOrchestrator, SyncReporter,
    SyncService, TaxCodeResolver, WebhookHandler,
};
use evosync_domain::{Address, LineItem, Order, SyncConfig};

use self::erp::FakeErp;
use self::repositories::{MemoryLogs, MemoryOrderStore, MemoryQueue, MemorySkuRepo};

pub const NOW: i64 = 1_715_867_100;

/// Collects every published sync event
#[derive(Default)]
pub struct EventLog {
    pub events: std::sync::Mutex<Vec<SyncEvent>>,
}

impl EventLog {
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(SyncEvent::kind).collect()
    }
}

#[async_trait::async_trait]
impl SyncObserver for EventLog {
    async fn on_event(&self, event: &SyncEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub struct Harness {
    pub clock: MockClock,
    pub erp: Arc<FakeErp>,
    pub store: Arc<MemoryOrderStore>,
    pub logs: Arc<MemoryLogs>,
    pub queue_repo: Arc<MemoryQueue>,
    pub events: Arc<EventLog>,
    pub audit: Arc<AuditLogger>,
    pub mapper: Arc<SkuMapper>,
    pub validator: Arc<OrderValidator>,
    pub sync: Arc<SyncService>,
    pub queue: Arc<QueueService>,
    pub reporter: SyncReporter,
}

impl Harness {
    pub fn new(erp: FakeErp) -> Self {
        Self::with_settings(erp, QueueSettings::default())
    }

    pub fn with_settings(erp: FakeErp, settings: QueueSettings) -> Self {
        let clock = MockClock::at(NOW);
        let erp = Arc::new(erp);
        let store = Arc::new(MemoryOrderStore::default());
        let logs = Arc::new(MemoryLogs::default());
        let queue_repo = Arc::new(MemoryQueue::default());
        let events = Arc::new(EventLog::default());

        let audit = Arc::new(AuditLogger::new(logs.clone(), Arc::new(clock.clone())));
        let mapper = Arc::new(SkuMapper::new(Arc::new(MemorySkuRepo::default()), Arc::new(clock.clone())));
        let validator = Arc::new(OrderValidator::new(erp.clone(), Arc::clone(&mapper)));
        let resolver = Arc::new(CustomerResolver::new(erp.clone(), Arc::clone(&audit)));
        let submitter = Arc::new(OrderSubmitter::new(
            erp.clone(),
            Arc::clone(&mapper),
            Arc::clone(&audit),
            Arc::new(clock.clone()),
            "1",
        ));
        let orchestrator = Arc::new(SyncOrchestrator::new(
            store.clone(),
            Arc::clone(&validator),
            resolver,
            TaxCodeResolver::from_config(&SyncConfig::default()),
            submitter,
            Arc::clone(&audit),
            NotifierList::new().with(events.clone()),
            Arc::new(clock.clone()),
        ));
        let sync = Arc::new(SyncService::new(
            store.clone(),
            erp.clone(),
            orchestrator,
            Arc::clone(&validator),
            Arc::clone(&audit),
        ));
        let queue = Arc::new(QueueService::new(
            queue_repo.clone(),
            Arc::clone(&sync),
            Arc::clone(&audit),
            Arc::new(clock.clone()),
            settings,
        ));
        let reporter =
            SyncReporter::new(store.clone(), queue_repo.clone(), Arc::clone(&audit), Arc::new(clock.clone()));

        Self { clock, erp, store, logs, queue_repo, events, audit, mapper, validator, sync, queue, reporter }
    }

    pub fn auto_sync(&self, enabled: bool) -> Arc<AutoSyncTrigger> {
        Arc::new(AutoSyncTrigger::new(self.store.clone(), Arc::clone(&self.queue), enabled))
    }

    pub fn webhook(&self) -> WebhookHandler {
        WebhookHandler::new(self.store.clone(), Arc::clone(&self.mapper), Arc::clone(&self.audit))
    }
}

pub fn item(id: i64, sku: &str, quantity: i64, line_total: f64) -> LineItem {
    LineItem {
        id,
        product_id: Some(100 + id),
        name: format!("Product {id}"),
        sku: sku.into(),
        quantity,
        line_total,
        sku_override: None,
    }
}

/// Processing order from `ada@example.com` with 13% tax.
pub fn order(id: i64, items: Vec<LineItem>) -> Order {
    let subtotal: f64 = items.iter().map(|i| i.line_total).sum();
    let total_tax = (subtotal * 0.13 * 100.0).round() / 100.0;
    Order {
        id,
        number: format!("{}", 1000 + id),
        status: "processing".into(),
        customer_id: 42,
        billing: Address {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            address_1: "12 Analytical St".into(),
            city: "London".into(),
            state: "ON".into(),
            postcode: "N6A 1A1".into(),
            country: "CA".into(),
            email: "ada@example.com".into(),
            phone: "(519) 555-0101".into(),
            ..Address::default()
        },
        shipping: Address::default(),
        items,
        subtotal,
        total_tax,
        total: subtotal + total_tax,
        created_at: NOW - 3_600,
    }
}
