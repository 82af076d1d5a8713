//! Composition root
//!
//! Builds every adapter and service once from [`Config`] and hands out
//! shared handles to the commands.

use std::sync::Arc;

use evosync_common::{Clock, SystemClock};
use evosync_core::{
    AuditLogger, AutoSyncTrigger, CustomerResolver, NotifierList, OrderStore, OrderSubmitter,
    OrderValidator, QueueService, QueueSettings, SkuMapper, SyncOrchestrator, SyncReporter,
    SyncService, TaxCodeResolver, WebhookAuth, WebhookHandler,
};
use evosync_domain::{Config, Result};
use evosync_infra::{
    AuditNotifier, DbManager, EvosusClient, NotificationPolicy, QueueSchedulerConfig, QueueWorker,
    SqliteLogRepository, SqliteOrderStore, SqliteQueueRepository, SqliteSkuMappingRepository,
    TracingNotifier, WebhookState,
};
use tracing::debug;

pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub audit: Arc<AuditLogger>,
    pub orders: Arc<SqliteOrderStore>,
    pub erp: Arc<EvosusClient>,
    pub mapper: Arc<SkuMapper>,
    pub sync: Arc<SyncService>,
    pub queue: Arc<QueueService>,
    pub reporter: SyncReporter,
    pub webhook: Arc<WebhookHandler>,
}

impl AppContext {
    /// Open the database (running migrations) and wire the services.
    ///
    /// # Errors
    /// Database or HTTP client construction failures.
    pub fn build(config: Config) -> Result<Self> {
        Self::build_with_clock(config, Arc::new(SystemClock))
    }

    pub fn build_with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;
        debug!(path = %db.path().display(), "database ready");

        let audit = Arc::new(
            AuditLogger::new(Arc::new(SqliteLogRepository::new(Arc::clone(&db))), Arc::clone(&clock))
                .with_max_query_limit(config.logs.max_query_limit),
        );
        let orders = Arc::new(SqliteOrderStore::new(Arc::clone(&db), Arc::clone(&clock)));
        let store: Arc<dyn OrderStore> = orders.clone();

        let erp = Arc::new(EvosusClient::from_config(&config.evosus, Arc::clone(&audit), Arc::clone(&clock))?);
        let mapper = Arc::new(SkuMapper::new(
            Arc::new(SqliteSkuMappingRepository::new(Arc::clone(&db))),
            Arc::clone(&clock),
        ));

        let validator = Arc::new(OrderValidator::new(erp.clone(), Arc::clone(&mapper)));
        let resolver = Arc::new(CustomerResolver::new(erp.clone(), Arc::clone(&audit)));
        let submitter = Arc::new(OrderSubmitter::new(
            erp.clone(),
            Arc::clone(&mapper),
            Arc::clone(&audit),
            Arc::clone(&clock),
            config.sync.distribution_method_id.clone(),
        ));

        let policy = NotificationPolicy::from_config(&config.notifications);
        let notifiers = NotifierList::new()
            .with(Arc::new(TracingNotifier::new(policy.clone())))
            .with(Arc::new(AuditNotifier::new(policy, Arc::clone(&audit))));

        let orchestrator = Arc::new(SyncOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&validator),
            resolver,
            TaxCodeResolver::from_config(&config.sync),
            submitter,
            Arc::clone(&audit),
            notifiers,
            Arc::clone(&clock),
        ));
        let sync = Arc::new(SyncService::new(
            Arc::clone(&store),
            erp.clone(),
            orchestrator,
            validator,
            Arc::clone(&audit),
        ));

        let queue_repo = Arc::new(SqliteQueueRepository::new(Arc::clone(&db)));
        let queue = Arc::new(QueueService::new(
            queue_repo.clone(),
            Arc::clone(&sync),
            Arc::clone(&audit),
            Arc::clone(&clock),
            QueueSettings::from_config(&config.queue, config.evosus.is_usable()),
        ));

        let trigger = Arc::new(AutoSyncTrigger::new(Arc::clone(&store), Arc::clone(&queue), config.sync.auto_sync));
        let webhook = Arc::new(
            WebhookHandler::new(Arc::clone(&store), Arc::clone(&mapper), Arc::clone(&audit)).with_auto_sync(trigger),
        );
        let reporter = SyncReporter::new(store, queue_repo, Arc::clone(&audit), clock);

        Ok(Self { config, db, audit, orders, erp, mapper, sync, queue, reporter, webhook })
    }

    pub fn webhook_state(&self) -> Arc<WebhookState> {
        Arc::new(WebhookState { auth: WebhookAuth::from_config(&self.config.webhook), handler: Arc::clone(&self.webhook) })
    }

    pub fn queue_worker(&self) -> Arc<QueueWorker> {
        Arc::new(QueueWorker::new(Arc::clone(&self.queue), Arc::clone(&self.audit), self.config.logs.retention_days))
    }

    pub fn scheduler_config(&self) -> QueueSchedulerConfig {
        QueueSchedulerConfig::from_config(&self.config)
    }
}
