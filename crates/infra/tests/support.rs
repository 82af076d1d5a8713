use std::sync::Arc;

use evosync_infra::database::DbManager;
use tempfile::TempDir;

/// Temporary migrated database that keeps the file alive for the test.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager =
            DbManager::new(temp_dir.path().join("test.db"), 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");
        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}
