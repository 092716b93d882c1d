use polyclinic::bootstrap;
use polyclinic::config::Config;
use polyclinic::infrastructure::http::middleware::AppState;
use polyclinic::infrastructure::persistence::Database;
use std::collections::HashMap;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hs256";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@polyclinic.test";
pub const ADMIN_PASSWORD: &str = "Adm1n!Passw0rd";

pub async fn setup_test_db() -> Database {
    // Install drivers for AnyPool (required for tests)
    sqlx::any::install_default_drivers();

    // Unique file per test so tests run in parallel
    let path = std::env::temp_dir().join(format!("polyclinic_test_{}.db", Uuid::new_v4()));
    let db_url = format!("sqlite://{}?mode=rwc", path.display());

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations on test database");

    db
}

pub async fn teardown_test_db(db: Database) {
    db.pool().close().await;
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("JWT_SECRET", TEST_JWT_SECRET),
        ("JWT_ISSUER", "polyclinic-test"),
        ("JWT_AUDIENCE", "polyclinic-test-api"),
        ("ADMIN_USERNAME", ADMIN_USERNAME),
        ("ADMIN_EMAIL", ADMIN_EMAIL),
        ("ADMIN_PASSWORD", ADMIN_PASSWORD),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("Test configuration must be valid")
}

/// Fresh database plus fully wired services, with the bootstrap admin created.
pub async fn setup_test_state() -> (Database, AppState) {
    let db = setup_test_db().await;
    let config = test_config();
    let state = bootstrap::build_app_state(db.clone(), &config);
    bootstrap::initialize_admin(&state, &config)
        .await
        .expect("Failed to create admin user");
    (db, state)
}
