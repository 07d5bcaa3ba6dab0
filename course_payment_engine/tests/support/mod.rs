use std::env;

use course_payment_engine::SqliteDatabase;
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// Creates a fresh, fully migrated SQLite database in the system temp directory and returns a
/// handle to it. Each call gets its own database so tests can run concurrently.
pub async fn prepare_test_db() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_url();
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(&url).await.expect("Error creating database");
    debug!("🚀️ Created Sqlite database {url}");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
    db
}

fn random_db_url() -> String {
    format!("sqlite://{}/cpg_test_{}.db", env::temp_dir().display(), rand::random::<u64>())
}
