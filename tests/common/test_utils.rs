#![allow(dead_code)]

use cab_booking_system::db::init_schema;
use dotenv::dotenv;
use once_cell::sync::OnceCell;
use sqlx::mysql::MySqlPool as Pool;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::Error;
use std::env;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

// Name of the database created for this test binary, once schema is in place
static TEST_DB: OnceCell<Mutex<Option<String>>> = OnceCell::new();

pub struct TestDb;

fn admin_url() -> Option<String> {
    dotenv().ok();
    env::var("ADMIN_DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

// Server part of the admin url, without the database name
fn base_url(db_url: &str) -> String {
    db_url.split('/').collect::<Vec<&str>>()[..3].join("/")
}

async fn connect(url: &str) -> Result<Pool, Error> {
    MySqlPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await
}

impl TestDb {
    /// Pool on the shared test database, or `None` when no database server
    /// is configured (the calling test then passes without doing anything).
    ///
    /// Every test gets its own pool: each `#[tokio::test]` runs on its own
    /// runtime and connections must not outlive it.
    pub async fn get_instance() -> Result<Option<Pool>, Error> {
        let Some(admin) = admin_url() else {
            eprintln!("ADMIN_DATABASE_URL not set, skipping database test");
            return Ok(None);
        };

        let test_db = TEST_DB.get_or_init(|| Mutex::new(None));
        let mut guard = test_db.lock().await;

        let db_name = match guard.as_ref() {
            Some(name) => name.clone(),
            None => {
                let name = Self::setup_database(&admin).await?;
                *guard = Some(name.clone());
                name
            }
        };

        let pool = connect(&format!("{}/{}", base_url(&admin), db_name)).await?;
        Ok(Some(pool))
    }

    async fn setup_database(admin: &str) -> Result<String, Error> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let db_name = format!("cab_test_{}_{}", std::process::id(), nanos % 1_000_000_000);

        let admin_pool = connect(&base_url(admin)).await?;
        sqlx::query(&format!("CREATE DATABASE {}", db_name))
            .execute(&admin_pool)
            .await?;
        admin_pool.close().await;

        let pool = connect(&format!("{}/{}", base_url(admin), db_name)).await?;
        init_schema(&pool).await?;
        pool.close().await;

        Ok(db_name)
    }

    // Drop the database after the test run (not after each test)
    pub fn cleanup_database_sync() -> Result<(), Error> {
        let Some(db_name) = TEST_DB
            .get()
            .and_then(|cell| cell.try_lock().ok().and_then(|mut guard| guard.take()))
        else {
            return Ok(());
        };
        let Some(admin) = admin_url() else {
            return Ok(());
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Io)?;
        runtime.block_on(async {
            let admin_pool = connect(&base_url(&admin)).await?;
            sqlx::query(&format!("DROP DATABASE IF EXISTS {}", db_name))
                .execute(&admin_pool)
                .await?;
            admin_pool.close().await;
            Ok(())
        })
    }
}

/// Unique value for columns with a unique index, so parallel tests don't clash.
pub fn unique(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &id[..10])
}
