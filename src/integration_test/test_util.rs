use crate::app_env;
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{thread_rng, Rng};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, PgPool};
use std::{env, future::Future};
use tokio::runtime::Runtime;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

struct TestDatabase {
    base_url: String,
    template_db_name: String,
}

impl TestDatabase {
    async fn create(base_url: &str) -> Result<Self, sqlx::Error> {
        let mut rng = thread_rng();
        let schema_id: u32 = rng.gen_range(10_000..99_999);
        let template_db_name = format!("test_db_{}", schema_id);
        let mut conn = PgConnection::connect(base_url).await?;

        sqlx::query("ALTER DATABASE postgres WITH is_template TRUE")
            .execute(&mut conn)
            .await?;
        sqlx::query(format!("CREATE DATABASE {} TEMPLATE postgres", template_db_name).as_str())
            .execute(&mut conn)
            .await?;

        Ok(Self {
            base_url: String::from(base_url),
            template_db_name,
        })
    }

    fn template_db_name(&self) -> &str {
        self.template_db_name.as_str()
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        let db_to_drop = self.template_db_name.clone();
        let conn_str = self.base_url.clone();

        TOKIO_RT.block_on(async move {
            let conn = PgConnection::connect(conn_str.as_str()).await;
            let mut conn = match conn {
                Ok(cxn) => cxn,
                Err(conn_err) => {
                    println!("Failed to reconnect to database to drop test database {}, please remove it manually. Error: {}", db_to_drop, conn_err);
                    return;
                }
            };

            let drop_result = sqlx::query(format!("DROP DATABASE {}", db_to_drop).as_str())
                .execute(&mut conn)
                .await;
            if let Err(db_err) = drop_result {
                println!(
                    "Failed to drop test database {}, please remove it manually. Error: {}",
                    db_to_drop, db_err
                );
            }
        });
    }
}

/// Creates a temp database for a test by using the "postgres" default database's content as a
/// template when creating a new database.
///
/// Expects that the TEST_DB_URL environment variable is populated
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(PgPool) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    TOKIO_RT.block_on(async move {
        let pg_connection_base_url = env::var(app_env::test::TEST_DB_URL)
            .expect("You must provide the TEST_DB_URL environment variable as the base postgres connection string");
        let test_db = TestDatabase::create(&pg_connection_base_url).await;
        let test_db = match test_db {
            Ok(tdb) => tdb,
            Err(db_err) => panic!("Failed to start test database: {}", db_err),
        };

        let sqlx_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(format!("{}/{}", pg_connection_base_url, test_db.template_db_name()).as_str())
            .await
            .expect("Could not connect to the test database");
        test_fn(sqlx_pool).await;
    });
}
