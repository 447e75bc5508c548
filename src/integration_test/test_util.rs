use crate::api::auth::StaticCredentials;
use crate::{SharedData, app_env, persistence};
use axum::Router;
use dotenv::dotenv;
use rand::{Rng, thread_rng};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, PgPool};
use std::env;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use tokio::runtime::Runtime;

static TOKIO_RT: LazyLock<Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize")
});

/// Credentials the test router accepts
pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "integration";

/// Creates a throwaway database for a test, applies the crate's migrations to it, and
/// hands the connected pool to the test body.
///
/// Expects that the TEST_DB_URL environment variable holds a base postgres connection
/// string without a database name in the path
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(PgPool) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    TOKIO_RT.block_on(async move {
        let base_url = env::var(app_env::test::TEST_DB_URL).expect(
            "You must provide the TEST_DB_URL environment variable as the base postgres connection string",
        );

        let db_name = {
            let mut rng = thread_rng();
            format!("test_db_{}", rng.gen_range(10_000u32..99_999))
        };

        let mut admin_cxn = PgConnection::connect(format!("{base_url}/postgres").as_str())
            .await
            .expect("could not connect to postgres to provision the test database");
        sqlx::query(format!("CREATE DATABASE {db_name}").as_str())
            .execute(&mut admin_cxn)
            .await
            .expect("could not create the test database");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(format!("{base_url}/{db_name}").as_str())
            .await
            .expect("could not connect to the test database");
        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("could not apply migrations to the test database");

        test_fn(pool).await;
    });
}

/// Builds the full application router around the given database pool, guarded by
/// [TEST_USERNAME]/[TEST_PASSWORD]
pub fn app_router(pool: PgPool) -> Router {
    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(pool),
        authenticator: Arc::new(StaticCredentials::new(
            TEST_USERNAME.to_owned(),
            TEST_PASSWORD.to_owned(),
        )),
    });

    crate::build_router(shared_data)
}
