use sqlx::PgConnection;

/// A borrowed handle to an active database connection
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Owns the clients used to communicate with systems outside the application.
/// Business logic depends on this abstraction rather than concrete clients so
/// driven adapters can be swapped for in-memory fakes in tests.
pub trait ExternalConnectivity: Sync {
    type Handle<'cxn_borrow>: ConnectionHandle
    where
        Self: 'cxn_borrow;

    /// Acquires a database connection from the underlying source
    async fn database_cxn(&mut self) -> Result<Self::Handle<'_>, anyhow::Error>;
}
