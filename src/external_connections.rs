use reqwest_middleware::ClientWithMiddleware;
use sqlx::PgConnection;

/// A live handle to the database which can lend out its connection for queries
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Access point for clients communicating with external systems. Driven adapters borrow
/// the database and outbound HTTP clients through this trait so business logic stays
/// agnostic of the concrete clients behind it.
pub trait ExternalConnectivity: Sync {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    /// Acquires a database connection scoped to the borrow of the returned handle
    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;

    /// Borrows the shared outbound HTTP client
    fn http_client(&self) -> &ClientWithMiddleware;
}

/// Implemented by connectivity providers which can open a database transaction
pub trait Transactable {
    type Handle: ExternalConnectivity + TransactionHandle + Send;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

/// A variant of [ExternalConnectivity] with an open transaction that can be committed.
/// Dropping the handle without committing rolls the transaction back.
pub trait TransactionHandle {
    async fn commit(self) -> Result<(), anyhow::Error>;
}

#[cfg(test)]
pub mod test_util {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Stand-in connectivity for domain and API tests. The in-memory driven port fakes
    /// never touch a real database or HTTP client, so every accessor here panics if a
    /// test accidentally reaches for a real connection.
    pub struct FakeExternalConnectivity {
        is_transacting: bool,
        downstream_committed: Arc<AtomicBool>,
    }

    impl FakeExternalConnectivity {
        pub fn new() -> Self {
            FakeExternalConnectivity {
                is_transacting: false,
                downstream_committed: Arc::new(AtomicBool::new(false)),
            }
        }

        pub fn is_transacting(&self) -> bool {
            self.is_transacting
        }

        /// True if a transaction handed out by [Transactable::start_transaction] committed
        pub fn did_transaction_commit(&self) -> bool {
            self.downstream_committed.load(Ordering::SeqCst)
        }
    }

    pub struct NoDbHandle;

    impl ConnectionHandle for NoDbHandle {
        fn borrow_connection(&mut self) -> &mut PgConnection {
            panic!("Tests using FakeExternalConnectivity must not open database connections!")
        }
    }

    impl ExternalConnectivity for FakeExternalConnectivity {
        type DbHandle<'cxn_borrow> = NoDbHandle;

        async fn database_cxn(&mut self) -> Result<NoDbHandle, anyhow::Error> {
            panic!("Tests using FakeExternalConnectivity must not open database connections!")
        }

        fn http_client(&self) -> &ClientWithMiddleware {
            panic!("Tests using FakeExternalConnectivity must not make real HTTP calls!")
        }
    }

    impl Transactable for FakeExternalConnectivity {
        type Handle = FakeExternalConnectivity;

        async fn start_transaction(&self) -> Result<FakeExternalConnectivity, anyhow::Error> {
            Ok(FakeExternalConnectivity {
                is_transacting: true,
                downstream_committed: Arc::clone(&self.downstream_committed),
            })
        }
    }

    impl TransactionHandle for FakeExternalConnectivity {
        async fn commit(self) -> Result<(), anyhow::Error> {
            if !self.is_transacting {
                panic!("Tried to commit a FakeExternalConnectivity that isn't a transaction!");
            }

            self.downstream_committed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }
}
