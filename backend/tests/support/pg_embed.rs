//! Shared embedded PostgreSQL cluster for integration tests.
//!
//! `pg-embed-setup-unpriv` keeps one cluster alive for the whole test binary.
//! Bootstrap downloads can fail transiently, so acquisition is retried.

use std::time::Duration;

use pg_embedded_setup_unpriv::ClusterHandle;

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Returns the process-wide cluster, bootstrapping it on first use.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    ensure_stable_password();
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(_) if attempt < SHARED_CLUSTER_RETRIES => {
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(error) => return Err(format!("{error:?}")),
        }
    }
}

/// Pins `PG_PASSWORD` so a reused data directory keeps accepting the
/// password it was initialised with.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the library spawns any threads; the shared
        // cluster singleton serialises bootstrap.
        unsafe {
            std::env::set_var("PG_PASSWORD", "orders_embedded_test");
        }
    }
}
