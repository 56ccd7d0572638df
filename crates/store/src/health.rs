//! Store health checks.

use crate::client::StoreClient;
use reqwest::Method;
use tracing::{debug, error};

/// Check that the REST endpoint answers.
pub async fn check_connection(client: &StoreClient) -> bool {
    let request = match client.rest(Method::GET, "") {
        Ok(request) => request,
        Err(e) => {
            error!("Store health check failed: {}", e);
            return false;
        }
    };

    match client.send(request).await {
        Ok(_) => {
            debug!("Store connection healthy");
            true
        }
        Err(e) => {
            error!("Store health check failed: {}", e);
            false
        }
    }
}
