use common::MarathonApi;

/// Liveness of the Marathon API, independent of reconciliation state.
pub async fn ping(api: &dyn MarathonApi) -> bool {
    match api.list().await {
        Ok(resp) => resp.is_success(),
        Err(e) => {
            tracing::debug!(error = %e, "marathon ping failed");
            false
        }
    }
}
