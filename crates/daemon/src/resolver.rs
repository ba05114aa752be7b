use common::{ApiResponse, MarathonApi, Resolution};

/// Fetches the running instances of `app_id`.
///
/// Never fails: an error status, a transport error or an undecodable body all
/// degrade to an empty resolution and a warning.
pub async fn resolve(api: &dyn MarathonApi, service: &str, app_id: &str) -> Resolution {
    match api.endpoints(app_id).await {
        Ok(ApiResponse::Success(body)) => body.instances,
        Ok(ApiResponse::Failure { status, message }) => {
            tracing::warn!(service, app_id, status, message = %message, "failed to list apps from Marathon");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(service, app_id, error = %e, "error while listing apps from Marathon");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{instance, FakeApi, Reply};

    #[tokio::test]
    async fn returns_instances_on_success() {
        let api = FakeApi::new(vec![Reply::Instances(vec![instance("web.1", "10.0.0.5", &[8080])])]);
        let resolution = resolve(api.as_ref(), "web", "/web").await;
        assert_eq!(resolution, vec![instance("web.1", "10.0.0.5", &[8080])]);
    }

    #[tokio::test]
    async fn failures_resolve_to_nothing() {
        let api = FakeApi::new(vec![Reply::Status(500), Reply::Status(404), Reply::Broken]);
        for _ in 0..3 {
            assert!(resolve(api.as_ref(), "web", "/web").await.is_empty());
        }
        assert_eq!(api.calls(), 3);
    }
}
