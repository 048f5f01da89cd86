use async_trait::async_trait;
use reqwest::{Request, Response};

/// Seam between the orchestrator and the wire. Decorators layer credentials
/// on top; tests substitute their own implementation.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
