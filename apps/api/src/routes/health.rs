/// GET /
/// Plain-text liveness check.
pub async fn health_handler() -> &'static str {
    "ResumeService API running"
}
