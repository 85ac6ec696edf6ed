mod helpers;

use axum::http::StatusCode;
use helpers::setup_test_app;

#[tokio::test]
async fn test_liveness() {
    let app = setup_test_app();

    let response = app.client().get("/health/live").await;
    response.assert_status(StatusCode::OK);
    response.assert_text("OK");
}
