// HTTP test for /health

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::TestContext;
use serde_json::Value;

#[actix_web::test]
async fn test_health_needs_no_session() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "crm-places");
    assert_eq!(body["environment"], "development");
}
