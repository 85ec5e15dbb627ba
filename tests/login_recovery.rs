// HTTP tests for /auth/login-recovery and /auth/login

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{TestContext, PASSWORD};
use crm_places::services::AuthService;
use serde_json::{json, Value};

#[actix_web::test]
async fn test_it_shows_the_recovery_form() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;

    let req = test::TestRequest::get()
        .uri("/auth/login-recovery")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["form"], "recovery_login");
    assert_eq!(body["fields"], json!(["email", "password", "recovery"]));
}

#[actix_web::test]
async fn test_a_recovery_code_works_exactly_once() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let user = ctx.create_user("lost-phone@example.com").await;
    let (_, codes) = AuthService::enable_two_factor(ctx.users.as_ref(), user.id)
        .await
        .unwrap();

    let payload = json!({
        "email": "lost-phone@example.com",
        "password": PASSWORD,
        "recovery": codes[0].to_uppercase()
    });

    let req = test::TestRequest::post()
        .uri("/auth/login-recovery")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let login: Value = test::read_body_json(resp).await;
    assert_eq!(login["two_factor_required"], false);
    assert_eq!(login["user"]["id"], user.id);

    // The recovered session passes the 2fa gate
    let req = test::TestRequest::get()
        .uri("/settings/emailchange2")
        .insert_header((
            "Authorization",
            format!("Bearer {}", login["token"].as_str().unwrap()),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/auth/login-recovery")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Other codes are still usable
    let req = test::TestRequest::post()
        .uri("/auth/login-recovery")
        .set_json(json!({
            "email": "lost-phone@example.com",
            "password": PASSWORD,
            "recovery": codes[1]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_recovery_needs_the_right_password() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let user = ctx.create_user("lost-phone@example.com").await;
    let (_, codes) = AuthService::enable_two_factor(ctx.users.as_ref(), user.id)
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/auth/login-recovery")
        .set_json(json!({
            "email": "lost-phone@example.com",
            "password": "not the password",
            "recovery": codes[0]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The code was not burnt by the failed attempt
    let req = test::TestRequest::post()
        .uri("/auth/login-recovery")
        .set_json(json!({
            "email": "lost-phone@example.com",
            "password": PASSWORD,
            "recovery": codes[0]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_regular_login_returns_a_usable_token() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    let user = ctx.create_user("api@example.com").await;
    ctx.create_places(user.account_id, 2).await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "API@example.com", "password": PASSWORD }))
        .to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    assert!(login["redirect"].is_null());

    let req = test::TestRequest::get()
        .uri("/api/places")
        .insert_header((
            "Authorization",
            format!("Bearer {}", login["token"].as_str().unwrap()),
        ))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 2);
}

#[actix_web::test]
async fn test_malformed_login_body_is_invalid_input() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}
