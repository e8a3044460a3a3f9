mod common;

use common::token_set_cookie;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

#[tokio::test]
async fn test_index_greeting() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "Hello, World!");
}

#[tokio::test]
async fn test_sign_up_success() {
    let app = TestApp::spawn().await;

    let response = app.sign_up("a@b.com", "longenough").await;

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "User created successfully.");
}

#[tokio::test]
async fn test_sign_up_does_not_sign_in() {
    let app = TestApp::spawn().await;

    let response = app.sign_up("a@b.com", "longenough").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(token_set_cookie(response.headers()).is_none());
}

#[tokio::test]
async fn test_sign_up_duplicate_email() {
    let app = TestApp::spawn().await;

    app.sign_up("a@b.com", "longenough").await;
    let response = app.sign_up("a@b.com", "anotherpassword").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_email_case_does_not_split_accounts() {
    let app = TestApp::spawn().await;

    let response = app.sign_up("Ada@Example.com", "longenough").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.sign_up("ada@example.com", "anotherpassword").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.sign_in("ADA@EXAMPLE.COM", "longenough").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sign_up_invalid_input() {
    let app = TestApp::spawn().await;

    let cases = [
        json!({"last_name": "B", "email": "a@b.com", "password": "longenough"}),
        json!({"first_name": "A", "email": "a@b.com", "password": "longenough"}),
        json!({"first_name": "A", "last_name": "B", "email": "not-an-email", "password": "longenough"}),
        json!({"first_name": "A", "last_name": "B", "email": "a@b.com", "password": "short"}),
        json!({"first_name": "A", "last_name": "B", "email": "a@b.com"}),
    ];

    for case in cases {
        let response = app
            .post("/signup")
            .json(&case)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", case);

        let body: Value = response.json().await.expect("Failed to parse response");
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn test_sign_up_accepts_camel_case_names() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/signup")
        .json(&json!({
            "firstName": "A",
            "lastName": "B",
            "email": "a@b.com",
            "password": "longenough"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sign_up_malformed_json() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/signup")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_sign_in_success() {
    let app = TestApp::spawn().await;

    app.sign_up("a@b.com", "longenough").await;
    let response = app.sign_in("a@b.com", "longenough").await;

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = token_set_cookie(response.headers()).expect("Missing token cookie");

    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());

    assert!(set_cookie.starts_with(&format!("token={}", token)));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=259200"));
    assert!(set_cookie.contains("Expires="));

    let claims = app.claims(token);
    assert_eq!(claims.name, "A B");
    assert_eq!(claims.exp - claims.iat, 72 * 60 * 60);
}

#[tokio::test]
async fn test_sign_in_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;

    app.sign_up("a@b.com", "longenough").await;

    let wrong_password = app.sign_in("a@b.com", "wrongpassword").await;
    let unknown_email = app.sign_in("nobody@b.com", "longenough").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert!(token_set_cookie(wrong_password.headers()).is_none());

    let wrong_password: Value = wrong_password.json().await.unwrap();
    let unknown_email: Value = unknown_email.json().await.unwrap();
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["message"], "Incorrect email or password.");
}

#[tokio::test]
async fn test_sign_in_invalid_input() {
    let app = TestApp::spawn().await;

    let bad_email = app.sign_in("not-an-email", "longenough").await;
    let missing_password = app.sign_in("a@b.com", "").await;

    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);
    assert_eq!(missing_password.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_users_with_token() {
    let app = TestApp::spawn().await;

    let token = app.registered_token("a@b.com", "longenough").await;
    let subject = app.claims(&token).sub;

    let response = app
        .get_with_token("/users", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], subject.as_str());
    assert_eq!(users[0]["email"], "a@b.com");
    assert_eq!(users[0]["first_name"], "A");
    assert!(users[0].get("password_hash").is_none());
}

#[tokio::test]
async fn test_list_users_without_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/users")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Unauthorized.");
}

#[tokio::test]
async fn test_list_users_rejected_tokens_look_identical() {
    let app = TestApp::spawn().await;

    let token = app.registered_token("a@b.com", "longenough").await;
    let subject = app.claims(&token).sub;

    let expired = app.expired_token(&subject);
    let tampered = format!("{}x", token);

    let mut bodies = Vec::new();
    for candidate in [expired.as_str(), tampered.as_str(), "invalid", ""] {
        let response = app
            .get_with_token("/users", candidate)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        bodies.push(response.json::<Value>().await.unwrap());
    }

    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_list_users_after_user_deleted() {
    let app = TestApp::spawn().await;

    let token = app.registered_token("a@b.com", "longenough").await;
    let subject = app.claims(&token).sub;

    app.delete_user(&subject).await;

    let response = app
        .get_with_token("/users", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_full_user_workflow() {
    let app = TestApp::spawn().await;

    // 1. Register
    let response = app.sign_up("a@b.com", "longenough").await;
    assert_eq!(response.status(), StatusCode::OK);

    // 2. Register again with the same email
    let response = app.sign_up("a@b.com", "longenough").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 3. Sign in
    let response = app.sign_in("a@b.com", "longenough").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().unwrap().to_string();

    // 4. Access the protected listing with the cookie
    let response = app
        .get_with_token("/users", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["users"]
        .as_array()
        .unwrap()
        .iter()
        .any(|user| user["email"] == "a@b.com"));

    // 5. No cookie
    let response = app
        .get("/users")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 6. Expired token
    let expired = app.expired_token(&app.claims(&token).sub);
    let response = app
        .get_with_token("/users", &expired)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
