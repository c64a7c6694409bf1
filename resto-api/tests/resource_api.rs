mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn test_visits_update_restaurant_rating() {
    let app = TestApp::spawn().await;
    let (user, cookie) = app.sign_in("Critic").await;
    let cookie = Some(cookie.as_str());
    let restaurant = app.restaurant("Eleven Madison", "").await;

    let body = json!({"restaurant": restaurant.id, "rating": 4, "visited_at": "2024-05-01T20:00:00Z"});
    let response = app
        .request(Method::POST, "/visits", Some(&body.to_string()), cookie)
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let visit = response.json();
    assert_eq!(visit["user"], json!(user.id));
    assert_eq!(visit["rating"], 4);

    let body = json!({"restaurant": restaurant.id, "rating": 2});
    app.request(Method::POST, "/visits", Some(&body.to_string()), cookie)
        .await;

    let detail = app.get(&format!("/restaurants/{}", restaurant.id)).await.json();
    assert_eq!(detail["rating"], json!(3.0));

    let uri = format!("/visits/{}", visit["id"]);
    let response = app
        .request(Method::PATCH, &uri, Some(r#"{"rating": null}"#), cookie)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["rating"], Value::Null);

    let detail = app.get(&format!("/restaurants/{}", restaurant.id)).await.json();
    assert_eq!(detail["rating"], json!(2.0));

    let response = app.request(Method::DELETE, &uri, None, cookie).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&uri).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/visits").await.json().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_deleting_a_user_drops_their_ratings() {
    let app = TestApp::spawn().await;
    let (_, alice_cookie) = app.sign_in("Alice").await;
    let (bob, bob_cookie) = app.sign_in("Bob").await;
    let restaurant = app.restaurant("Chez Panisse", "").await;

    for (cookie, rating) in [(&alice_cookie, 5), (&bob_cookie, 1)] {
        let body = json!({"restaurant": restaurant.id, "rating": rating});
        let response = app
            .request(Method::POST, "/visits", Some(&body.to_string()), Some(cookie.as_str()))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }
    let detail = app.get(&format!("/restaurants/{}", restaurant.id)).await.json();
    assert_eq!(detail["rating"], json!(3.0));

    let response = app
        .request(
            Method::DELETE,
            &format!("/users/{}", bob.id),
            None,
            Some(bob_cookie.as_str()),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    assert_eq!(app.get("/visits").await.json().as_array().unwrap().len(), 1);
    let detail = app.get(&format!("/restaurants/{}", restaurant.id)).await.json();
    assert_eq!(detail["rating"], json!(5.0));
}

#[tokio::test]
async fn test_visit_must_reference_active_restaurant() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.sign_in("Critic").await;
    let cookie = Some(cookie.as_str());

    let response = app
        .request(Method::POST, "/visits", Some(r#"{"restaurant": 77, "rating": 9}"#), cookie)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"rating": ["Ensure this value is less than or equal to 5."]})
    );

    let response = app
        .request(Method::POST, "/visits", Some(r#"{"restaurant": 77}"#), cookie)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"restaurant": ["Invalid pk \"77\" - object does not exist."]})
    );

    let response = app
        .request(Method::POST, "/visits", Some(r#"{"restaurant": 1}"#), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_comments_follow_restaurant_visibility() {
    let app = TestApp::spawn().await;
    let (user, cookie) = app.sign_in("Foodie").await;
    let cookie = Some(cookie.as_str());
    let restaurant = app.restaurant("Pop-up", "").await;

    let body = json!({"restaurant": restaurant.id, "text": "  Great bao  "});
    let response = app
        .request(Method::POST, "/comments", Some(&body.to_string()), cookie)
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let comment = response.json();
    assert_eq!(comment["text"], "Great bao");
    assert_eq!(comment["user"], json!(user.id));

    let uri = format!("/comments/{}", comment["id"]);
    let response = app
        .request(Method::PUT, &uri, Some(r#"{"text": "Great bao"}"#), cookie)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json(), json!({"restaurant": ["This field is required."]}));

    app.request(
        Method::DELETE,
        &format!("/restaurants/{}", restaurant.id),
        None,
        cookie,
    )
    .await;
    assert_eq!(app.get(&uri).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/comments").await.json(), json!([]));
}

#[tokio::test]
async fn test_users_me_and_self_only_edits() {
    let app = TestApp::spawn().await;
    let (alice, alice_cookie) = app.sign_in("Alice").await;
    let (bob, _) = app.sign_in("Bob").await;
    let alice_cookie = Some(alice_cookie.as_str());

    let response = app.get("/users/me").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request(Method::GET, "/users/me", None, alice_cookie)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let me = response.json();
    assert_eq!(me["email"], "alice@example.com");
    assert!(me.get("google_id").is_none());

    let response = app
        .request(
            Method::PATCH,
            &format!("/users/{}", bob.id),
            Some(r#"{"name": "Robert"}"#),
            alice_cookie,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::PATCH,
            &format!("/users/{}", alice.id),
            Some(r#"{"email": "BOB@example.com"}"#),
            alice_cookie,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"email": ["user with this email address already exists."]})
    );

    let response = app
        .request(
            Method::PATCH,
            &format!("/users/{}", alice.id),
            Some(r#"{"name": "Alice Waters", "email": "alice@example.com"}"#),
            alice_cookie,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["name"], "Alice Waters");

    let response = app.get("/users/not-a-uuid").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(Method::DELETE, &format!("/users/{}", alice.id), None, alice_cookie)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    // Session outlives the account but no longer authenticates.
    let response = app
        .request(Method::GET, "/users/me", None, alice_cookie)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_user_requires_authentication() {
    let app = TestApp::spawn().await;
    let body = r#"{"email": "new@example.com", "name": "New"}"#;

    let response = app.request(Method::POST, "/users", Some(body), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let (_, cookie) = app.sign_in("Admin").await;
    let response = app
        .request(Method::POST, "/users", Some(body), Some(cookie.as_str()))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let users = app.get("/users").await.json();
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_logout_ends_session_and_google_routes_are_disabled() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.sign_in("Leaving").await;
    let cookie = Some(cookie.as_str());

    let response = app.request(Method::POST, "/auth/logout", None, cookie).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.request(Method::GET, "/users/me", None, cookie).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.get("/auth/google/login").await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.get("/auth/google/callback?code=x&state=y").await.status,
        StatusCode::NOT_FOUND
    );
}
