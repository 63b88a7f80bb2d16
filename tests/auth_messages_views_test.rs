// Route tests for sign up, log in/out, the home timeline and message pages.
// Run with: cargo test --test auth_messages_views_test

mod common;

use actix_web::{http::StatusCode, test};
use common::{body_text, create_test_app, location, post_message, session_for, setup_db, signup};
use sea_orm::{EntityTrait, PaginatorTrait};
use warbler::auth::CURR_USER_KEY;
use warbler::entities::{message, user};
use warbler::services::users;

#[actix_web::test]
async fn test_signup_logs_user_in() {
    let db = setup_db().await;
    let app = test::init_service(create_test_app(db.clone())).await;

    let req = test::TestRequest::post()
        .uri("/signup")
        .set_form([
            ("username", "newbie"),
            ("email", "newbie@test.com"),
            ("password", "secret1"),
            ("image_url", ""),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let session = resp
        .response()
        .cookies()
        .find(|c| c.name() == CURR_USER_KEY)
        .expect("signup should set the session cookie")
        .into_owned();

    let created = users::authenticate(&db, "newbie", "secret1").await.unwrap();
    let created = created.expect("new user should be able to log in");
    assert_eq!(created.image_url, user::DEFAULT_IMAGE_URL);

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(session)
        .to_request();
    let html = body_text(test::call_service(&app, req).await).await;
    assert!(html.contains("@newbie"));
}

#[actix_web::test]
async fn test_signup_duplicate_username() {
    let db = setup_db().await;
    signup(&db, "user1", "password1").await;
    let app = test::init_service(create_test_app(db.clone())).await;

    let req = test::TestRequest::post()
        .uri("/signup")
        .set_form([
            ("username", "user1"),
            ("email", "other@test.com"),
            ("password", "password"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(body_text(resp).await.contains("Username or email already taken"));
    assert_eq!(user::Entity::find().count(&db).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_signup_without_password() {
    let db = setup_db().await;
    let app = test::init_service(create_test_app(db.clone())).await;

    let req = test::TestRequest::post()
        .uri("/signup")
        .set_form([("username", "user4"), ("email", "user4@test.com")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(user::Entity::find().count(&db).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_login() {
    let db = setup_db().await;
    signup(&db, "user1", "password1").await;
    let app = test::init_service(create_test_app(db.clone())).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "user1"), ("password", "password1")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(resp
        .response()
        .cookies()
        .any(|c| c.name() == CURR_USER_KEY && !c.value().is_empty()));
}

#[actix_web::test]
async fn test_login_wrong_password() {
    let db = setup_db().await;
    signup(&db, "user1", "password1").await;
    let app = test::init_service(create_test_app(db.clone())).await;

    for (username, password) in [("user1", "wrongpassword"), ("invaliduser", "password1")] {
        let req = test::TestRequest::post()
            .uri("/login")
            .set_form([("username", username), ("password", password)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.response().cookies().next().is_none());
        assert!(body_text(resp).await.contains("Invalid credentials."));
    }
}

#[actix_web::test]
async fn test_logout_clears_session() {
    let db = setup_db().await;
    let user1 = signup(&db, "user1", "password1").await;
    let app = test::init_service(create_test_app(db.clone())).await;

    let req = test::TestRequest::get()
        .uri("/logout")
        .cookie(session_for(user1.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == CURR_USER_KEY)
        .expect("logout should clear the session cookie");
    assert_eq!(cleared.value(), "");
}

#[actix_web::test]
async fn test_anonymous_home() {
    let db = setup_db().await;
    let app = test::init_service(create_test_app(db)).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Sign up now"));
}

#[actix_web::test]
async fn test_home_timeline() {
    let db = setup_db().await;
    let testuser = signup(&db, "testuser", "testuser").await;
    let user1 = signup(&db, "user1", "password1").await;
    let user2 = signup(&db, "user2", "password2").await;
    users::follow(&db, &testuser, user1.id).await.unwrap();
    post_message(&db, &testuser, "my own warble").await;
    post_message(&db, &user1, "hello from user1").await;
    post_message(&db, &user2, "hello from user2").await;
    let app = test::init_service(create_test_app(db.clone())).await;

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(session_for(testuser.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(resp).await;
    assert!(html.contains("my own warble"));
    assert!(html.contains("hello from user1"));
    assert!(!html.contains("hello from user2"));
}

#[actix_web::test]
async fn test_create_message() {
    let db = setup_db().await;
    let user1 = signup(&db, "user1", "password1").await;
    let app = test::init_service(create_test_app(db.clone())).await;

    let req = test::TestRequest::post()
        .uri("/messages/new")
        .cookie(session_for(user1.id))
        .set_form([("text", "Hello, Warbler!")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/users/{}", user1.id));

    let stored = message::Entity::find().all(&db).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].text, "Hello, Warbler!");
    assert_eq!(stored[0].user_id, user1.id);

    let too_long = "x".repeat(message::MAX_TEXT_LEN + 1);
    let req = test::TestRequest::post()
        .uri("/messages/new")
        .cookie(session_for(user1.id))
        .set_form([("text", too_long.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message::Entity::find().count(&db).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_create_message_requires_login() {
    let db = setup_db().await;
    let app = test::init_service(create_test_app(db.clone())).await;

    let req = test::TestRequest::post()
        .uri("/messages/new")
        .set_form([("text", "anonymous")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert_eq!(message::Entity::find().count(&db).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_show_and_delete_message() {
    let db = setup_db().await;
    let user1 = signup(&db, "user1", "password1").await;
    let user2 = signup(&db, "user2", "password2").await;
    let msg = post_message(&db, &user1, "short lived").await;
    let app = test::init_service(create_test_app(db.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/messages/{}", msg.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("short lived"));
    assert!(html.contains("@user1"));

    // Someone else cannot delete it.
    let req = test::TestRequest::post()
        .uri(&format!("/messages/{}/delete", msg.id))
        .cookie(session_for(user2.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&format!("/messages/{}/delete", msg.id))
        .cookie(session_for(user1.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(message::Entity::find().count(&db).await.unwrap(), 0);

    let req = test::TestRequest::get()
        .uri(&format!("/messages/{}", msg.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_unknown_route() {
    let db = setup_db().await;
    let app = test::init_service(create_test_app(db)).await;

    let req = test::TestRequest::get().uri("/no/such/page").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("404"));
}

#[actix_web::test]
async fn test_openapi_document() {
    let db = setup_db().await;
    let app = test::init_service(create_test_app(db)).await;

    let req = test::TestRequest::get()
        .uri("/api-docs/openapi.json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let doc: serde_json::Value = test::read_body_json(resp).await;
    let paths = doc["paths"].as_object().expect("paths should be an object");
    assert!(paths.contains_key("/users/follow/{user_id}"));
    assert!(paths.contains_key("/users/add_like/{message_id}"));
    assert!(paths.contains_key("/users/delete"));
}

#[actix_web::test]
async fn test_static_assets_are_served() {
    let db = setup_db().await;
    let app = test::init_service(create_test_app(db)).await;

    for path in [
        "/static/stylesheets/style.css",
        user::DEFAULT_IMAGE_URL,
        user::DEFAULT_HEADER_IMAGE_URL,
    ] {
        let req = test::TestRequest::get().uri(path).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[actix_web::test]
async fn test_session_lookup_failure_renders_anonymous_home() {
    let db = setup_db().await;
    let user1 = signup(&db, "user1", "password1").await;
    let app = test::init_service(create_test_app(db.clone())).await;

    // Every later query fails.
    db.close().await.unwrap();

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(session_for(user1.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Sign up now"));
}
