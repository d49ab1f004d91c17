mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{body_json, location, spawn_app};

#[tokio::test]
async fn test_protected_routes_redirect_to_login() {
    let app = spawn_app().await;

    for uri in ["/work", "/artist", "/works/create", "/artists/create", "/metrics"] {
        let response = app
            .send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login", "{uri}");
    }
}

#[tokio::test]
async fn test_unauthenticated_writes_change_nothing() {
    let app = spawn_app().await;
    let artist_id = app.create_artist("Hokusai").await;

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/artists")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=Hiroshige"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = app
        .send(
            Request::builder()
                .method("DELETE")
                .uri(format!("/artists/{artist_id}"))
                .header("X-Api-Key", "wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let artists = app.state.store.list_all_artists().await.unwrap();
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].name, "Hokusai");
}

#[tokio::test]
async fn test_bearer_token_is_accepted() {
    let app = spawn_app().await;

    let response = app
        .send(
            Request::builder()
                .uri("/artist")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", common::DEFAULT_API_KEY),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_session_login_flow() {
    let app = spawn_app().await;

    let cookie = app.login().await;

    let response = app
        .send(
            Request::builder()
                .uri("/work")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = app
        .send(
            Request::builder()
                .uri("/work")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = spawn_app().await;

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=admin&password=nope"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(
        body["errors"]["username"][0],
        "These credentials do not match our records."
    );
}

#[tokio::test]
async fn test_public_pages() {
    let app = spawn_app().await;

    let response = app
        .send(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["component"], "Welcome");
    assert_eq!(body["props"]["paginatedWorks"]["meta"]["total"], 0);

    let response = app
        .send(Request::builder().uri("/login").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["component"], "auth/Login");
}
