mod common;

use axum::http::{StatusCode, header};
use common::{body_json, file, image_bytes, location, spawn_app, text};
use image::ImageFormat;

#[tokio::test]
async fn test_artist_crud() {
    let app = spawn_app().await;

    let response = app
        .form(
            "POST",
            "/artists",
            "name=%20Katsushika%20Hokusai%20&bio=Ukiyo-e+painter&birth_date=1760-10-31&death_date=1849-05-10",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/artist");

    let body = app.get_json("/artist").await;
    assert_eq!(body["component"], "artist/Index");

    let artist = &body["props"]["paginatedArtists"]["data"][0];
    assert_eq!(artist["name"], "Katsushika Hokusai");
    assert_eq!(artist["birthDate"], "1760-10-31");
    assert_eq!(artist["deathDate"], "1849-05-10");
    let id = artist["id"].as_i64().unwrap();

    let body = app.get_json(&format!("/artists/{id}/edit")).await;
    assert_eq!(body["component"], "artist/Form");
    assert_eq!(body["props"]["artist"]["bio"], "Ukiyo-e painter");

    let response = app
        .form("PATCH", &format!("/artists/{id}"), "name=Hokusai&bio=")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = app.get_json(&format!("/artists/{id}/edit")).await;
    assert_eq!(body["props"]["artist"]["name"], "Hokusai");
    assert!(body["props"]["artist"].get("bio").is_none());
    assert!(body["props"]["artist"].get("birthDate").is_none());

    let response = app.delete(&format!("/artists/{id}")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/artist");

    let response = app.get(&format!("/artists/{id}/edit")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_flash_message_follows_redirect() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app
        .send(
            axum::http::Request::builder()
                .method("POST")
                .uri("/artists")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(axum::body::Body::from("name=Hiroshige"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let index = || {
        axum::http::Request::builder()
            .uri("/artist")
            .header(header::COOKIE, &cookie)
            .body(axum::body::Body::empty())
            .unwrap()
    };

    let body = body_json(app.send(index()).await).await;
    assert_eq!(body["flash"]["success"], "Artist created successfully.");

    let body = body_json(app.send(index()).await).await;
    assert!(body.get("flash").is_none());
}

#[tokio::test]
async fn test_artist_validation_errors() {
    let app = spawn_app().await;

    let response = app.form("POST", "/artists", "name=%20%20&bio=x").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["message"], "The given data was invalid.");
    assert_eq!(body["errors"]["name"][0], "The name field is required.");

    let long_name = "a".repeat(256);
    let response = app
        .form("POST", "/artists", &format!("name={long_name}"))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(
        body["errors"]["name"][0],
        "The name field must not be greater than 255 characters."
    );

    let response = app
        .form(
            "POST",
            "/artists",
            "name=Monet&birth_date=1840-11-14&death_date=1840-11-14",
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["errors"]["death_date"].is_array());
    assert!(body["errors"].get("birth_date").is_none());

    let response = app
        .form("POST", "/artists", "name=Monet&birth_date=not-a-date")
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(
        body["errors"]["birth_date"][0],
        "The birth date field must be a valid date."
    );

    assert!(app.state.store.list_all_artists().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_artist_accepts_json_body() {
    let app = spawn_app().await;

    let response = app
        .send(
            axum::http::Request::builder()
                .method("POST")
                .uri("/artists")
                .header("X-Api-Key", common::DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(axum::body::Body::from(
                    r#"{"name":"Mary Cassatt","birth_date":"1844-05-22","death_date":null}"#,
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let artists = app.state.store.list_all_artists().await.unwrap();
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].name, "Mary Cassatt");
    assert!(artists[0].death_date.is_none());
}

#[tokio::test]
async fn test_unknown_or_malformed_artist_id_is_not_found() {
    let app = spawn_app().await;

    assert_eq!(app.get("/artists/999/edit").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/artists/abc/edit").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.form("PATCH", "/artists/999", "name=Nobody").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.delete("/artists/999").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_artist_pagination() {
    let app = spawn_app().await;

    for i in 1..=35 {
        let response = app
            .form("POST", "/artists", &format!("name=Artist+{i:02}"))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    let body = app.get_json("/artist").await;
    let page = &body["props"]["paginatedArtists"];
    assert_eq!(page["data"].as_array().unwrap().len(), 30);
    assert_eq!(page["meta"]["currentPage"], 1);
    assert_eq!(page["meta"]["lastPage"], 2);
    assert_eq!(page["meta"]["total"], 35);
    assert_eq!(page["links"]["next"], "/artist?page=2");
    assert!(page["links"].get("prev").is_none());

    let body = app.get_json("/artist?page=2").await;
    let page = &body["props"]["paginatedArtists"];
    assert_eq!(page["data"].as_array().unwrap().len(), 5);
    assert_eq!(page["data"][0]["name"], "Artist 31");
    assert_eq!(page["meta"]["from"], 31);
    assert_eq!(page["meta"]["to"], 35);

    let body = app.get_json("/artist?page=9").await;
    assert!(body["props"]["paginatedArtists"]["data"].as_array().unwrap().is_empty());

    let body = app.get_json("/artist?page=bogus").await;
    assert_eq!(body["props"]["paginatedArtists"]["meta"]["currentPage"], 1);
}

#[tokio::test]
async fn test_deleting_artist_cascades_to_works_and_images() {
    let app = spawn_app().await;
    let artist_id = app.create_artist("Cascade").await;
    let other_id = app.create_artist("Survivor").await;

    for (title, owner) in [("First", artist_id), ("Second", artist_id), ("Kept", other_id)] {
        let response = app
            .multipart(
                "POST",
                "/works",
                &[
                    text("title", title),
                    text("artist_id", owner.to_string()),
                    file("images[]", "plate.png", image_bytes(ImageFormat::Png)),
                ],
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    let works = app.get_json("/work").await["props"]["paginatedWorks"]["data"].clone();
    let doomed: Vec<_> = works
        .as_array()
        .unwrap()
        .iter()
        .filter(|w| w["artist"]["id"] == artist_id)
        .map(|w| w["images"][0]["url"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(doomed.len(), 2);

    let response = app.delete(&format!("/artists/{artist_id}")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = app.get_json("/work").await;
    let works = body["props"]["paginatedWorks"]["data"].as_array().unwrap();
    assert_eq!(works.len(), 1);
    assert_eq!(works[0]["title"], "Kept");

    for url in doomed {
        let disk_path = url.trim_start_matches("/storage/");
        assert!(!app.state.storage.exists(disk_path).await, "{disk_path}");
    }
    let kept = works[0]["images"][0]["url"].as_str().unwrap();
    assert!(app.state.storage.exists(kept.trim_start_matches("/storage/")).await);
}
