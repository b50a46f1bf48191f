//! End-to-end walk through the main user journey: register, build a profile,
//! upload media, get deleted by a manager.

mod common;

use axum::http::{StatusCode, header};
use common::*;

#[tokio::test]
async fn register_profile_avatar_and_cascade_delete_flow() {
    let (state, app) = spawn_app().await;

    // Register establishes a session with no profile row.
    let (cookie, alice_id) = register(&app, "Alice", "alice@example.com", "pw1").await;
    assert!(state.store.get_profile(alice_id).await.unwrap().is_none());

    // Profile view redirects to creation while no row exists.
    let response = get(&app, "/profile", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/profile/add"
    );

    // Performer submission without a genre is rejected and writes nothing.
    let response = post_multipart(
        &app,
        "/profile/add",
        Some(&cookie),
        &[("is_performer", "Y"), ("location", "NYC")],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.store.get_profile(alice_id).await.unwrap().is_none());

    // Valid submission creates the row and redirects to the profile.
    let response = post_multipart(
        &app,
        "/profile/add",
        Some(&cookie),
        &[
            ("is_performer", "Y"),
            ("genre", "jazz"),
            ("location", "NYC"),
        ],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/profile");

    // First view resolves and persists the deterministic default avatar.
    let response = get(&app, "/profile", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let image_url = body["data"]["profile"]["image_url"].as_str().unwrap();
    assert!(
        image_url.starts_with("/uploads/default-avatars/"),
        "expected a default avatar, got {image_url}"
    );

    let stored = state
        .store
        .get_profile(alice_id)
        .await
        .unwrap()
        .unwrap()
        .image_path
        .expect("avatar path should be materialized on first view");
    assert_eq!(format!("/uploads/{stored}"), image_url);

    // Viewing again resolves to the very same avatar.
    let response = get(&app, "/profile", Some(&cookie)).await;
    let body = json_body(response).await;
    assert_eq!(body["data"]["profile"]["image_url"].as_str().unwrap(), image_url);

    // Uploading a custom image takes precedence over the default.
    let response = post_multipart(
        &app,
        "/profile/edit",
        Some(&cookie),
        &[
            ("is_performer", "Y"),
            ("genre", "jazz"),
            ("location", "NYC"),
        ],
        Some(("profile_image", "me.png", "image/png", b"fake-png-bytes")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = get(&app, "/profile", Some(&cookie)).await;
    let body = json_body(response).await;
    let image_url = body["data"]["profile"]["image_url"].as_str().unwrap();
    assert!(
        image_url.starts_with("/uploads/profile-images/"),
        "expected the uploaded image, got {image_url}"
    );

    // The uploaded file exists on disk under the upload root.
    let relative = image_url.strip_prefix("/uploads/").unwrap();
    assert!(state.uploads.root().join(relative).exists());

    // She appears in the public directory and her detail page renders.
    let response = get(&app, "/directory?search=alice", None).await;
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = get(&app, &format!("/performers/{alice_id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Add a media item to exercise the cascade.
    let response = post_multipart(
        &app,
        "/profile/media",
        Some(&cookie),
        &[],
        Some(("media_file", "gig.mp4", "video/mp4", b"fake-video-bytes")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Manager deletes the account.
    let manager_cookie = login(&app, MANAGER_EMAIL, MANAGER_PASSWORD).await;
    let response = post_form(
        &app,
        &format!("/manager/users/{alice_id}/delete"),
        Some(&manager_cookie),
        &[],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Gone from the directory, every store, and her detail page.
    let response = get(&app, "/directory?search=alice", None).await;
    let body = json_body(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    assert!(state.store.get_account(alice_id).await.unwrap().is_none());
    assert!(state.store.get_profile(alice_id).await.unwrap().is_none());
    assert!(
        state
            .store
            .list_media_for_account(alice_id)
            .await
            .unwrap()
            .is_empty()
    );

    let response = get(&app, &format!("/performers/{alice_id}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The uploaded profile image was cleaned up from disk.
    assert!(!state.uploads.root().join(relative).exists());
}

#[tokio::test]
async fn availability_flow_collapses_unknown_values() {
    let (state, app) = spawn_app().await;

    let (cookie, id) = register(&app, "Bob", "bob@example.com", "pw2").await;

    // Without a profile, availability redirects to profile creation.
    let response = get(&app, "/availability", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = post_form(
        &app,
        "/availability",
        Some(&cookie),
        &[("availability", "Y")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/profile/add"
    );

    let response = post_multipart(
        &app,
        "/profile/add",
        Some(&cookie),
        &[("genre", "folk"), ("location", "Leeds")],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Defaults to not available.
    let response = get(&app, "/availability", Some(&cookie)).await;
    let body = json_body(response).await;
    assert_eq!(body["data"]["availability"], serde_json::json!("N"));

    let response = post_form(
        &app,
        "/availability",
        Some(&cookie),
        &[("availability", "Y")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        state.store.get_profile(id).await.unwrap().unwrap().availability,
        "Y"
    );

    // Garbage input collapses to "N" rather than being stored verbatim.
    let response = post_form(
        &app,
        "/availability",
        Some(&cookie),
        &[("availability", "whenever")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        state.store.get_profile(id).await.unwrap().unwrap().availability,
        "N"
    );
}
