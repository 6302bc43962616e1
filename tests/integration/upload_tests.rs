//! Upload pipeline tests.
//!
//! Covers the contract of both upload routes: URL shape, staging cleanup,
//! ordering, the JSON content-type guard, the no-file rejection, and the
//! explicit all-or-nothing-without-rollback failure behavior.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use super::test_utils::{
    body_json, body_text, multipart_body, multipart_request, multipart_value_body, spawn_app,
};

// =============================================================================
// Single-file uploads
// =============================================================================

#[tokio::test]
async fn single_upload_relocates_and_reports_url() {
    let app = spawn_app().await;

    let body = multipart_body(&[("file", "a.txt", b"hello world")]);
    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/upload", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let file = body_json(response).await;
    assert_eq!(file["path"], "http://files.test/uploads/a.txt");
    assert_eq!(file["name"], "a.txt");
    assert_eq!(file["size"], 11);
    assert_eq!(file["etag"], format!("{:x}", md5::compute(b"hello world")));

    // Durable copy exists, staging copy is gone.
    assert_eq!(
        std::fs::read(app.uploads_dir().join("a.txt")).unwrap(),
        b"hello world"
    );
    assert_eq!(app.staging_file_count(), 0);
}

#[tokio::test]
async fn uploaded_file_is_fetchable_at_reported_path() {
    let app = spawn_app().await;

    let body = multipart_body(&[("file", "round-trip.bin", &[0u8, 159, 146, 150])]);
    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/upload", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/uploads/round-trip.bin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "4");
    assert_eq!(
        super::test_utils::body_bytes(response).await,
        vec![0u8, 159, 146, 150]
    );
}

#[tokio::test]
async fn repeated_single_field_keeps_last_occurrence() {
    let app = spawn_app().await;

    let body = multipart_body(&[
        ("file", "first.txt", b"first".as_slice()),
        ("file", "second.txt", b"second".as_slice()),
    ]);
    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/upload", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let file = body_json(response).await;
    assert_eq!(file["name"], "second.txt");
}

#[tokio::test]
async fn same_name_upload_silently_overwrites() {
    let app = spawn_app().await;

    for contents in [b"one".as_slice(), b"two".as_slice()] {
        let body = multipart_body(&[("file", "a.txt", contents)]);
        let response = app
            .router
            .clone()
            .oneshot(multipart_request("/upload", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Last writer wins; no collision suffixing.
    assert_eq!(std::fs::read(app.uploads_dir().join("a.txt")).unwrap(), b"two");
}

#[tokio::test]
async fn traversal_in_file_name_is_confined_to_upload_dir() {
    let app = spawn_app().await;

    let body = multipart_body(&[("file", "../../evil.txt", b"boo")]);
    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/upload", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let file = body_json(response).await;
    assert_eq!(file["name"], "evil.txt");
    assert!(app.uploads_dir().join("evil.txt").is_file());
    assert!(!app.public.path().join("../evil.txt").exists());
}

// =============================================================================
// Validation failures
// =============================================================================

#[tokio::test]
async fn json_content_type_is_rejected_on_both_routes() {
    let app = spawn_app().await;

    for uri in ["/upload", "/upload-multiple"] {
        // Valid multipart-shaped payload, but declared as JSON.
        let body = multipart_body(&[("file", "a.txt", b"hello")]);
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Bad Request!");
    }
}

#[tokio::test]
async fn upload_without_file_part_is_rejected() {
    let app = spawn_app().await;

    // A value part under the expected name is not a file.
    let body = multipart_value_body("file", "just text");
    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/upload", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Bad Request!");
}

#[tokio::test]
async fn multi_upload_with_zero_files_is_rejected() {
    let app = spawn_app().await;

    let body = multipart_body(&[]);
    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/upload-multiple", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Bad Request!");
}

#[tokio::test]
async fn wrong_field_name_counts_as_no_file() {
    let app = spawn_app().await;

    let body = multipart_body(&[("attachment", "a.txt", b"hello")]);
    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/upload", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Multi-file uploads
// =============================================================================

#[tokio::test]
async fn multi_upload_preserves_submission_order() {
    let app = spawn_app().await;

    // Deliberately not in sorted order.
    let body = multipart_body(&[
        ("files", "c.txt", b"3".as_slice()),
        ("files", "a.txt", b"1".as_slice()),
        ("files", "b.txt", b"2".as_slice()),
    ]);
    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/upload-multiple", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let files = body_json(response).await;
    let names: Vec<_> = files
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["c.txt", "a.txt", "b.txt"]);
    assert_eq!(
        files[0]["path"],
        "http://files.test/uploads/c.txt"
    );

    assert_eq!(app.staging_file_count(), 0);
}

#[tokio::test]
async fn multi_upload_with_one_file_yields_one_element_array() {
    let app = spawn_app().await;

    let body = multipart_body(&[("files", "only.txt", b"only")]);
    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/upload-multiple", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let files = body_json(response).await;
    assert_eq!(files.as_array().unwrap().len(), 1);
    assert_eq!(files[0]["name"], "only.txt");
}

// =============================================================================
// Relocation failures
// =============================================================================

#[tokio::test]
async fn failed_relocation_answers_500_with_fixed_body() {
    let app = spawn_app().await;

    // A directory squatting on the destination name makes the copy fail.
    std::fs::create_dir(app.uploads_dir().join("a.txt")).unwrap();

    let body = multipart_body(&[("file", "a.txt", b"hello")]);
    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/upload", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Internal Server Error!");
}

#[tokio::test]
async fn failed_batch_answers_500_but_survivors_stay_on_disk() {
    let app = spawn_app().await;

    std::fs::create_dir(app.uploads_dir().join("clash.bin")).unwrap();

    let body = multipart_body(&[
        ("files", "ok1.txt", b"one".as_slice()),
        ("files", "clash.bin", b"boom".as_slice()),
        ("files", "ok2.txt", b"two".as_slice()),
    ]);
    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/upload-multiple", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Internal Server Error!");

    // No partial list went out, but the completed copies remain: the policy
    // is all-or-nothing without rollback.
    assert_eq!(
        std::fs::read(app.uploads_dir().join("ok1.txt")).unwrap(),
        b"one"
    );
    assert_eq!(
        std::fs::read(app.uploads_dir().join("ok2.txt")).unwrap(),
        b"two"
    );
    // Only the failed sibling still has a staging file.
    assert_eq!(app.staging_file_count(), 1);
}

// =============================================================================
// Stored-file serving
// =============================================================================

#[tokio::test]
async fn missing_stored_file_is_404() {
    let app = spawn_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/uploads/nope.txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn traversal_fetch_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/uploads/%2E%2E")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
