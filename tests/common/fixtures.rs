//! Image host and tribute fixtures

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bytes served for every healthy image
pub const JPEG_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg";

/// Start a mock image host
///
/// - `/ok/<name>` answers 200 with [`JPEG_BYTES`]
/// - `/missing/<name>` answers 404
/// - `/broken/<name>` answers 500
/// - `/slow/<name>` answers 200 after `slow_delay`
pub async fn start_image_host(slow_delay: Duration) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/ok/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG_BYTES.to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/missing/.+$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/broken/.+$"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/slow/.+$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(JPEG_BYTES.to_vec())
                .set_delay(slow_delay),
        )
        .mount(&server)
        .await;

    server
}

/// Mount a single image at an exact path
pub async fn mount_image(server: &MockServer, image_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// A table dump with every `image_url` shape the store produces
pub fn table_dump(host: &str) -> Value {
    json!([
        {
            "id": 1,
            "name": "สมชาย",
            "relationship": "Friend",
            "messages": "ด้วยรักและอาลัย",
            "created_at": "2024-05-01T00:00:00+00:00",
            "image_url": format!("{host}/ok/one.jpg")
        },
        {
            "id": 2,
            "name": "Jane",
            "message": "Legacy message only",
            "created_at": "2024-05-02 12:30:00+00",
            "image_url": serde_json::to_string(&[
                format!("{host}/ok/two-a.png"),
                format!("{host}/missing/two-b.png")
            ]).unwrap_or_default()
        },
        {
            "id": "3",
            "name": "No Photos",
            "messages": "Text only",
            "created_at": null,
            "image_url": null
        },
        {
            "id": 4,
            "name": "Array Column",
            "messages": "Already an array",
            "image_url": [format!("{host}/broken/four.gif"), ""]
        }
    ])
}
