//! End-to-end dispatcher behavior against a mock console backend.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use console_api::api::{ApiClient, RetryPolicy};
use console_api::cancel::CancelHandle;
use console_api::config::{AuthConfig, ConsoleConfig, ServerConfig};
use console_api::context::{AppContext, Navigator};
use console_api::error::ApiError;
use console_api::links::HrefOptions;
use console_api::types::{Params, UploadFile};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        base_delay: Duration::from_millis(2),
        jitter_ratio: 0.2,
    }
}

fn context_for(server: &MockServer, redirect_template: &str) -> Arc<AppContext> {
    let config = ConsoleConfig {
        server: ServerConfig {
            page_url: format!("{}/console/app/index.html", server.uri()),
            ..Default::default()
        },
        auth: AuthConfig {
            org_id: "O123".to_string(),
            csrf_token: "T1".to_string(),
            redirect_template: redirect_template.to_string(),
        },
        ..Default::default()
    };
    Arc::new(AppContext::from_config(&config).expect("valid test config"))
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new_with_retry_policy(
        context_for(server, ""),
        Duration::from_secs(5),
        fast_policy(),
    )
}

fn record_hooks(client: &ApiClient) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    client
        .context()
        .hooks
        .register(move |message| sink.lock().unwrap().push(message.to_string()));
    seen
}

#[tokio::test]
async fn calls_are_rooted_at_base_path_with_session_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/v1/GetArtifacts"))
        .and(query_param("type", "CLIENT"))
        .and(header("Grpc-Metadata-OrgId", "O123"))
        .and(header("X-CSRF-Token", "T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let params = json!({"type": "CLIENT"}).as_object().cloned().unwrap();
    let response = client.get("v1/GetArtifacts", &params, None).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!({"items": []}));
}

#[tokio::test]
async fn rotated_token_is_sent_on_the_next_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/v1/Foo"))
        .and(header("X-CSRF-Token", "T1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Csrf-Token", "T2")
                .set_body_json(json!({"ok": true})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/console/api/v1/Bar"))
        .and(header("X-CSRF-Token", "T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"saved": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.get("v1/Foo", &Params::new(), None).await.unwrap();
    assert_eq!(first.data, json!({"ok": true}));
    assert_eq!(
        client.context().auth.current_csrf_token().as_deref(),
        Some("T2")
    );

    let second = client.post("v1/Bar", &Params::new(), None).await.unwrap();
    assert_eq!(second.data, json!({"saved": true}));
}

#[tokio::test]
async fn idempotent_server_errors_use_all_four_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/v1/Flaky"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(4)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let seen = record_hooks(&client);
    let err = client
        .get("v1/Flaky", &Params::new(), None)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(502));
    assert_eq!(*seen.lock().unwrap(), vec!["Error: bad gateway".to_string()]);
}

#[tokio::test]
async fn server_error_recovers_within_the_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/console/api/v1/Notebook"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/console/api/v1/Notebook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let seen = record_hooks(&client);
    let response = client
        .delete("v1/Notebook", &Params::new(), None)
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_idempotent_server_error_fails_on_first_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/console/api/v1/CreateHunt"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let seen = record_hooks(&client);
    let params = json!({"description": "hunt"}).as_object().cloned().unwrap();
    client
        .post("v1/CreateHunt", &params, None)
        .await
        .unwrap_err();
    assert_eq!(*seen.lock().unwrap(), vec!["Error: boom".to_string()]);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, json!({"description": "hunt"}));
}

#[tokio::test]
async fn cancelled_call_is_silent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/v1/Slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let seen = record_hooks(&client);
    let handle = CancelHandle::new();
    let canceller = handle.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let response = client
        .get("v1/Slow", &Params::new(), Some(&handle))
        .await
        .unwrap();
    assert!(response.cancelled);
    assert_eq!(response.status, 0);
    assert!(seen.lock().unwrap().is_empty());

    // A handle that is already cancelled short-circuits later calls too.
    let again = client
        .get("v1/Slow", &Params::new(), Some(&handle))
        .await
        .unwrap();
    assert!(again.cancelled);
}

#[derive(Default)]
struct Recorded(Mutex<Vec<String>>);

impl Navigator for Recorded {
    fn assign(&self, url: &str) {
        self.0.lock().unwrap().push(url.to_string());
    }
}

#[tokio::test]
async fn expired_session_redirects_instead_of_reporting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/v1/GetUserUITraits"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let navigator = Arc::new(Recorded::default());
    let client = ApiClient::new_with_retry_policy(
        context_for(&server, "/auth/login?redirect=%LOCATION%"),
        Duration::from_secs(5),
        fast_policy(),
    )
    .with_navigator(navigator.clone());
    let seen = record_hooks(&client);

    let err = client
        .get("v1/GetUserUITraits", &Params::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired { .. }), "{err}");
    let visited = navigator.0.lock().unwrap().clone();
    assert_eq!(visited.len(), 1);
    assert!(visited[0].starts_with("/auth/login?redirect=http%3A%2F%2F"));
    assert!(visited[0].ends_with("%2Fconsole%2Fapp%2Findex.html"));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upload_posts_multipart_with_params_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/console/api/v1/UploadFormFile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"url": "/d/1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut files = BTreeMap::new();
    files.insert(
        "file".to_string(),
        UploadFile::new("notes.txt", b"hello upload".to_vec()).with_mime("text/plain"),
    );
    let params = json!({"form": "X"}).as_object().cloned().unwrap();
    let response = client
        .upload("v1/UploadFormFile", &files, &params, None)
        .await
        .unwrap();
    assert_eq!(response.data, json!({"url": "/d/1"}));

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(body.contains("filename=\"notes.txt\""));
    assert!(body.contains("hello upload"));
    assert!(body.contains("name=\"_params_\""));
    assert!(body.contains(r#"{"form":"X"}"#));
}

#[tokio::test]
async fn blob_download_returns_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/v1/DownloadVFSFile"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8, 159, 146, 150], "application/octet-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let blob = client
        .get_blob("v1/DownloadVFSFile", &Params::new(), None)
        .await
        .unwrap();
    assert_eq!(blob.data, vec![0u8, 159, 146, 150]);
    assert_eq!(blob.content_type.as_deref(), Some("application/octet-stream"));
}

#[tokio::test]
async fn links_share_the_dispatcher_context() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let context = client.context();

    let href = context.href("/api/v1/DownloadVFSFile", &Params::new(), HrefOptions::default());
    assert_eq!(
        href,
        format!("{}/console/api/v1/DownloadVFSFile?org_id=O123", server.uri())
    );

    context.auth.set_org_id("O9");
    let href = context.href(
        "/app/index.html#/collected/C.123/",
        &Params::new(),
        HrefOptions::default(),
    );
    assert_eq!(
        href,
        format!(
            "{}/console/app/index.html?org_id=O9#/collected/C.123/",
            server.uri()
        )
    );

    let external = "https://docs.example.org/guide?x=1#top";
    assert_eq!(
        context.href(external, &Params::new(), HrefOptions::default()),
        external
    );
}
