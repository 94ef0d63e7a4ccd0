use bfl_rs::{
    BflError, Client, FluxDevInputs, FluxProInputs, FluxProPlusInputs, Model, Status, Task,
};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

const TEST_KEY: &str = "test_api_key";

fn client_for(server: &mockito::ServerGuard) -> Client {
    Client::builder()
        .api_key(TEST_KEY)
        .base_url(server.url())
        .build()
        .unwrap()
}

fn ready_body(id: &str) -> String {
    json!({
        "id": id,
        "status": "Ready",
        "result": {"sample": "https://x/y.png", "prompt": "p"}
    })
    .to_string()
}

// --- Construction ---

#[test]
fn test_explicit_key() {
    let client = Client::new(Some(TEST_KEY.into())).unwrap();
    assert_eq!(client.base_url(), "https://api.bfl.ml");
}

#[test]
fn test_key_from_env() {
    std::env::set_var(bfl_rs::API_KEY_ENV, "env_api_key");
    assert!(Client::from_env().is_ok());
    assert!(Client::new(None).is_ok());
}

// --- generate ---

#[tokio::test]
async fn test_generate_returns_bare_task() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/flux-pro-1.1")
        .match_header("x-key", TEST_KEY)
        .match_header("user-agent", Matcher::Regex("^bfl-rs/".into()))
        .match_body(Matcher::Json(json!({"prompt": "Test prompt"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "T1"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let task = client
        .generate_pro_plus(&FluxProPlusInputs::new("Test prompt"))
        .await
        .unwrap();

    assert_eq!(task.id, "T1");
    assert!(task.status.is_none());
    assert!(task.result.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generate_every_model() {
    let mut server = mockito::Server::new_async().await;
    let client = client_for(&server);

    for model in Model::ALL {
        let mock = server
            .mock("POST", model.path().as_str())
            .with_status(200)
            .with_body(r#"{"id": "generated_task_id"}"#)
            .create_async()
            .await;

        let task = client
            .generate(model, &json!({"prompt": "Test prompt"}))
            .await
            .unwrap();
        assert_eq!(task.id, "generated_task_id");
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_generate_typed_inputs_hit_their_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let pro = server
        .mock("POST", "/v1/flux-pro")
        .match_body(Matcher::Json(
            json!({"prompt": "p", "steps": 40, "guidance": 2.5}),
        ))
        .with_status(200)
        .with_body(r#"{"id": "pro"}"#)
        .create_async()
        .await;
    let dev = server
        .mock("POST", "/v1/flux-dev")
        .match_body(Matcher::Json(
            json!({"prompt": "p", "width": 512, "height": 512, "seed": 3}),
        ))
        .with_status(200)
        .with_body(r#"{"id": "dev"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let task = client
        .generate_pro(&FluxProInputs::new("p").steps(40).guidance(2.5))
        .await
        .unwrap();
    assert_eq!(task.id, "pro");

    let task = client
        .generate_dev(&FluxDevInputs::new("p").size(512, 512).seed(3))
        .await
        .unwrap();
    assert_eq!(task.id, "dev");

    pro.assert_async().await;
    dev.assert_async().await;
}

#[tokio::test]
async fn test_generate_rejected_parameters() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/flux-pro-1.1")
        .with_status(422)
        .with_body(r#"{"detail":[{"msg":"width must be a multiple of 32"}]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .generate_pro_plus(&FluxProPlusInputs::new("p").width(1000))
        .await
        .unwrap_err();

    match err {
        BflError::Http { status, body } => {
            assert_eq!(status, 422);
            assert!(body.contains("multiple of 32"));
        }
        other => panic!("expected Http error, got {:?}", other),
    }
}

// --- get_result ---

#[tokio::test]
async fn test_get_result_ready() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Regex("^/v1/get_result".into()))
        .match_query(Matcher::UrlEncoded("id".into(), "T1".into()))
        .match_header("x-key", TEST_KEY)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ready_body("T1"))
        .create_async()
        .await;

    let client = client_for(&server);
    let task = client.get_result("T1").await.unwrap();

    assert_eq!(task.id, "T1");
    assert_eq!(task.status, Some(Status::Ready));
    assert!(task.is_done());
    let result = task.result.unwrap();
    assert_eq!(result.sample, "https://x/y.png");
    assert_eq!(result.prompt, "p");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_result_accepts_task_or_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Regex("^/v1/get_result".into()))
        .match_query(Matcher::UrlEncoded("id".into(), "T1".into()))
        .with_status(200)
        .with_body(ready_body("T1"))
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server);
    let by_handle = client.get_result(&Task::new("T1")).await.unwrap();
    let by_str = client.get_result("T1").await.unwrap();
    let by_string = client.get_result(&String::from("T1")).await.unwrap();

    assert_eq!(by_handle, by_str);
    assert_eq!(by_str, by_string);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_result_pending_then_moderated() {
    let mut server = mockito::Server::new_async().await;
    let client = client_for(&server);

    let pending = server
        .mock("GET", Matcher::Regex("^/v1/get_result".into()))
        .with_status(200)
        .with_body(r#"{"id":"T2","status":"Pending","result":null}"#)
        .create_async()
        .await;
    let task = client.get_result("T2").await.unwrap();
    assert_eq!(task.status, Some(Status::Pending));
    assert!(!task.is_done());
    pending.remove_async().await;

    server
        .mock("GET", Matcher::Regex("^/v1/get_result".into()))
        .with_status(200)
        .with_body(r#"{"id":"T2","status":"Content Moderated"}"#)
        .create_async()
        .await;
    let task = client.get_result(&task).await.unwrap();
    assert_eq!(task.status, Some(Status::ContentModerated));
    assert!(task.is_done());
    assert!(task.result.is_none());
}

#[tokio::test]
async fn test_get_result_unknown_id_is_not_found_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Regex("^/v1/get_result".into()))
        .with_status(200)
        .with_body(r#"{"id":"nope","status":"Task not found"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let task = client.get_result("nope").await.unwrap();
    assert_eq!(task.status, Some(Status::NotFound));
    assert!(!task.is_done());
}

#[tokio::test]
async fn test_get_result_http_404() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Regex("^/v1/get_result".into()))
        .with_status(404)
        .with_body(r#"{"error": "Not found"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.get_result("non_existent_task").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(!err.is_configuration());
}

#[tokio::test]
async fn test_get_result_unrecognized_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Regex("^/v1/get_result".into()))
        .with_status(200)
        .with_body(r#"{"id":"T1","status":"Warming Up"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.get_result("T1").await.unwrap_err();
    assert!(matches!(err, BflError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let client = Client::builder()
        .api_key(TEST_KEY)
        .base_url("http://127.0.0.1:1")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let err = client.get_result("T1").await.unwrap_err();
    match err {
        BflError::Network { context, .. } => {
            assert!(context.contains("http://127.0.0.1:1"));
        }
        other => panic!("expected Network error, got {:?}", other),
    }
}
