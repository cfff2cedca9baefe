use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router, extract::State, http::StatusCode, http::Uri};
use serde_json::{Value as JsonValue, json};

use brujula_ai::{AiError, ChatFlow, ChatInput, GeminiClient, GeminiConfig};
use brujula_core::{Product, ProductType};
use brujula_inventory::{InMemoryCatalog, InventoryTool, TieredSearch};

/// Scripted stand-in for the Gemini REST API.
#[derive(Default)]
struct FakeGemini {
    replies: Mutex<VecDeque<(StatusCode, JsonValue)>>,
    delay: Duration,
    requests: Mutex<Vec<(String, JsonValue)>>,
}

impl FakeGemini {
    fn then(self, status: StatusCode, body: JsonValue) -> Self {
        self.replies.lock().unwrap().push_back((status, body));
        self
    }

    fn requests(&self) -> Vec<(String, JsonValue)> {
        self.requests.lock().unwrap().clone()
    }
}

async fn generate(
    State(fake): State<Arc<FakeGemini>>,
    uri: Uri,
    Json(body): Json<JsonValue>,
) -> (StatusCode, Json<JsonValue>) {
    fake.requests.lock().unwrap().push((uri.to_string(), body));
    tokio::time::sleep(fake.delay).await;
    let (status, reply) = fake
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, json!({"error": {"message": "no reply"}})));
    (status, Json(reply))
}

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(fake: Arc<FakeGemini>) -> Self {
        let app = Router::new().fallback(generate).with_state(fake);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    fn client(&self, timeout: Duration) -> GeminiClient {
        let config = GeminiConfig::new("test-key")
            .with_base_url(&self.base_url)
            .with_timeout(timeout);
        GeminiClient::new(config).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn text_reply(text: &str) -> JsonValue {
    json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
}

fn tool_reply(query: &str) -> JsonValue {
    json!({"candidates": [{"content": {"role": "model", "parts": [
        {"functionCall": {"name": "searchInventory", "args": {"query": query}}}
    ]}}]})
}

fn inventory_flow(client: GeminiClient) -> ChatFlow {
    let catalog = InMemoryCatalog::new(vec![
        Product::new(1, "Radiador Corsa", 3.0, 120000.0, ProductType::Product),
        Product::new(2, "Filtro de Aceite", 50.0, 8000.0, ProductType::Product),
    ]);
    let tool = InventoryTool::new(Arc::new(TieredSearch::new(catalog)));
    ChatFlow::new(Arc::new(client)).with_tool(Arc::new(tool))
}

#[tokio::test]
async fn inventory_question_runs_the_search_tool_through_gemini() {
    let fake = Arc::new(
        FakeGemini::default()
            .then(StatusCode::OK, tool_reply("radiador corsa"))
            .then(StatusCode::OK, text_reply("Sí, hay 3 radiadores para Corsa.")),
    );
    let srv = TestServer::spawn(fake.clone()).await;
    let flow = inventory_flow(srv.client(Duration::from_secs(2)));

    let input = ChatInput::new("¿Tienes radiador para Corsa?").with_context("MOM");
    let answer = flow.run(&input).await.unwrap();

    assert_eq!(answer, "Sí, hay 3 radiadores para Corsa.");

    let requests = fake.requests();
    assert_eq!(requests.len(), 2);
    let (uri, first) = &requests[0];
    assert!(uri.starts_with("/v1beta/models/gemini-1.5-flash:generateContent"), "{uri}");
    assert!(uri.contains("key=test-key"), "{uri}");
    assert_eq!(first["tools"][0]["functionDeclarations"][0]["name"], "searchInventory");

    let (_, second) = &requests[1];
    let grounding = second["contents"][2]["parts"][0]["functionResponse"]["response"]["result"]
        .as_str()
        .unwrap();
    assert!(grounding.contains("Radiador Corsa"), "{grounding}");
    assert!(grounding.contains("exact match"), "{grounding}");
}

#[tokio::test]
async fn error_status_is_an_inference_failure() {
    let fake = Arc::new(FakeGemini::default().then(
        StatusCode::BAD_REQUEST,
        json!({"error": {"code": 400, "message": "API key not valid"}}),
    ));
    let srv = TestServer::spawn(fake).await;
    let flow = inventory_flow(srv.client(Duration::from_secs(2)));

    let err = flow.run(&ChatInput::new("hola")).await.unwrap_err();

    match err {
        AiError::InferenceFailed(msg) => {
            assert!(msg.contains("400"), "{msg}");
            assert!(msg.contains("API key not valid"), "{msg}");
            assert!(!msg.contains("test-key"), "{msg}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_model_times_out() {
    let fake = Arc::new(FakeGemini {
        delay: Duration::from_secs(2),
        ..FakeGemini::default()
    });
    let srv = TestServer::spawn(fake).await;
    let flow = inventory_flow(srv.client(Duration::from_millis(200)));

    let err = flow.run(&ChatInput::new("hola")).await.unwrap_err();
    assert!(matches!(err, AiError::InferenceFailed(msg) if msg.contains("timed out")));
}
