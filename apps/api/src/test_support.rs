//! Shared fixtures for unit tests: a scripted HTTP server and document builders.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Router,
};
use serde_json::Value;

use crate::config::{Config, GenerationConfig, StoreBackend};
use crate::llm_client::{GenerationParams, LlmClient, Provider, RetryPolicy};
use crate::state::AppState;
use crate::store::memory::MemoryRoastStore;

/// Backoff used by test clients, short enough to keep retry tests fast.
pub const TEST_BACKOFF: Duration = Duration::from_millis(20);

struct MockState {
    script: Vec<(u16, String)>,
    calls: AtomicUsize,
    requests: Mutex<Vec<Value>>,
    authorizations: Mutex<Vec<String>>,
}

/// Local HTTP server answering every request from a fixed script.
/// The last scripted response repeats once the script runs out.
pub struct MockServer {
    pub url: String,
    state: Arc<MockState>,
}

impl MockServer {
    pub async fn start(script: Vec<(u16, &str)>) -> Self {
        assert!(!script.is_empty(), "mock script needs at least one response");
        let state = Arc::new(MockState {
            script: script
                .into_iter()
                .map(|(status, body)| (status, body.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            authorizations: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(respond)
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/generate"),
            state,
        }
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn authorizations(&self) -> Vec<String> {
        self.state.authorizations.lock().unwrap().clone()
    }
}

async fn respond(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let call = state.calls.fetch_add(1, Ordering::SeqCst);
    state
        .requests
        .lock()
        .unwrap()
        .push(serde_json::from_slice(&body).unwrap_or(Value::Null));
    if let Some(auth) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        state.authorizations.lock().unwrap().push(auth.to_string());
    }

    let (status, body) = &state.script[call.min(state.script.len() - 1)];
    (StatusCode::from_u16(*status).unwrap(), body.clone())
}

pub fn generation_config(endpoint: &str, provider: Provider, max_attempts: u32) -> GenerationConfig {
    GenerationConfig {
        provider,
        api_key: "test-key".to_string(),
        model: provider.default_model().to_string(),
        endpoint: endpoint.to_string(),
        params: GenerationParams {
            temperature: 0.6,
            max_tokens: 200,
        },
        retry: RetryPolicy {
            max_attempts,
            backoff: TEST_BACKOFF,
        },
        max_prompt_words: 2250,
    }
}

/// App state wired to an in-memory store and a generation endpoint.
pub fn test_state(generation_endpoint: &str) -> AppState {
    let generation = generation_config(generation_endpoint, Provider::HuggingFace, 3);
    let llm = LlmClient::new(&generation).unwrap();
    AppState {
        store: Arc::new(MemoryRoastStore::default()),
        llm,
        config: Config {
            generation,
            store: StoreBackend::Memory,
            public_base_url: "https://roaster.example.com/".to_string(),
            max_upload_bytes: 1024 * 1024,
            port: 0,
            rust_log: "debug".to_string(),
        },
    }
}

/// Builds a PDF with one page per entry. An empty entry yields a page with no text.
pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Builds a DOCX whose body holds one paragraph per entry.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};

    let docx = paragraphs.iter().fold(Docx::new(), |docx, text| {
        let paragraph = if text.is_empty() {
            Paragraph::new()
        } else {
            Paragraph::new().add_run(Run::new().add_text(*text))
        };
        docx.add_paragraph(paragraph)
    });

    let mut buf = Vec::new();
    docx.build().pack(Cursor::new(&mut buf)).unwrap();
    buf
}

/// Builds a single-paragraph DOCX: plain `lead` text followed by a hyperlink to `target`
/// whose visible text is `link_text`.
pub fn docx_with_hyperlink(lead: &str, link_text: &str, target: &str) -> Vec<u8> {
    use docx_rs::{Docx, Hyperlink, HyperlinkType, Paragraph, Run};

    let paragraph = Paragraph::new()
        .add_run(Run::new().add_text(lead))
        .add_hyperlink(
            Hyperlink::new(target, HyperlinkType::External)
                .add_run(Run::new().add_text(link_text)),
        );

    let mut buf = Vec::new();
    Docx::new()
        .add_paragraph(paragraph)
        .build()
        .pack(Cursor::new(&mut buf))
        .unwrap();
    buf
}
