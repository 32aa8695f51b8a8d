//! Hand-written service fakes shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use factcheck::adapters::{
    AdapterError, Reasoner, ReasoningRequest, SearchBackend, SearchHit, SearchResponse,
};
use factcheck::config::ResolvedConfig;
use factcheck::Orchestrator;

/// True for the claim-extraction prompt
pub fn is_extraction(request: &ReasoningRequest) -> bool {
    request.prompt.contains("Extract ALL sentences")
}

/// Claim text embedded in a verification prompt
pub fn claim_of(request: &ReasoningRequest) -> Option<&str> {
    let start = request.prompt.find("CLAIM:\n")? + "CLAIM:\n".len();
    let rest = &request.prompt[start..];
    let end = rest.find("\n\nSOURCES:")?;
    Some(&rest[..end])
}

type Script = dyn Fn(&ReasoningRequest) -> Result<Value> + Send + Sync;

/// Reasoner answering from a closure, optionally after a per-request delay
pub struct ScriptedReasoner {
    script: Box<Script>,
    delay: Box<dyn Fn(&ReasoningRequest) -> Duration + Send + Sync>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ReasoningRequest>>,
}

impl ScriptedReasoner {
    pub fn new(script: impl Fn(&ReasoningRequest) -> Result<Value> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            delay: Box::new(|_| Duration::ZERO),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(
        mut self,
        delay: impl Fn(&ReasoningRequest) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Box::new(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reasoner for ScriptedReasoner {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn classify(&self, request: &ReasoningRequest) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let delay = (self.delay)(request);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        (self.script)(request)
    }
}

/// Reasoner that always fails like an unreachable service
pub struct FailingReasoner {
    calls: AtomicUsize,
}

impl FailingReasoner {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Reasoner for FailingReasoner {
    fn name(&self) -> &str {
        "failing"
    }

    async fn classify(&self, _request: &ReasoningRequest) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AdapterError::Status {
            service: "fake",
            status: 503,
            body: "service unavailable".to_string(),
        }
        .into())
    }
}

/// Search backend returning the same response for every query
pub struct StaticSearch {
    response: SearchResponse,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(response: SearchResponse) -> Self {
        Self {
            response,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Empty response: no answer and no results
    pub fn empty() -> Self {
        Self::new(SearchResponse::default())
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for StaticSearch {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(SearchResponse {
            answer: self.response.answer.clone(),
            results: self.response.results.iter().take(max_results).cloned().collect(),
        })
    }
}

/// Search backend that always errors
pub struct FailingSearch;

#[async_trait]
impl SearchBackend for FailingSearch {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(&self, _query: &str, _max_results: usize) -> Result<SearchResponse> {
        Err(anyhow!("connection refused"))
    }
}

pub fn hit(title: &str, url: &str, content: &str) -> SearchHit {
    SearchHit {
        title: Some(title.to_string()),
        url: Some(url.to_string()),
        content: Some(content.to_string()),
    }
}

/// Search response about the Eiffel Tower, with an aggregated answer
pub fn eiffel_response() -> SearchResponse {
    SearchResponse {
        answer: Some("The Eiffel Tower was completed in 1889 and is about 330 meters tall.".to_string()),
        results: vec![
            hit(
                "Eiffel Tower - Wikipedia",
                "https://en.wikipedia.org/wiki/Eiffel_Tower",
                "Constructed from 1887 to 1889, the tower is 330 metres tall.",
            ),
            hit(
                "Eiffel Tower facts",
                "https://www.toureiffel.paris/en",
                "The tower was inaugurated in 1889 for the World's Fair.",
            ),
            hit(
                "History of the tower",
                "https://example.org/history",
                "Gustave Eiffel's company designed and built the tower.",
            ),
        ],
    }
}

/// Orchestrator over fakes with default limits
pub fn orchestrator(reasoner: Arc<dyn Reasoner>, search: Arc<dyn SearchBackend>) -> Orchestrator {
    Orchestrator::from_services(reasoner, search, &ResolvedConfig::default())
}

/// Serve a single canned HTTP response on a local port and return its base URL
pub async fn serve_once(status: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request(&mut stream).await;
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
    });

    format!("http://{}", addr)
}

/// Consume request headers and a Content-Length body
async fn read_request(stream: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}
