//! In-memory collaborators for unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::extract::{Query, Request, State};
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::Response;
use tokio::net::TcpListener;

use crate::integrations::{DirectorySearch, PlaceReviews, TrendSource};
use crate::llm::{CompletionProvider, CompletionRequest};
use crate::models::BusinessListing;
use crate::{DishcastError, Result};

type Responder = Box<dyn Fn(&str) -> Result<String> + Send + Sync>;

pub struct FakeCompletion {
    responder: Responder,
    prompts: Mutex<Vec<String>>,
}

impl FakeCompletion {
    pub fn replying(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::with(move |_| Ok(reply.clone()))
    }

    pub fn failing(reason: &str) -> Self {
        let reason = reason.to_string();
        Self::with(move |_| Err(DishcastError::api("openai", reason.clone())))
    }

    pub fn with(responder: impl Fn(&str) -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        (self.responder)(&request.prompt)
    }
}

pub struct FakeDirectory {
    pub listings: Option<Vec<BusinessListing>>,
    pub calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn with_names(names: &[&str]) -> Self {
        let listings = names
            .iter()
            .enumerate()
            .map(|(i, name)| listing(&format!("biz-{i}"), name))
            .collect();
        Self {
            listings: Some(listings),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            listings: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DirectorySearch for FakeDirectory {
    async fn search(&self, _location: &str) -> Result<Vec<BusinessListing>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.listings
            .clone()
            .ok_or_else(|| DishcastError::api("yelp", "connection refused"))
    }
}

#[derive(Default)]
pub struct FakeReviews {
    pub by_listing: HashMap<String, Vec<String>>,
    pub failing: Vec<String>,
    pub calls: AtomicUsize,
}

impl FakeReviews {
    pub fn with(entries: &[(&str, &[&str])]) -> Self {
        Self {
            by_listing: entries
                .iter()
                .map(|(name, reviews)| {
                    (
                        name.to_string(),
                        reviews.iter().map(|r| r.to_string()).collect(),
                    )
                })
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PlaceReviews for FakeReviews {
    async fn reviews(&self, listing_name: &str, _location: &str) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|name| name == listing_name) {
            return Err(DishcastError::api("google places", "OVER_QUERY_LIMIT"));
        }
        Ok(self.by_listing.get(listing_name).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeTrends {
    pub series: HashMap<String, Vec<f64>>,
    pub calls: AtomicUsize,
}

impl FakeTrends {
    pub fn with(entries: &[(&str, &[f64])]) -> Self {
        Self {
            series: entries
                .iter()
                .map(|(term, values)| (term.to_string(), values.to_vec()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TrendSource for FakeTrends {
    async fn interest_over_time(&self, term: &str) -> Result<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.series
            .get(term)
            .cloned()
            .ok_or_else(|| DishcastError::api("google trends", "429 Too Many Requests"))
    }
}

pub fn listing(id: &str, name: &str) -> BusinessListing {
    BusinessListing {
        id: id.to_string(),
        name: name.to_string(),
        rating: Some(4.0),
        address: None,
        price: Some("$$".to_string()),
        review_count: Some(100),
    }
}

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}

/// Base URL of a local port nothing listens on
pub async fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
}

impl SeenRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Records every request a test server receives
#[derive(Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<SeenRequest>>>);

impl RequestLog {
    pub fn attach(&self, router: Router) -> Router {
        router.layer(middleware::from_fn_with_state(self.clone(), record))
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.0.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|seen| seen.path).collect()
    }
}

async fn record(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    let query = Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .map(|Query(query)| query)
        .unwrap_or_default();
    log.0.lock().unwrap().push(SeenRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query,
        headers: request.headers().clone(),
    });
    next.run(request).await
}
