//! Verifies that session building and bucket requests produce spans.

#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use edgeauth_cluster::{
    get_cluster,
    testutil::{add_cluster_node, inventory_pool, plaintext_session, test_auth_options, test_config},
};
use edgeauth_storage::StorageBackend;
use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan};
use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

#[derive(Clone, Default)]
struct SpanCollector {
    spans: Arc<Mutex<Vec<String>>>,
}

impl<S> tracing_subscriber::Layer<S> for SpanCollector
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        _attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            self.spans.lock().expect("lock poisoned").push(span.name().to_owned());
        }
    }
}

fn collect() -> (Arc<Mutex<Vec<String>>>, tracing::subscriber::DefaultGuard) {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);
    let subscriber = tracing_subscriber::registry().with(collector);
    (spans, tracing::subscriber::set_default(subscriber))
}

#[tokio::test]
async fn get_cluster_creates_discovery_spans() {
    let db = inventory_pool().await;
    add_cluster_node(&db, "riak-1", "cdn.test").await;
    let (spans, _guard) = collect();

    get_cluster(&db, &test_config()).await.expect("session should build");

    let recorded = spans.lock().expect("lock poisoned");
    for name in ["get_cluster", "list_cluster_nodes"] {
        assert!(recorded.iter().any(|s| s == name), "expected a '{name}' span, got: {recorded:?}");
    }
}

#[tokio::test]
async fn bucket_requests_create_spans() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
    let session = plaintext_session(&[server.uri()], &test_auth_options());
    let (spans, _guard) = collect();

    let _ = session.bucket("cdn_uri_sig_keys").get("demo-ds").await;
    let _ = session.bucket("cdn_uri_sig_keys").health_check().await;

    let recorded = spans.lock().expect("lock poisoned");
    for name in ["get", "health_check", "ping"] {
        assert!(recorded.iter().any(|s| s == name), "expected a '{name}' span, got: {recorded:?}");
    }
}
