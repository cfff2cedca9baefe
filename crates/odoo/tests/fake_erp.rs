use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Router, extract::State, routing::post};

use brujula_core::{ErrorKind, ProductId, SearchDomain};
use brujula_inventory::{InventoryTool, MatchTier, ProductCatalog, TieredSearch};
use brujula_odoo::{OdooClient, OdooConfig, OdooSession};

/// Scripted stand-in for an Odoo server speaking XML-RPC.
#[derive(Default)]
struct FakeErp {
    auth_response: String,
    auth_delay: Duration,
    auth_calls: AtomicUsize,
    object_delay: Duration,
    object_responses: Mutex<VecDeque<String>>,
    object_bodies: Mutex<Vec<String>>,
}

impl FakeErp {
    fn accepting() -> Self {
        Self {
            auth_response: response("<int>2</int>"),
            ..Self::default()
        }
    }

    fn then(self, body: String) -> Self {
        self.object_responses.lock().unwrap().push_back(body);
        self
    }

    fn object_bodies(&self) -> Vec<String> {
        self.object_bodies.lock().unwrap().clone()
    }
}

async fn common(State(erp): State<Arc<FakeErp>>, _body: String) -> String {
    erp.auth_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(erp.auth_delay).await;
    erp.auth_response.clone()
}

async fn object(State(erp): State<Arc<FakeErp>>, body: String) -> String {
    erp.object_bodies.lock().unwrap().push(body);
    tokio::time::sleep(erp.object_delay).await;
    erp.object_responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| response("<array><data/></array>"))
}

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(erp: Arc<FakeErp>) -> Self {
        let app = Router::new()
            .route("/xmlrpc/2/common", post(common))
            .route("/xmlrpc/2/object", post(object))
            .with_state(erp);

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

    fn session(&self, timeout: Duration) -> OdooSession {
        let config = OdooConfig::new(&self.base_url, "mom-main", "cio@example.com", "pw")
            .with_timeout(timeout);
        OdooSession::new(OdooClient::new(&config).unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn response(value: &str) -> String {
    format!(
        "<?xml version='1.0'?><methodResponse><params><param><value>{value}</value></param></params></methodResponse>"
    )
}

fn ids(ids: &[i64]) -> String {
    let values: String = ids
        .iter()
        .map(|id| format!("<value><int>{id}</int></value>"))
        .collect();
    response(&format!("<array><data>{values}</data></array>"))
}

fn records(rows: &[(i64, &str, f64, f64)]) -> String {
    let values: String = rows
        .iter()
        .map(|(id, name, qty, price)| {
            format!(
                "<value><struct>\
                 <member><name>id</name><value><int>{id}</int></value></member>\
                 <member><name>name</name><value><string>{name}</string></value></member>\
                 <member><name>qty_available</name><value><double>{qty}</double></value></member>\
                 <member><name>list_price</name><value><double>{price}</double></value></member>\
                 <member><name>type</name><value><string>product</string></value></member>\
                 </struct></value>"
            )
        })
        .collect();
    response(&format!("<array><data>{values}</data></array>"))
}

fn fault(message: &str) -> String {
    format!(
        "<?xml version='1.0'?><methodResponse><fault><value><struct>\
         <member><name>faultCode</name><value><int>1</int></value></member>\
         <member><name>faultString</name><value><string>{message}</string></value></member>\
         </struct></value></fault></methodResponse>"
    )
}

#[tokio::test]
async fn unmatched_query_escalates_to_fallback_over_xml_rpc() {
    let erp = Arc::new(
        FakeErp::accepting()
            .then(ids(&[]))
            .then(ids(&[]))
            .then(ids(&[11, 12, 13]))
            .then(records(&[
                (11, "Filtro de Aceite", 50.0, 8000.0),
                (12, "Pastillas de Freno", 24.0, 15000.0),
                (13, "Bujía Premium", 12.0, 4500.0),
            ])),
    );
    let srv = TestServer::spawn(erp.clone()).await;
    let engine = TieredSearch::new(Arc::new(srv.session(Duration::from_secs(2))));

    let result = engine.search("Radiador Corsa").await.unwrap();

    assert_eq!(result.match_tier, MatchTier::Fallback);
    assert_eq!(result.products.len(), 3);
    assert_eq!(result.products[0].id, ProductId::new(11));
    assert_eq!(erp.auth_calls.load(Ordering::SeqCst), 1);

    let bodies = erp.object_bodies();
    assert_eq!(bodies.len(), 4);
    assert!(bodies[0].contains("<value><string>ilike</string></value><value><string>Corsa</string></value>"));
    assert!(bodies[2].contains(
        "<member><name>order</name><value><string>qty_available desc</string></value></member>"
    ));
    assert!(bodies[3].contains("<methodName>execute_kw</methodName>"));
    assert!(bodies[3].contains("<value><string>read</string></value>"));
    assert!(bodies[3].contains("<value><string>qty_available</string></value>"));
}

#[tokio::test]
async fn concurrent_first_requests_authenticate_once() {
    let erp = Arc::new(FakeErp {
        auth_delay: Duration::from_millis(100),
        ..FakeErp::accepting()
    });
    let srv = TestServer::spawn(erp.clone()).await;
    let session = Arc::new(srv.session(Duration::from_secs(2)));

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let session = session.clone();
        tasks.spawn(async move { session.uid().await.map(|uid| uid.get()) });
    }

    while let Some(joined) = tasks.join_next().await {
        assert_eq!(joined.unwrap().unwrap(), 2);
    }
    assert_eq!(erp.auth_calls.load(Ordering::SeqCst), 1);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn rejected_credentials_become_connection_error_text() {
    let erp = Arc::new(FakeErp {
        auth_response: response("<boolean>0</boolean>"),
        ..FakeErp::default()
    });
    let srv = TestServer::spawn(erp.clone()).await;
    let session = Arc::new(srv.session(Duration::from_secs(2)));
    let tool = InventoryTool::new(Arc::new(TieredSearch::new(session.clone())));

    let text = tool.run("Radiador").await;

    assert!(text.starts_with("Error connecting to inventory: "), "{text}");
    assert!(text.contains("authentication rejected"), "{text}");
    assert!(erp.object_bodies().is_empty());

    // A failed login is not cached: the next call tries again.
    assert!(!session.is_authenticated());
    let _ = tool.run("Radiador").await;
    assert_eq!(erp.auth_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn slow_erp_call_times_out_as_upstream_error() {
    let erp = Arc::new(FakeErp {
        object_delay: Duration::from_secs(2),
        ..FakeErp::accepting()
    });
    let srv = TestServer::spawn(erp).await;
    let session = srv.session(Duration::from_millis(200));

    let domain = SearchDomain::new().and(SearchDomain::in_stock());
    let err = session.search(&domain, 5, None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    assert!(err.message().contains("timed out"), "{err}");
}

#[tokio::test]
async fn fault_message_is_carried_through() {
    let erp = Arc::new(FakeErp::accepting().then(fault("Access Denied")));
    let srv = TestServer::spawn(erp).await;
    let session = srv.session(Duration::from_secs(2));

    let domain = SearchDomain::new().and(SearchDomain::sellable_types());
    let err = session.search(&domain, 5, None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    assert!(err.message().contains("Access Denied"), "{err}");
}

#[tokio::test]
async fn empty_read_never_reaches_the_erp() {
    let erp = Arc::new(FakeErp::accepting());
    let srv = TestServer::spawn(erp.clone()).await;
    let session = srv.session(Duration::from_secs(2));

    let rows = session.read(&[], &["name"]).await.unwrap();

    assert!(rows.is_empty());
    assert!(erp.object_bodies().is_empty());
    assert_eq!(erp.auth_calls.load(Ordering::SeqCst), 0);
}
