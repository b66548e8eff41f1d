//! Activation acceptance step definitions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cucumber::gherkin::Step;
use cucumber::{given, then, when, World};
use tower::ServiceExt;

use simcard_activator::api::{self, RecordView, StatusView};
use simcard_activator::clients::{GatewayConfig, HttpProvisioningGateway};
use simcard_activator::interfaces::RecordStore;
use simcard_activator::services::ActivationService;
use simcard_activator::storage::{init_storage, StorageConfig, StorageType};
use simcard_activator::stub::{self, ActuatorStub, ACTUATE_PATH};

/// Response captured from the API.
#[derive(Debug, Clone)]
struct Captured {
    status: StatusCode,
    body: String,
}

/// Test context for activation scenarios.
#[derive(World)]
#[world(init = Self::new)]
pub struct ActivationWorld {
    stub: Arc<ActuatorStub>,
    stub_addr: Option<SocketAddr>,
    store: Option<Arc<dyn RecordStore>>,
    app: Option<Router>,
    responses: Vec<Captured>,
}

impl std::fmt::Debug for ActivationWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivationWorld")
            .field("stub_addr", &self.stub_addr)
            .field("store", &self.store.as_ref().map(|_| "<dyn RecordStore>"))
            .field("responses", &self.responses)
            .finish()
    }
}

impl ActivationWorld {
    fn new() -> Self {
        Self {
            stub: Arc::new(ActuatorStub::default()),
            stub_addr: None,
            store: None,
            app: None,
            responses: Vec::new(),
        }
    }

    fn app(&self) -> Router {
        self.app.clone().expect("Activation service not started")
    }

    /// Rebuild the service on the current store with a gateway at `url`.
    fn connect(&mut self, url: String) {
        let store = self.store.clone().expect("Store not initialized");
        let config = GatewayConfig::default()
            .with_url(url)
            .with_timeout(Duration::from_secs(2));
        let gateway =
            Arc::new(HttpProvisioningGateway::new(config).expect("Failed to build gateway"));
        let service = Arc::new(ActivationService::new(gateway, store));
        self.app = Some(api::router(service));
    }

    async fn send(&mut self, request: Request<Body>) {
        let captured = call(self.app(), request).await;
        self.responses.push(captured);
    }

    fn last(&self) -> &Captured {
        self.responses.last().expect("No response captured")
    }

    async fn activate(&mut self, requester: &str, iccid: &str) {
        let body = serde_json::json!({ "iccid": iccid, "customerEmail": requester });
        self.send(activate_request(body.to_string())).await;
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, uri: &str) -> T {
        let captured = call(self.app(), get_request(uri)).await;
        assert_eq!(captured.status, StatusCode::OK, "GET {} failed", uri);
        serde_json::from_str(&captured.body).expect("Invalid JSON response")
    }

    async fn record(&self, iccid: &str) -> RecordView {
        self.get_json(&format!("/api/activations/{}", iccid)).await
    }

    async fn listed(&self, uri: &str) -> Vec<String> {
        let records: Vec<RecordView> = self.get_json(uri).await;
        records.into_iter().map(|r| r.iccid).collect()
    }
}

async fn call(app: Router, request: Request<Body>) -> Captured {
    let resp = app.oneshot(request).await.expect("Request failed");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");
    Captured {
        status,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

fn activate_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/activate")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("Invalid request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Invalid request")
}

fn iccid_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// --- Background ---

#[given("the actuator is running")]
async fn given_actuator_running(world: &mut ActivationWorld) {
    let addr = stub::spawn(Arc::clone(&world.stub), SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to start actuator stub");
    world.stub_addr = Some(addr);
}

#[given("the activation service is connected to the actuator")]
async fn given_service_connected(world: &mut ActivationWorld) {
    let config = StorageConfig {
        storage_type: StorageType::Memory,
        ..Default::default()
    };
    let store = init_storage(&config)
        .await
        .expect("Failed to initialize storage");
    world.store = Some(store);

    let addr = world.stub_addr.expect("Actuator not running");
    world.connect(format!("http://{}{}", addr, ACTUATE_PATH));
}

// --- Given steps ---

#[given("the actuator becomes unreachable")]
async fn given_actuator_unreachable(world: &mut ActivationWorld) {
    // Bind then release a port so nothing is listening on it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let dead = listener.local_addr().expect("No local addr");
    drop(listener);

    world.connect(format!("http://{}{}", dead, ACTUATE_PATH));
}

#[given(expr = "the actuator reports failure for {string}")]
async fn given_actuator_fails(world: &mut ActivationWorld, iccid: String) {
    world.stub.fail_iccid(&iccid).await;
}

#[given(expr = "{string} activates ICCID {string}")]
async fn given_activates(world: &mut ActivationWorld, requester: String, iccid: String) {
    world.activate(&requester, &iccid).await;
}

// --- When steps ---

#[when(expr = "{string} activates ICCID {string}")]
async fn when_activates(world: &mut ActivationWorld, requester: String, iccid: String) {
    world.activate(&requester, &iccid).await;
}

#[when(expr = "{int} customers activate ICCID {string} at the same time")]
async fn when_concurrent(world: &mut ActivationWorld, count: usize, iccid: String) {
    let requests = (0..count).map(|i| {
        let body = serde_json::json!({
            "iccid": iccid,
            "customerEmail": format!("customer-{}@example.com", i),
        });
        call(world.app(), activate_request(body.to_string()))
    });

    let responses = futures::future::join_all(requests).await;
    world.responses = responses;
}

#[when(expr = "I look up the record for {string}")]
async fn when_look_up(world: &mut ActivationWorld, iccid: String) {
    world
        .send(get_request(&format!("/api/activations/{}", iccid)))
        .await;
}

#[when("I submit the activation request:")]
async fn when_submit_raw(world: &mut ActivationWorld, step: &Step) {
    let body = step.docstring.clone().expect("Missing request body");
    world.send(activate_request(body)).await;
}

// --- Then steps ---

#[then(expr = "the response status is {int}")]
async fn then_status(world: &mut ActivationWorld, status: u16) {
    assert_eq!(world.last().status.as_u16(), status);
}

#[then(expr = "the response body is {string}")]
async fn then_body(world: &mut ActivationWorld, body: String) {
    assert_eq!(world.last().body, body);
}

#[then(expr = "every response body is {string}")]
async fn then_every_body(world: &mut ActivationWorld, body: String) {
    assert!(!world.responses.is_empty());
    for captured in &world.responses {
        assert_eq!(captured.status, StatusCode::OK);
        assert_eq!(captured.body, body);
    }
}

#[then(expr = "the actuator received {int} request(s) for {string}")]
async fn then_actuator_received(world: &mut ActivationWorld, count: usize, iccid: String) {
    assert_eq!(world.stub.requests_for(&iccid).await, count);
}

#[then(expr = "exactly one record exists for {string}")]
async fn then_one_record(world: &mut ActivationWorld, iccid: String) {
    let all = world.listed("/api/activations").await;
    assert_eq!(all.iter().filter(|i| **i == iccid).count(), 1);
}

#[then(regex = r#"^the record for "([^"]*)" is (active|inactive)$"#)]
async fn then_record_state(world: &mut ActivationWorld, iccid: String, state: String) {
    assert_eq!(world.record(&iccid).await.active, state == "active");
}

#[then(expr = "the record for {string} is requested by {string}")]
async fn then_record_requester(world: &mut ActivationWorld, iccid: String, requester: String) {
    assert_eq!(world.record(&iccid).await.customer_email, requester);
}

#[then(expr = "the record for {string} has a diagnostic starting with {string}")]
async fn then_diagnostic_prefix(world: &mut ActivationWorld, iccid: String, prefix: String) {
    let record = world.record(&iccid).await;
    assert!(
        record.actuator_response.starts_with(&prefix),
        "Diagnostic {:?} does not start with {:?}",
        record.actuator_response,
        prefix
    );
    assert!(record.actuator_response.len() > prefix.len());
}

#[then(regex = r#"^the record for "([^"]*)" has diagnostic '([^']*)'$"#)]
async fn then_diagnostic(world: &mut ActivationWorld, iccid: String, diagnostic: String) {
    assert_eq!(world.record(&iccid).await.actuator_response, diagnostic);
}

#[then(regex = r#"^the (successful|failed) records are "([^"]*)"$"#)]
async fn then_partition(world: &mut ActivationWorld, outcome: String, expected: String) {
    let listed = world
        .listed(&format!("/api/activations/{}", outcome))
        .await;
    assert_eq!(listed, iccid_list(&expected));
}

#[then(expr = "all records are {string}")]
async fn then_all_records(world: &mut ActivationWorld, expected: String) {
    assert_eq!(world.listed("/api/activations").await, iccid_list(&expected));
}

#[then(expr = "the status of {string} is {string}")]
async fn then_status_of(world: &mut ActivationWorld, iccid: String, status: String) {
    let view: StatusView = world
        .get_json(&format!("/api/activations/{}/status", iccid))
        .await;
    assert_eq!(view.iccid, iccid);
    assert_eq!(view.status.as_str(), status);
}
