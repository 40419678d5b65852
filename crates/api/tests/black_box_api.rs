use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use medthing_ai::{ContentGenerator, ProviderError, ScriptedGenerator};
use medthing_api::app::{self, AppServices};
use medthing_auth::JwtClaims;
use medthing_core::{DoctorId, Patient};
use medthing_infra::RateLimitConfig;
use medthing_infra::jobs::InMemoryReportStore;
use medthing_infra::records::InMemoryPatientDirectory;

const JWT_SECRET: &str = "test-secret";

const REPLY: &str = r#"```json
{
  "summary": "Overall stable.",
  "sections": [{"title": "Vitals", "content": "<p>Normal</p>"}],
  "recommendations": ["Keep walking daily"]
}
```"#;

struct TestServer {
    base_url: String,
    directory: Arc<InMemoryPatientDirectory>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(generator: Arc<dyn ContentGenerator>, rate_limit: RateLimitConfig) -> Self {
        let directory = InMemoryPatientDirectory::arc();
        let services = AppServices::new(
            InMemoryReportStore::arc(),
            directory.clone(),
            generator,
            rate_limit,
        );
        // Same router as prod, bound to an ephemeral port.
        let app = app::build_app(JWT_SECRET, Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .unwrap();
        });

        Self {
            base_url,
            directory,
            handle,
        }
    }

    async fn replying(text: &str) -> Self {
        Self::spawn(
            Arc::new(ScriptedGenerator::replying_text(text)),
            RateLimitConfig::default(),
        )
        .await
    }

    fn patient(&self, name: &str, dob: &str) -> Patient {
        let patient = Patient::new(name, dob).with_gender("female");
        self.directory.insert_patient(patient.clone()).unwrap();
        patient
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, ttl: ChronoDuration) -> String {
    mint_jwt_at(secret, Utc::now(), ttl)
}

fn mint_jwt_at(secret: &str, issued_at: DateTime<Utc>, ttl: ChronoDuration) -> String {
    let claims = JwtClaims::new(DoctorId::new(), issued_at, ttl);
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn token() -> String {
    mint_jwt(JWT_SECRET, ChronoDuration::minutes(10))
}

async fn submit(client: &reqwest::Client, srv: &TestServer, body: serde_json::Value) -> reqwest::Response {
    client
        .post(format!("{}/api/reports", srv.base_url))
        .bearer_auth(token())
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn get_report(client: &reqwest::Client, srv: &TestServer, id: &str) -> reqwest::Response {
    client
        .get(format!("{}/api/reports/{}", srv.base_url, id))
        .bearer_auth(token())
        .send()
        .await
        .unwrap()
}

/// Poll until the report leaves `processing`.
async fn terminal_report(client: &reqwest::Client, srv: &TestServer, id: &str) -> serde_json::Value {
    for _ in 0..100 {
        let body: serde_json::Value = get_report(client, srv, id).await.json().await.unwrap();
        if body["data"]["status"] != "processing" {
            return body["data"].clone();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("report {id} did not reach a terminal state");
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::replying("{}").await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "MedThing API is up and running");
}

#[tokio::test]
async fn auth_required_for_report_endpoints() {
    let srv = TestServer::replying("{}").await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/reports", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    // Well-formed window that closed an hour ago.
    let expired = mint_jwt_at(
        JWT_SECRET,
        Utc::now() - ChronoDuration::hours(2),
        ChronoDuration::hours(1),
    );
    let res = client
        .get(format!("{}/api/reports", srv.base_url))
        .bearer_auth(expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let forged = mint_jwt("other-secret", ChronoDuration::minutes(10));
    let res = client
        .get(format!("{}/api/reports", srv.base_url))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn report_lifecycle_submit_poll_complete() {
    let srv = TestServer::replying(REPLY).await;
    let patient = srv.patient("Ada", "1990-01-02");
    let client = reqwest::Client::new();

    let res = submit(&client, &srv, json!({ "patientId": patient.id.to_string() })).await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!(created["message"], "Report generation started");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let report = terminal_report(&client, &srv, &id).await;
    assert_eq!(report["status"], "completed");
    assert_eq!(report["id"], id);
    assert_eq!(report["patientName"], "Ada");
    assert_eq!(report["reportType"], "Comprehensive Health Assessment");
    assert_eq!(report["summary"], "Overall stable.");
    assert_eq!(report["sections"][0]["title"], "Vitals");
    assert_eq!(report["sections"][0]["content"], "<p>Normal</p>");
    assert_eq!(report["recommendations"], json!(["Keep walking daily"]));
    assert_eq!(report["patientInfo"]["gender"], "female");
    assert_eq!(report["patientInfo"]["dateOfBirth"], "1990-01-02");
    assert!(report["patientInfo"]["age"].as_i64().unwrap() >= 34);
}

#[tokio::test]
async fn provider_failure_surfaces_as_failed_report() {
    let srv = TestServer::spawn(
        Arc::new(ScriptedGenerator::failing(ProviderError::NotConfigured)),
        RateLimitConfig::default(),
    )
    .await;
    let patient = srv.patient("Bob", "1970-10-10");
    let client = reqwest::Client::new();

    let created: serde_json::Value = submit(&client, &srv, json!({ "patientId": patient.id.to_string() }))
        .await
        .json()
        .await
        .unwrap();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let report = terminal_report(&client, &srv, &id).await;
    assert_eq!(report["status"], "failed");
    assert_eq!(report["summary"], "api key not configured");
    assert_eq!(report["sections"], json!([]));
    assert_eq!(report["recommendations"], json!([]));
}

#[tokio::test]
async fn bad_submissions_are_rejected() {
    let srv = TestServer::replying("{}").await;
    let client = reqwest::Client::new();

    let res = submit(&client, &srv, json!({ "patientId": uuid::Uuid::now_v7().to_string() })).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = submit(&client, &srv, json!({ "patientId": "42" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = submit(&client, &srv, json!({ "nope": true })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_and_malformed_report_ids() {
    let srv = TestServer::replying("{}").await;
    let client = reqwest::Client::new();

    let res = get_report(&client, &srv, &uuid::Uuid::now_v7().to_string()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = get_report(&client, &srv, "not-a-uuid").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submissions_are_rate_limited_per_client() {
    let srv = TestServer::spawn(
        Arc::new(ScriptedGenerator::replying_text("{}")),
        RateLimitConfig {
            max: 2,
            window: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
        },
    )
    .await;
    let patient = srv.patient("Cy", "2001-05-05");
    let client = reqwest::Client::new();
    let body = json!({ "patientId": patient.id.to_string() });

    assert_eq!(submit(&client, &srv, body.clone()).await.status(), StatusCode::ACCEPTED);
    assert_eq!(submit(&client, &srv, body.clone()).await.status(), StatusCode::ACCEPTED);

    let denied = submit(&client, &srv, body).await;
    assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);
    let denied: serde_json::Value = denied.json().await.unwrap();
    assert_eq!(denied["error"], "rate_limited");
    assert_eq!(denied["message"], "Too many requests, please try again later");

    // Reads are not rate limited.
    let res = client
        .get(format!("{}/api/reports", srv.base_url))
        .bearer_auth(token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed["data"].as_array().unwrap().len(), 2);
}
