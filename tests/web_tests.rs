/// Integration tests for the web server.
///
/// Each test binds a server on `127.0.0.1:0`, runs it on a background thread
/// with a scripted gateway, and talks to it over HTTP with `ureq`.
use std::thread;

use glycowise::catalog::Catalog;
use glycowise::config::GlycowiseConfig;
use glycowise::gateway::{CompletionRequest, CompletionTransport, Gateway, GatewayError, Topic};
use glycowise::web::{self, AppState};
use serde_json::{Value, json};
use tiny_http::Server;

/// Replies by system instruction: risk requests get `risk_reply`, advice
/// requests echo the question.
struct Stub {
    risk_reply: Result<&'static str, u16>,
}

impl CompletionTransport for Stub {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, GatewayError> {
        if request.system == Topic::Diet.system_instruction()
            || request.system == Topic::Exercise.system_instruction()
        {
            return Ok(format!("advice for: {}", request.user));
        }
        match self.risk_reply {
            Ok(text) => Ok(text.to_string()),
            Err(status) => Err(GatewayError::Status {
                status,
                body: String::new(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Start a server and return its base URL.
fn start(risk_reply: Result<&'static str, u16>) -> String {
    start_with_workers(risk_reply, 4)
}

fn start_with_workers(risk_reply: Result<&'static str, u16>, workers: usize) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let state = AppState::new(
        Gateway::new(Stub { risk_reply }),
        Catalog::builtin().unwrap(),
        GlycowiseConfig::default(),
    );
    thread::spawn(move || web::run(server, state, workers));
    format!("http://127.0.0.1:{port}")
}

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new().redirects(0).build()
}

fn get_json(base: &str, path: &str) -> Value {
    agent()
        .get(&format!("{base}{path}"))
        .call()
        .unwrap()
        .into_json()
        .unwrap()
}

/// POST a JSON body; returns status and parsed body for both success and
/// error responses.
fn post_json(base: &str, path: &str, body: &Value) -> (u16, Value) {
    let result = agent().post(&format!("{base}{path}")).send_json(body);
    let resp = match result {
        Ok(resp) => resp,
        Err(ureq::Error::Status(_, resp)) => resp,
        Err(e) => panic!("request failed: {e}"),
    };
    (resp.status(), resp.into_json().unwrap())
}

fn status_of(base: &str, path: &str) -> u16 {
    match agent().get(&format!("{base}{path}")).call() {
        Ok(resp) => resp.status(),
        Err(ureq::Error::Status(status, _)) => status,
        Err(e) => panic!("request failed: {e}"),
    }
}

#[test]
fn pages_are_html() {
    let base = start(Ok("{}"));
    for path in ["/", "/predict", "/diet", "/exercise", "/diet/keto"] {
        let resp = agent().get(&format!("{base}{path}")).call().unwrap();
        assert_eq!(resp.status(), 200);
        assert!(resp.content_type().starts_with("text/html"), "{path}");
    }
}

#[test]
fn unknown_plan_page_redirects_to_list() {
    let base = start(Ok("{}"));
    let resp = agent().get(&format!("{base}/exercise/couch")).call().unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.header("Location"), Some("/exercise"));
}

#[test]
fn diet_list_applies_query_filters() {
    let base = start(Ok("{}"));
    let body = get_json(&base, "/api/diet?tag=heart-healthy");
    let ids: Vec<&str> = body["plans"]
        .as_array()
        .unwrap()
        .iter()
        .map(|plan| plan["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["mediterranean", "dash"]);
    assert_eq!(body["tag_filters"].as_array().unwrap().len(), 6);

    let body = get_json(&base, "/api/diet?q=keto");
    assert_eq!(body["plans"].as_array().unwrap().len(), 1);
}

#[test]
fn exercise_list_reports_facets() {
    let base = start(Ok("{}"));
    let body = get_json(&base, "/api/exercise?level=Advanced");
    assert_eq!(body["plans"][0]["id"], "hiit");
    assert_eq!(body["plans"].as_array().unwrap().len(), 1);
    assert_eq!(body["levels"], json!(["Beginner", "Intermediate", "Advanced"]));
    assert_eq!(body["categories"], json!(["Cardio", "Strength", "Flexibility"]));
}

#[test]
fn plan_detail_and_missing_plan() {
    let base = start(Ok("{}"));
    let body = get_json(&base, "/api/diet/low-carb");
    assert_eq!(body["meal_plan"][0]["day"], "Monday");
    assert_eq!(status_of(&base, "/api/diet/nope"), 404);
    assert_eq!(status_of(&base, "/api/nothing-here"), 404);
}

#[test]
fn form_exposes_ranges_and_defaults() {
    let base = start(Ok("{}"));
    let body = get_json(&base, "/api/form");
    assert_eq!(body["metrics"].as_array().unwrap().len(), 8);
    assert_eq!(body["metrics"][0]["metric"], "glucose");
    assert_eq!(body["defaults"]["glucose"], 120.0);
    assert_eq!(body["defaults"]["gender"], "female");
}

#[test]
fn predict_returns_remote_assessment() {
    let base = start(Ok(
        r#"{"prediction": "Non-Diabetic", "probability": 0.18, "risk": "low"}"#,
    ));
    let (status, body) = post_json(&base, "/api/predict", &json!({"glucose": 99, "bmi": 22.4}));
    assert_eq!(status, 200);
    assert_eq!(body["prediction"], "Non-Diabetic");
    assert_eq!(body["probability_pct"], 18);
    assert_eq!(body["risk"], "low");
    assert_eq!(body["source"], "remote");
    assert_eq!(body["metrics"]["glucose"], 99.0);
    assert_eq!(body["next_steps"].as_array().unwrap().len(), 4);
}

#[test]
fn predict_falls_back_and_clamps() {
    let base = start(Ok("no idea"));
    let (status, body) = post_json(&base, "/api/predict", &json!({"glucose": 500}));
    assert_eq!(status, 200);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["prediction"], "Diabetic");
    assert_eq!(body["probability"], 0.75);
    assert_eq!(body["metrics"]["glucose"], 200.0);
}

#[test]
fn predict_transport_failure_is_generic_502() {
    let base = start(Err(500));
    let (status, body) = post_json(&base, "/api/predict", &json!({}));
    assert_eq!(status, 502);
    assert_eq!(
        body["error"],
        "An error occurred while processing your request. Please try again."
    );
}

#[test]
fn chat_endpoints_answer_per_topic() {
    let base = start(Ok("{}"));
    let (status, body) = post_json(&base, "/api/chat/diet", &json!({"message": "low GI foods?"}));
    assert_eq!(status, 200);
    assert_eq!(body["reply"], "advice for: low GI foods?");

    let (status, _) = post_json(&base, "/api/chat/exercise", &json!({"message": "  "}));
    assert_eq!(status, 400);
}

#[test]
fn health_reports_catalog_counts() {
    let base = start(Ok("{}"));
    let body = get_json(&base, "/api/health");
    assert_eq!(body["model"], "stub");
    assert_eq!(body["diet_plans"], 6);
    assert_eq!(body["exercise_plans"], 6);
}

#[test]
fn chat_seed_serves_topic_greeting_and_apology() {
    let base = start(Ok("{}"));
    let body = get_json(&base, "/api/chat/exercise");
    assert_eq!(body["topic"], "exercise");
    assert_eq!(body["greeting"], Topic::Exercise.greeting());
    assert_eq!(body["apology"], Topic::Exercise.apology());
}

#[test]
fn unreadable_body_is_400_without_dispatch() {
    let base = start(Ok("{}"));
    let result = agent()
        .post(&format!("{base}/api/chat/diet"))
        .set("Content-Type", "application/json")
        .send_bytes(&[b'{', 0xff, 0xfe, b'}']);
    let resp = match result {
        Err(ureq::Error::Status(_, resp)) => resp,
        other => panic!("expected an error status, got {other:?}"),
    };
    assert_eq!(resp.status(), 400);
    let body: Value = resp.into_json().unwrap();
    assert_eq!(body["error"], "could not read request body");
}

#[test]
fn small_pool_serves_concurrent_clients() {
    let base = start_with_workers(Ok("{}"), 2);
    let clients: Vec<_> = (0..12)
        .map(|n| {
            let base = base.clone();
            thread::spawn(move || {
                post_json(&base, "/api/chat/diet", &json!({"message": format!("question {n}")}))
            })
        })
        .collect();

    for (n, client) in clients.into_iter().enumerate() {
        let (status, body) = client.join().unwrap();
        assert_eq!(status, 200);
        assert_eq!(body["reply"], format!("advice for: question {n}"));
    }
}
