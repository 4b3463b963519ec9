/// Integration tests for the risk assessment flow.
///
/// These drive `AssessmentFlow` through a real `Gateway` wrapped around a
/// scripted transport, covering the full submit/reset lifecycle: remote
/// results, the glucose fallback, transport failures and panics.
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use glycowise::assessment::{
    AssessmentFlow, FlowState, GENERIC_ERROR, Gender, Metric, Prediction, ResultSource, RiskLevel,
};
use glycowise::gateway::{CompletionRequest, CompletionTransport, Gateway, GatewayError};

/// Replays queued replies in order; an exhausted script is a transport error.
struct Scripted {
    replies: Mutex<Vec<Result<String, GatewayError>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Scripted {
    fn new(mut replies: Vec<Result<String, GatewayError>>) -> Self {
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            prompts: Arc::default(),
        }
    }
}

impl CompletionTransport for Scripted {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, GatewayError> {
        self.prompts.lock().unwrap().push(request.user.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(GatewayError::Transport("script exhausted".to_string())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

struct Panicking;

impl CompletionTransport for Panicking {
    fn complete(&self, _request: &CompletionRequest<'_>) -> Result<String, GatewayError> {
        panic!("transport blew up");
    }

    fn model_name(&self) -> &str {
        "panicking"
    }
}

fn ok(text: &str) -> Result<String, GatewayError> {
    Ok(text.to_string())
}

#[test]
fn remote_result_is_shown_as_returned() {
    let gateway = Gateway::new(Scripted::new(vec![ok(
        "```json\n{\"prediction\": \"Diabetic\", \"probability\": 0.68, \"risk\": \"moderate\"}\n```",
    )]));
    let mut flow = AssessmentFlow::new();
    flow.set(Metric::Glucose, 155.0);

    let state = flow.submit(&gateway);
    let FlowState::Succeeded(assessment) = state else {
        panic!("expected success, got {state:?}");
    };
    assert_eq!(assessment.source, ResultSource::Remote);
    assert_eq!(assessment.result.prediction, Prediction::Diabetic);
    assert_eq!(assessment.result.risk, RiskLevel::Moderate);
    assert_eq!(assessment.result.probability_pct(), 68);
    assert!(!flow.is_submitting());
}

#[test]
fn unusable_reply_uses_glucose_fallback() {
    let gateway = Gateway::new(Scripted::new(vec![
        ok("Sorry, I cannot help with that."),
        ok("{\"prediction\": \"Maybe\"}"),
    ]));

    let mut flow = AssessmentFlow::new();
    flow.set(Metric::Glucose, 145.0);
    let high = flow.submit(&gateway).clone();
    assert_eq!(
        high,
        FlowState::Succeeded(glycowise::assessment::Assessment {
            result: glycowise::assessment::PredictionResult {
                prediction: Prediction::Diabetic,
                probability: 0.75,
                risk: RiskLevel::High,
            },
            source: ResultSource::Fallback,
        })
    );

    flow.reset();
    flow.set(Metric::Glucose, 100.0);
    assert!(flow.assessment().is_none());
    let FlowState::Succeeded(assessment) = flow.submit(&gateway) else {
        panic!("fallback must succeed");
    };
    assert_eq!(assessment.result.prediction, Prediction::NonDiabetic);
    assert_eq!(assessment.result.probability, 0.25);
    assert_eq!(assessment.result.risk, RiskLevel::Low);
}

#[test]
fn transport_failure_shows_generic_message() {
    let gateway = Gateway::new(Scripted::new(vec![Err(GatewayError::Status {
        status: 500,
        body: "internal".to_string(),
    })]));
    let mut flow = AssessmentFlow::new();

    assert_eq!(
        flow.submit(&gateway),
        &FlowState::Failed(GENERIC_ERROR.to_string())
    );
    assert!(!flow.is_submitting());
    assert!(flow.assessment().is_none());
}

#[test]
fn panic_in_transport_leaves_submitting_state() {
    let gateway = Gateway::new(Panicking);
    let mut flow = AssessmentFlow::new();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        flow.submit(&gateway);
    }));
    assert!(outcome.is_err());
    assert!(!flow.is_submitting());
    assert_eq!(flow.state(), &FlowState::Failed(GENERIC_ERROR.to_string()));
}

#[test]
fn reset_keeps_field_values_and_resubmits_them() {
    let transport = Scripted::new(vec![
        ok("{\"prediction\": \"Non-Diabetic\", \"probability\": 0.2, \"risk\": \"low\"}"),
        ok("{\"prediction\": \"Non-Diabetic\", \"probability\": 0.2, \"risk\": \"low\"}"),
    ]);
    let gateway = Gateway::new(transport);

    let mut flow = AssessmentFlow::new();
    flow.set(Metric::Bmi, 31.25);
    flow.set(Metric::Age, 52.0);
    flow.set_gender(Gender::Male);
    flow.submit(&gateway);
    let before = *flow.metrics();

    flow.reset();
    assert_eq!(flow.state(), &FlowState::Editing);
    assert_eq!(*flow.metrics(), before);
    assert_eq!(flow.metrics().bmi, 31.3);
    assert_eq!(flow.metrics().age, 52.0);
    assert_eq!(flow.metrics().gender, Gender::Male);

    assert!(matches!(flow.submit(&gateway), FlowState::Succeeded(_)));
}

#[test]
fn prompt_carries_every_metric() {
    let transport = Scripted::new(vec![ok("{}")]);
    let prompts = Arc::clone(&transport.prompts);
    let gateway = Gateway::new(transport);

    let mut flow = AssessmentFlow::new();
    flow.set(Metric::Glucose, 133.0);
    flow.set(Metric::BloodPressure, 84.0);
    flow.set(Metric::Insulin, 120.0);
    flow.set(Metric::Pregnancies, 2.0);
    flow.submit(&gateway);

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    for line in [
        "- Gender: female",
        "- Age: 30 years",
        "- Pregnancies: 2",
        "- Glucose Level: 133 mg/dL",
        "- Blood Pressure: 84 mm Hg",
        "- Insulin: 120 mu U/ml",
        "- BMI: 25",
    ] {
        assert!(prompts[0].contains(line), "missing {line:?}");
    }

    // "{}" is unusable, so the fallback applies at 133 mg/dL.
    let assessment = flow.assessment().unwrap();
    assert_eq!(assessment.source, ResultSource::Fallback);
    assert_eq!(assessment.result.prediction, Prediction::NonDiabetic);
}

#[test]
fn out_of_range_input_is_clamped_before_submit() {
    let mut flow = AssessmentFlow::new();
    assert_eq!(flow.set(Metric::Glucose, 900.0), 200.0);
    assert_eq!(flow.set(Metric::Age, -4.0), 18.0);
    assert_eq!(flow.set(Metric::DiabetesPedigree, 0.4567), 0.46);
    assert_eq!(flow.metrics().glucose, 200.0);
}
