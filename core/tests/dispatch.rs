//! Worker contract: id echo on every response, progress, error replies.

use talentsim_core::{
    axis::Investments,
    config::SimConfig,
    dispatch::{RequestKind, ResponseBody, Worker, WorkerRequest, WorkerResponse},
    engine::SimEngine,
};

fn worker() -> Worker {
    let _ = env_logger::builder().is_test(true).try_init();
    Worker::new(SimEngine::new(SimConfig::default_test()).expect("engine"))
}

fn send(worker: &mut Worker, id: &str, kind: RequestKind) -> Vec<WorkerResponse> {
    let mut out = Vec::new();
    worker.handle(WorkerRequest { id: id.into(), kind }, &mut |r| out.push(r));
    out
}

#[test]
fn step_echoes_the_request_id() {
    let mut w = worker();
    let replies = send(&mut w, "step-1", RequestKind::Step);
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].id, "step-1");
    match &replies[0].body {
        ResponseBody::Step { entry } => assert_eq!(entry.year, 1),
        other => panic!("expected step, got {other:?}"),
    }
}

#[test]
fn run_years_streams_progress_then_completes() {
    let mut w = worker();
    let replies = send(&mut w, "run-9", RequestKind::RunYears { years: 3, progress_every: 1 });

    assert_eq!(replies.len(), 4, "Three progress notes plus one completion");
    assert!(replies.iter().all(|r| r.id == "run-9"), "Every reply must carry the request id");
    for (i, r) in replies[..3].iter().enumerate() {
        assert_eq!(r.body, ResponseBody::Progress { completed: i as u64 + 1, total: 3 });
    }
    match &replies[3].body {
        ResponseBody::RunComplete { summary, latest } => {
            assert_eq!(summary.years, 3);
            assert_eq!(latest.as_ref().map(|e| e.year), Some(3));
        }
        other => panic!("expected run_complete, got {other:?}"),
    }
}

#[test]
fn monte_carlo_progress_is_forwarded_with_the_id() {
    let mut w = worker();
    let replies = send(
        &mut w,
        "mc-1",
        RequestKind::MonteCarlo { iterations: 5, years: 2, base_seed: Some(9), progress_every: 1 },
    );

    assert!(replies.iter().all(|r| r.id == "mc-1"));
    let progress = replies
        .iter()
        .filter(|r| matches!(r.body, ResponseBody::Progress { .. }))
        .count();
    assert_eq!(progress, 5, "One progress note per finished run");
    match &replies.last().expect("final reply").body {
        ResponseBody::MonteCarloComplete { result } => assert_eq!(result.samples.len(), 5),
        other => panic!("expected monte_carlo_complete, got {other:?}"),
    }
    assert_eq!(w.engine().year(), 0, "Monte Carlo must not advance the worker's engine");
}

#[test]
fn reset_returns_year_zero() {
    let mut w = worker();
    send(&mut w, "a", RequestKind::RunYears { years: 4, progress_every: 0 });
    let replies = send(&mut w, "b", RequestKind::Reset);
    match &replies[0].body {
        ResponseBody::ResetComplete { entry } => assert_eq!(entry.year, 0),
        other => panic!("expected reset_complete, got {other:?}"),
    }
    assert_eq!(w.engine().history_len(), 1);
}

#[test]
fn invalid_investments_produce_an_error_reply() {
    let mut w = worker();
    let mut bad = Investments::default();
    bad.research = f64::NAN;
    let replies = send(&mut w, "inv", RequestKind::SetInvestments { investments: bad });

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].id, "inv");
    assert!(matches!(replies[0].body, ResponseBody::Error { .. }));
    assert_eq!(w.engine().state().investments, Investments::default(), "Rejected allocation must not apply");
}

#[test]
fn json_lines_round_trip_through_the_wire_format() {
    let mut w = worker();
    let mut out = Vec::new();
    w.handle_json(r#"{"id":"w1","type":"run_years","years":2,"progress_every":1}"#, &mut |r| out.push(r));

    assert_eq!(out.len(), 3);
    let line = serde_json::to_string(&out[0]).expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&line).expect("parse");
    assert_eq!(value["id"], "w1");
    assert_eq!(value["type"], "progress");
    assert_eq!(value["completed"], 1);
}

#[test]
fn malformed_request_keeps_the_id_when_possible() {
    let mut w = worker();
    let mut out = Vec::new();
    w.handle_json(r#"{"id":"oops","type":"fly_to_moon"}"#, &mut |r| out.push(r));

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "oops");
    assert!(matches!(out[0].body, ResponseBody::Error { .. }));
}

#[test]
fn missing_id_gets_a_generated_one() {
    let request: WorkerRequest = serde_json::from_str(r#"{"type":"get_state"}"#).expect("parse");
    assert!(!request.id.is_empty());
    assert_eq!(request.kind, RequestKind::GetState);
}
