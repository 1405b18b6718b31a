//! Worker dispatch — the request/response contract a host uses to drive an
//! engine from another thread or process.
//!
//! RULES:
//!   - Every response, including intermediate progress, echoes the request id.
//!   - Requests are handled one at a time; the engine is never shared.
//!   - A failed request yields one `error` response; the worker keeps running.
//!
//! Wire form is one JSON object per message, tagged by `type`:
//!   {"id":"a1","type":"run_years","years":10,"progress_every":1}
//!   {"id":"a1","type":"progress","completed":1,"total":10}

use crate::{
    advisor::Recommendation,
    axis::Investments,
    config::{self, PolicyParams},
    engine::{HistoryEntry, RunSummary, SimEngine, SimState},
    error::SimResult,
    monte_carlo::{self, McProgress, MonteCarloConfig, MonteCarloResult},
    snapshot::Snapshot,
    types::Seed,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    #[serde(default = "new_request_id")]
    pub id:   String,
    #[serde(flatten)]
    pub kind: RequestKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestKind {
    Step,
    RunYears {
        years:          u32,
        #[serde(default)]
        progress_every: u32,
    },
    MonteCarlo {
        iterations:     usize,
        years:          u32,
        /// Defaults to the engine's seed.
        #[serde(default)]
        base_seed:      Option<Seed>,
        #[serde(default)]
        progress_every: usize,
    },
    Reset,
    GetState,
    SetInvestments {
        investments: Investments,
    },
    SetPolicy {
        policy: PolicyParams,
    },
    Recommend,
    ExportSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub id:   String,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBody {
    Progress { completed: u64, total: u64 },
    Step { entry: HistoryEntry },
    RunComplete { summary: RunSummary, latest: Option<HistoryEntry> },
    MonteCarloComplete { result: MonteCarloResult },
    ResetComplete { entry: HistoryEntry },
    State { state: SimState },
    Updated,
    Recommendation { recommendation: Recommendation },
    Snapshot { snapshot: Snapshot },
    Error { message: String },
}

pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl WorkerRequest {
    pub fn new(kind: RequestKind) -> Self {
        Self { id: new_request_id(), kind }
    }
}

pub struct Worker {
    engine: SimEngine,
}

impl Worker {
    pub fn new(engine: SimEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &SimEngine {
        &self.engine
    }

    pub fn into_engine(self) -> SimEngine {
        self.engine
    }

    /// Parse one JSON line and handle it. A malformed line produces an
    /// `error` response carrying whatever id could be recovered.
    pub fn handle_json(&mut self, line: &str, emit: &mut dyn FnMut(WorkerResponse)) {
        match serde_json::from_str::<WorkerRequest>(line) {
            Ok(request) => self.handle(request, emit),
            Err(e) => {
                let id = serde_json::from_str::<Value>(line)
                    .ok()
                    .and_then(|v| v.get("id").and_then(Value::as_str).map(str::to_string))
                    .unwrap_or_default();
                log::warn!("rejected worker request: {e}");
                emit(WorkerResponse { id, body: ResponseBody::Error { message: e.to_string() } });
            }
        }
    }

    /// Process one request synchronously, emitting zero or more progress
    /// responses followed by exactly one final response.
    pub fn handle(&mut self, request: WorkerRequest, emit: &mut dyn FnMut(WorkerResponse)) {
        let id = request.id;
        let body = match self.dispatch(&id, request.kind, emit) {
            Ok(body) => body,
            Err(e) => {
                log::warn!("worker request {id} failed: {e}");
                ResponseBody::Error { message: e.to_string() }
            }
        };
        emit(WorkerResponse { id, body });
    }

    fn dispatch(
        &mut self,
        id: &str,
        kind: RequestKind,
        emit: &mut dyn FnMut(WorkerResponse),
    ) -> SimResult<ResponseBody> {
        Ok(match kind {
            RequestKind::Step => ResponseBody::Step { entry: self.engine.simulate_year() },

            RequestKind::RunYears { years, progress_every } => {
                let summary = self.engine.simulate_years_with_progress(years, progress_every, |p| {
                    emit(WorkerResponse {
                        id:   id.to_string(),
                        body: ResponseBody::Progress {
                            completed: p.completed as u64,
                            total:     p.total as u64,
                        },
                    });
                });
                ResponseBody::RunComplete { summary, latest: self.engine.latest() }
            }

            RequestKind::MonteCarlo { iterations, years, base_seed, progress_every } => {
                let mc = MonteCarloConfig {
                    iterations,
                    years,
                    base_seed: base_seed.unwrap_or(self.engine.config().seed),
                    progress_every,
                };
                let result = self.run_monte_carlo(id, mc, emit)?;
                ResponseBody::MonteCarloComplete { result }
            }

            RequestKind::Reset => ResponseBody::ResetComplete { entry: self.engine.reset() },

            RequestKind::GetState => ResponseBody::State { state: self.engine.state() },

            RequestKind::SetInvestments { investments } => {
                config::validate_investments(&investments)?;
                self.engine.set_investments(investments);
                ResponseBody::Updated
            }

            RequestKind::SetPolicy { policy } => {
                config::validate_policy(&policy)?;
                self.engine.set_policy_params(policy);
                ResponseBody::Updated
            }

            RequestKind::Recommend => {
                ResponseBody::Recommendation { recommendation: self.engine.recommend() }
            }

            RequestKind::ExportSnapshot => {
                ResponseBody::Snapshot { snapshot: self.engine.export_snapshot()? }
            }
        })
    }

    /// Monte Carlo from the engine's current investments and policy.
    /// Runs execute on the rayon pool; progress is forwarded back to this
    /// thread over a channel so `emit` never leaves it.
    fn run_monte_carlo(
        &self,
        id: &str,
        mc: MonteCarloConfig,
        emit: &mut dyn FnMut(WorkerResponse),
    ) -> SimResult<MonteCarloResult> {
        let state = self.engine.state();
        let base = config::SimConfig {
            investments: state.investments,
            policy: state.policy,
            ..self.engine.config()
        };
        let (tx, rx) = crossbeam_channel::unbounded::<McProgress>();

        std::thread::scope(|scope| {
            let base = &base;
            let runner = scope.spawn(move || {
                let notify = move |p: McProgress| {
                    let _ = tx.send(p);
                };
                monte_carlo::run(base, &mc, Some(&notify))
            });

            for p in rx.iter() {
                emit(WorkerResponse {
                    id:   id.to_string(),
                    body: ResponseBody::Progress {
                        completed: p.completed as u64,
                        total:     p.total as u64,
                    },
                });
            }

            runner
                .join()
                .unwrap_or_else(|_| Err(anyhow::anyhow!("monte carlo worker panicked").into()))
        })
    }
}
