// SPDX-License-Identifier: MIT

//! Scriptable fakes for `mf-engine`/`mf-scheduler`/`mf-eventbus` tests,
//! exported under `test-support`: one fake per consumed interface, each
//! programmable with scripted responses, injected delay, and injected errors.

use crate::budget::BudgetProvider;
use crate::director::{Director, DirectorError, StartPipelineResult};
use crate::message_client::{CompletionRequest, CompletionResponse, ExecError, MessageClient, StopReason};
use crate::queue_manager::{QueueManager, QueueManagerError};
use async_trait::async_trait;
use mf_core::{BudgetLevel, BudgetState, Goal, GoalId, GoalPlan, Priority, Task};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A scriptable [`MessageClient`]. Each call to `complete` pulls the next
/// scripted response (cycling the last one once exhausted) or returns the
/// injected error, after sleeping `delay` (cancellably, so timeout/retry
/// tests can exercise cancellation mid-call).
pub struct FakeMessageClient {
    responses: Mutex<Vec<CompletionResponse>>,
    call_count: AtomicUsize,
    max_in_flight: AtomicUsize,
    in_flight: AtomicUsize,
    delay: Duration,
    fail_with: Mutex<Option<ExecError>>,
    fail_calls: Mutex<Vec<usize>>,
}

impl FakeMessageClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(vec![CompletionResponse {
                content: "ok".to_string(),
                input_tokens: 100,
                output_tokens: 200,
                stop_reason: StopReason::EndTurn,
            }]),
            call_count: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            delay: Duration::from_millis(0),
            fail_with: Mutex::new(None),
            fail_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_responses(responses: Vec<CompletionResponse>) -> Self {
        let fake = Self::new();
        *fake.responses.lock() = responses;
        fake
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail every call from now on with `error` (used to test the retry
    /// loop and the non-retryable short-circuit).
    pub fn fail_always(&self, error: ExecError) {
        *self.fail_with.lock() = Some(error);
    }

    /// Fail only the given (0-indexed) call numbers, succeeding otherwise —
    /// used to exercise "succeeds on the Nth retry".
    pub fn fail_on_calls(&self, calls: Vec<usize>) {
        *self.fail_calls.lock() = calls;
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for FakeMessageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageClient for FakeMessageClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ExecError> {
        let call_index = self.call_count.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let result = async {
            if !self.delay.is_zero() {
                match &request.cancel {
                    Some(cancel) => {
                        if cancel.sleep(self.delay).await.is_err() {
                            return Err(ExecError::Aborted);
                        }
                    }
                    None => tokio::time::sleep(self.delay).await,
                }
            }

            if let Some(cancel) = &request.cancel {
                if cancel.is_cancelled() {
                    return Err(ExecError::Aborted);
                }
            }

            if self.fail_calls.lock().contains(&call_index) {
                return Err(self.fail_with.lock().clone().unwrap_or(ExecError::ApiError("scripted failure".into())));
            }
            if let Some(err) = self.fail_with.lock().clone() {
                return Err(err);
            }

            let responses = self.responses.lock();
            let idx = call_index.min(responses.len().saturating_sub(1));
            Ok(responses[idx].clone())
        }
        .await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// A scriptable [`Director`]. Returns a fixed single-sequential-step
/// pipeline by default; override per-test via the constructor fields.
pub struct FakeDirector {
    pub next_result: Mutex<Option<Result<StartPipelineResult, DirectorError>>>,
    pub start_pipeline_calls: Mutex<Vec<(String, String, Priority)>>,
}

impl FakeDirector {
    pub fn new() -> Self {
        Self { next_result: Mutex::new(None), start_pipeline_calls: Mutex::new(Vec::new()) }
    }

    pub fn queue_result(&self, result: Result<StartPipelineResult, DirectorError>) {
        *self.next_result.lock() = Some(result);
    }
}

impl Default for FakeDirector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Director for FakeDirector {
    async fn start_pipeline(
        &self,
        template_name: &str,
        description: &str,
        priority: Priority,
    ) -> Result<StartPipelineResult, DirectorError> {
        self.start_pipeline_calls.lock().push((template_name.to_string(), description.to_string(), priority));
        self.next_result.lock().take().unwrap_or_else(|| Err(DirectorError::UnknownTemplate(template_name.to_string())))
    }

    async fn create_goal(
        &self,
        description: &str,
        category: &str,
        priority: Option<Priority>,
    ) -> Result<Goal, DirectorError> {
        Ok(Goal {
            id: GoalId::new(),
            description: description.to_string(),
            category: category.to_string(),
            priority: priority.unwrap_or(Priority::P2),
            created_at_ms: 0,
        })
    }

    async fn decompose_goal(&self, goal: &Goal) -> Result<GoalPlan, DirectorError> {
        Ok(GoalPlan { goal_id: goal.id, phases: Vec::new() })
    }

    async fn plan_goal_tasks(&self, _plan: &GoalPlan, _goal: &Goal) -> Result<Vec<Task>, DirectorError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct FakeQueueManager {
    pub enqueued: Mutex<Vec<Task>>,
    pub fail: Mutex<bool>,
}

impl FakeQueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self) {
        *self.fail.lock() = true;
    }
}

#[async_trait]
impl QueueManager for FakeQueueManager {
    async fn enqueue_batch(&self, tasks: &[Task]) -> Result<(), QueueManagerError> {
        if *self.fail.lock() {
            *self.fail.lock() = false;
            return Err(QueueManagerError("fake enqueue failure".into()));
        }
        self.enqueued.lock().extend_from_slice(tasks);
        Ok(())
    }
}

/// A [`BudgetProvider`] fixed to whatever [`BudgetState`] was last set —
/// `Arc<Mutex<..>>`-backed so a test can flip budget levels mid-run.
#[derive(Clone)]
pub struct FakeBudgetProvider {
    state: Arc<Mutex<BudgetState>>,
}

impl FakeBudgetProvider {
    pub fn always_normal() -> Self {
        Self::new(BudgetState {
            total_budget: 1000.0,
            spent: 0.0,
            percent_used: 0.0,
            level: BudgetLevel::Normal,
            allowed_priorities: vec![Priority::P0, Priority::P1, Priority::P2, Priority::P3],
            model_override: None,
        })
    }

    pub fn new(state: BudgetState) -> Self {
        Self { state: Arc::new(Mutex::new(state)) }
    }

    pub fn set(&self, state: BudgetState) {
        *self.state.lock() = state;
    }
}

impl BudgetProvider for FakeBudgetProvider {
    fn current(&self) -> BudgetState {
        self.state.lock().clone()
    }
}
