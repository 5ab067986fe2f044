// SPDX-License-Identifier: MIT

//! Pipeline Engine: drives a `PipelineRun` through its
//! `PipelineDefinition.steps`, creating and persisting the task for each
//! sequential/parallel step itself — `mf_adapters::Director` only hands
//! back the run's *initial* activation (see [`mf_adapters::Director::start_pipeline`]);
//! it exposes no per-step task-creation primitive, so steps 2..N are built
//! directly against `mf_core::Task`'s public fields, in the same shape
//! `start_pipeline` itself would produce (see `DESIGN.md`).

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::executor::{AgentExecutor, ExecuteOptions, ExecutionStatus, TokenUsage};
use mf_adapters::skills::squad_for;
use mf_core::{
    CancelToken, Clock, InputRef, OutputSpec, Priority, Task, TaskId, TaskNext, TaskOrigin,
};
use mf_core::{PipelineDefinition, PipelineRun, PipelineRunStatus, PipelineStep};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Failed,
    Paused,
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub step_index: usize,
    pub label: String,
    pub status: StepStatus,
    pub output_paths: Vec<String>,
    pub tokens: TokenUsage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Completed,
    Failed,
    Paused,
    Cancelled,
}

/// Never thrown: every outcome is represented here, and `run` carries the
/// mutated status the caller must persist/inspect.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub status: PipelineStatus,
    pub run: PipelineRun,
    pub step_results: Vec<StepResult>,
    pub tokens_used: TokenUsage,
    pub error: Option<PipelineError>,
}

/// Per-run configuration.
pub struct PipelineRunConfig {
    pub goal_description: String,
    pub priority: Priority,
    pub cancel: Option<CancelToken>,
    pub initial_input_paths: Vec<String>,
    pub max_concurrency: Option<usize>,
    pub on_step_complete: Option<Box<dyn Fn(&StepResult) + Send + Sync>>,
    pub on_status_change: Option<Box<dyn Fn(PipelineRunStatus) + Send + Sync>>,
}

impl Default for PipelineRunConfig {
    fn default() -> Self {
        Self {
            goal_description: String::new(),
            priority: Priority::P2,
            cancel: None,
            initial_input_paths: Vec::new(),
            max_concurrency: None,
            on_step_complete: None,
            on_status_change: None,
        }
    }
}

impl PipelineRunConfig {
    /// Invoke a callback inside a panic-isolation boundary: a
    /// throwing callback never aborts the pipeline.
    fn fire_step_complete(&self, result: &StepResult) {
        if let Some(cb) = &self.on_step_complete {
            let _ = std::panic::catch_unwind(AssertUnwindSafe(|| cb(result)));
        }
    }

    fn fire_status_change(&self, status: PipelineRunStatus) {
        if let Some(cb) = &self.on_status_change {
            let _ = std::panic::catch_unwind(AssertUnwindSafe(|| cb(status)));
        }
    }
}

pub struct PipelineEngine<C: Clock> {
    workspace: mf_workspace::Workspace,
    executor: Arc<AgentExecutor<C>>,
    clock: C,
    config: PipelineConfig,
}

impl<C: Clock> PipelineEngine<C> {
    pub fn new(workspace: mf_workspace::Workspace, executor: Arc<AgentExecutor<C>>, clock: C, config: PipelineConfig) -> Self {
        Self { workspace, executor, clock, config }
    }

    /// Drive `run` through `definition.steps` starting at
    /// `run.current_step_index`.
    pub async fn execute(
        &self,
        definition: &PipelineDefinition,
        mut run: PipelineRun,
        config: PipelineRunConfig,
    ) -> PipelineResult {
        if !matches!(run.status, PipelineRunStatus::Pending | PipelineRunStatus::Paused) {
            return PipelineResult {
                status: PipelineStatus::Failed,
                run,
                step_results: Vec::new(),
                tokens_used: TokenUsage::default(),
                error: Some(PipelineError::AlreadyRunning),
            };
        }

        if definition.steps.is_empty() {
            let now_ms = self.clock.epoch_ms();
            run.status = PipelineRunStatus::Failed;
            run.completed_at_ms = Some(now_ms);
            config.fire_status_change(PipelineRunStatus::Failed);
            return PipelineResult {
                status: PipelineStatus::Failed,
                run,
                step_results: Vec::new(),
                tokens_used: TokenUsage::default(),
                error: Some(PipelineError::NoSteps),
            };
        }

        let cancel = config.cancel.clone().unwrap_or_default();
        if cancel.is_cancelled() {
            let now_ms = self.clock.epoch_ms();
            run.status = PipelineRunStatus::Cancelled;
            run.completed_at_ms = Some(now_ms);
            config.fire_status_change(PipelineRunStatus::Cancelled);
            return PipelineResult {
                status: PipelineStatus::Cancelled,
                run,
                step_results: Vec::new(),
                tokens_used: TokenUsage::default(),
                error: Some(PipelineError::Aborted),
            };
        }

        run.status = PipelineRunStatus::Running;
        config.fire_status_change(PipelineRunStatus::Running);

        // Resuming onto a paused review step: skip past it.
        let mut start_index = run.current_step_index;
        if matches!(definition.steps.get(start_index), Some(PipelineStep::Review { .. })) {
            start_index += 1;
        }

        let max_concurrency = config.max_concurrency.unwrap_or(self.config.default_max_concurrency).max(1);
        let mut current_inputs = config.initial_input_paths.clone();
        let mut step_results = Vec::new();
        let mut total_tokens = TokenUsage::default();
        let last_index = definition.steps.len() - 1;

        for i in start_index..definition.steps.len() {
            if cancel.is_cancelled() {
                let now_ms = self.clock.epoch_ms();
                run.status = PipelineRunStatus::Cancelled;
                run.completed_at_ms = Some(now_ms);
                config.fire_status_change(PipelineRunStatus::Cancelled);
                return PipelineResult {
                    status: PipelineStatus::Cancelled,
                    run,
                    step_results,
                    tokens_used: total_tokens,
                    error: Some(PipelineError::Aborted),
                };
            }

            match &definition.steps[i] {
                PipelineStep::Review { .. } => {
                    run.status = PipelineRunStatus::Paused;
                    run.current_step_index = i;
                    config.fire_status_change(PipelineRunStatus::Paused);
                    return PipelineResult {
                        status: PipelineStatus::Paused,
                        run,
                        step_results,
                        tokens_used: total_tokens,
                        error: Some(PipelineError::PausedForReview),
                    };
                }
                PipelineStep::Sequential { skill } => {
                    let now_ms = self.clock.epoch_ms();
                    let task = self.build_task(skill, &run, i, last_index, &config, &current_inputs, now_ms);
                    run.task_ids.push(task.id.to_string());
                    if let Err(e) = self.workspace.write_task(&task).await {
                        run.status = PipelineRunStatus::Failed;
                        run.completed_at_ms = Some(self.clock.epoch_ms());
                        config.fire_status_change(PipelineRunStatus::Failed);
                        return PipelineResult {
                            status: PipelineStatus::Failed,
                            run,
                            step_results,
                            tokens_used: total_tokens,
                            error: Some(PipelineError::TaskCreationFailed(e.to_string())),
                        };
                    }

                    let exec_result = self
                        .executor
                        .execute(&task, ExecuteOptions { cancel: Some(cancel.clone()), over: Default::default() })
                        .await;
                    let tokens = exec_result.tokens_used;
                    total_tokens.add(tokens);

                    if exec_result.status != ExecutionStatus::Completed {
                        run.status = PipelineRunStatus::Failed;
                        run.completed_at_ms = Some(self.clock.epoch_ms());
                        config.fire_status_change(PipelineRunStatus::Failed);
                        step_results.push(StepResult {
                            step_index: i,
                            label: definition.steps[i].label(),
                            status: StepStatus::Failed,
                            output_paths: Vec::new(),
                            tokens,
                        });
                        return PipelineResult {
                            status: PipelineStatus::Failed,
                            run,
                            step_results,
                            tokens_used: total_tokens,
                            error: Some(PipelineError::StepFailed(definition.steps[i].label())),
                        };
                    }

                    let output_paths = exec_result.output_path.into_iter().collect::<Vec<_>>();
                    current_inputs = output_paths.clone();
                    let step_result =
                        StepResult { step_index: i, label: definition.steps[i].label(), status: StepStatus::Completed, output_paths, tokens };
                    config.fire_step_complete(&step_result);
                    step_results.push(step_result);
                    run.current_step_index = i;
                }
                PipelineStep::Parallel { skills } => {
                    let now_ms = self.clock.epoch_ms();
                    let tasks: Vec<Task> = skills
                        .iter()
                        .map(|skill| self.build_task(skill, &run, i, last_index, &config, &current_inputs, now_ms))
                        .collect();
                    for task in &tasks {
                        run.task_ids.push(task.id.to_string());
                    }
                    for task in &tasks {
                        if let Err(e) = self.workspace.write_task(task).await {
                            run.status = PipelineRunStatus::Failed;
                            run.completed_at_ms = Some(self.clock.epoch_ms());
                            config.fire_status_change(PipelineRunStatus::Failed);
                            return PipelineResult {
                                status: PipelineStatus::Failed,
                                run,
                                step_results,
                                tokens_used: total_tokens,
                                error: Some(PipelineError::TaskCreationFailed(e.to_string())),
                            };
                        }
                    }

                    let outcomes = self.run_parallel(&tasks, max_concurrency, cancel.clone()).await;
                    let any_failed = outcomes.iter().any(|o| !matches!(o, Some(r) if r.status == ExecutionStatus::Completed));

                    let mut tokens = TokenUsage::default();
                    for outcome in &outcomes {
                        if let Some(r) = outcome {
                            tokens.add(r.tokens_used);
                        }
                    }
                    total_tokens.add(tokens);

                    if any_failed {
                        run.status = PipelineRunStatus::Failed;
                        run.completed_at_ms = Some(self.clock.epoch_ms());
                        config.fire_status_change(PipelineRunStatus::Failed);
                        step_results.push(StepResult {
                            step_index: i,
                            label: definition.steps[i].label(),
                            status: StepStatus::Failed,
                            output_paths: Vec::new(),
                            tokens,
                        });
                        return PipelineResult {
                            status: PipelineStatus::Failed,
                            run,
                            step_results,
                            tokens_used: total_tokens,
                            error: Some(PipelineError::StepFailed(definition.steps[i].label())),
                        };
                    }

                    let output_paths: Vec<String> =
                        outcomes.into_iter().flatten().filter_map(|r| r.output_path).collect();
                    current_inputs = output_paths.clone();
                    let step_result =
                        StepResult { step_index: i, label: definition.steps[i].label(), status: StepStatus::Completed, output_paths, tokens };
                    config.fire_step_complete(&step_result);
                    step_results.push(step_result);
                    run.current_step_index = i;
                }
            }
        }

        let now_ms = self.clock.epoch_ms();
        run.status = PipelineRunStatus::Completed;
        run.completed_at_ms = Some(now_ms);
        config.fire_status_change(PipelineRunStatus::Completed);

        PipelineResult { status: PipelineStatus::Completed, run, step_results, tokens_used: total_tokens, error: None }
    }

    /// Run every task in `tasks` under a `max_concurrency` semaphore,
    /// preserving creation order in the returned `Vec`. A sibling
    /// failure cancels every other in-flight/not-yet-started sub-task via
    /// an internal composite handle; those entries come back `None`.
    async fn run_parallel(
        &self,
        tasks: &[Task],
        max_concurrency: usize,
        cancel: CancelToken,
    ) -> Vec<Option<crate::executor::ExecutionResult>> {
        let semaphore = Arc::new(Semaphore::new(max_concurrency));
        let internal_cancel = CancelToken::new();
        let combined = CancelToken::any_of([cancel, internal_cancel.clone()]);

        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let executor = self.executor.clone();
            let task = task.clone();
            let semaphore = semaphore.clone();
            let combined = combined.clone();
            let internal_cancel = internal_cancel.clone();
            handles.push(tokio::spawn(async move {
                let permit = tokio::select! {
                    permit = semaphore.acquire_owned() => permit.ok(),
                    _ = combined.cancelled() => None,
                };
                let Some(_permit) = permit else {
                    return None;
                };
                if combined.is_cancelled() {
                    return None;
                }
                let result = executor.execute(&task, ExecuteOptions { cancel: Some(combined.clone()), over: Default::default() }).await;
                if result.status != ExecutionStatus::Completed {
                    internal_cancel.cancel();
                }
                Some(result)
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.unwrap_or(None));
        }
        results
    }

    #[allow(clippy::too_many_arguments)]
    fn build_task(
        &self,
        skill: &str,
        run: &PipelineRun,
        step_index: usize,
        last_index: usize,
        config: &PipelineRunConfig,
        input_paths: &[String],
        now_ms: u64,
    ) -> Task {
        let id = TaskId::new(skill, date_from_epoch_ms(now_ms));
        let squad = squad_for(skill);
        let output_path = mf_workspace::output_store::output_path(squad, skill, id.as_str());
        let next = if step_index == last_index {
            TaskNext::DirectorReview
        } else {
            TaskNext::PipelineContinue { pipeline_id: run.id.to_string() }
        };

        Task {
            id,
            from: TaskOrigin::Director,
            to: skill.to_string(),
            priority: config.priority,
            deadline_ms: None,
            status: mf_core::TaskStatus::Pending,
            revision_count: 0,
            goal_id: run.goal_id.clone(),
            pipeline_id: Some(run.id.to_string()),
            goal: config.goal_description.clone(),
            inputs: input_paths
                .iter()
                .map(|path| InputRef { path: path.clone(), description: "Output from previous pipeline step".to_string() })
                .collect(),
            requirements: config.goal_description.clone(),
            output: OutputSpec { path: output_path, format: "markdown".to_string() },
            next,
            tags: Vec::new(),
            metadata: HashMap::new(),
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }
}

fn date_from_epoch_ms(ms: u64) -> chrono::NaiveDate {
    chrono::DateTime::from_timestamp_millis(ms as i64)
        .map(|dt: chrono::DateTime<chrono::Utc>| dt.date_naive())
        .unwrap_or_else(|| chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default())
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
