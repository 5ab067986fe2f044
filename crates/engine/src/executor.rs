// SPDX-License-Identifier: MIT

//! Agent Executor: skill-context assembly, prompt construction,
//! model invocation with retry/backoff/timeout, response validation, and
//! atomic artifact persistence.
//!
//! Never throws: every failure path, including ones reached after the task
//! was already moved to `in_progress`, resolves to an [`ExecutionResult`]
//! whose `status` is `Failed`. The best-effort `failed` status write on
//! those late paths swallows its own error so it never masks the original
//! cause.

use crate::config::{ExecuteOverride, ExecutorConfig};
use mf_adapters::{skills, CompletionRequest, ExecError, Logger, MessageClient, SkillRegistry};
use mf_core::{CancelToken, Clock, InputRef, Task, TaskId, TaskStatus};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionError {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input + self.output
    }

    pub fn add(&mut self, other: TokenUsage) {
        self.input += other.input;
        self.output += other.output;
    }
}

/// Result of running one task end-to-end. The Agent Executor never
/// throws: every outcome, success or failure, is represented here.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub task_id: TaskId,
    pub skill: String,
    pub output_path: Option<String>,
    pub tokens_used: TokenUsage,
    pub duration_ms: u64,
    pub error: Option<ExecutionError>,
    /// Set when the response was truncated (`stop_reason == max_tokens`):
    /// a warning, not a failure — `status` stays `Completed`.
    pub truncated: bool,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }
}

/// Per-call options a caller may supply: an optional cancellation handle,
/// plus an optional per-call model tier, timeout, and max-retries override.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    pub cancel: Option<CancelToken>,
    pub over: ExecuteOverride,
}

/// The Agent Executor. Generic over [`Clock`] so tests can drive durations
/// and timestamps deterministically.
pub struct AgentExecutor<C: Clock> {
    workspace: mf_workspace::Workspace,
    skills: SkillRegistry,
    client: Arc<dyn MessageClient>,
    clock: C,
    logger: Logger,
    config: ExecutorConfig,
}

impl<C: Clock> AgentExecutor<C> {
    pub fn new(
        workspace: mf_workspace::Workspace,
        skills: SkillRegistry,
        client: Arc<dyn MessageClient>,
        clock: C,
        logger: Logger,
        config: ExecutorConfig,
    ) -> Self {
        Self { workspace, skills, client, clock, logger, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute `task` end-to-end per the 11-step algorithm.
    pub async fn execute(&self, task: &Task, options: ExecuteOptions) -> ExecutionResult {
        let start = self.clock.now();
        let cancel = options.cancel.clone().unwrap_or_default();

        // Step 1: gate.
        if !task.status.is_executable() {
            return self.result_without_mark(
                task,
                ExecutionError { code: "TASK_NOT_EXECUTABLE", message: format!("status {} is not executable", task.status) },
                start,
            );
        }
        if cancel.is_cancelled() {
            return self.result_without_mark(
                task,
                ExecutionError { code: "ABORTED", message: "cancelled before start".to_string() },
                start,
            );
        }

        // Step 2: move to in_progress.
        let now_ms = self.clock.epoch_ms();
        if let Err(e) = self.workspace.update_task_status(&task.id, TaskStatus::InProgress, now_ms).await {
            return self.result_without_mark(
                task,
                ExecutionError { code: "TASK_NOT_EXECUTABLE", message: e.to_string() },
                start,
            );
        }

        // Step 3: load skill.
        let skill = match self.skills.load(&task.to).await {
            Ok(skill) => skill,
            Err(_) => {
                return self
                    .fail_and_mark(task, ExecutionError { code: "SKILL_NOT_FOUND", message: task.to.clone() }, start)
                    .await
            }
        };

        // Step 4: load product context (non-fatal).
        let product_context = self.workspace.read_file(&self.config.product_context_path).await.ok();

        // Step 5: load upstream inputs.
        let mut loaded_inputs: Vec<(InputRef, String)> = Vec::with_capacity(task.inputs.len());
        for input in &task.inputs {
            match self.workspace.read_file(&input.path).await {
                Ok(content) => loaded_inputs.push((input.clone(), content)),
                Err(_) => {
                    return self
                        .fail_and_mark(
                            task,
                            ExecutionError { code: "INPUT_NOT_FOUND", message: input.path.clone() },
                            start,
                        )
                        .await
                }
            }
        }

        // Step 6: build prompt.
        let system_prompt = skill.system_prompt();
        let user_message = build_user_message(task, product_context.as_deref(), &loaded_inputs);

        // Step 7: resolve model, build composite cancellation.
        let model = self.config.resolve_model(options.over.model_tier.as_deref());
        let timeout = self.config.timeout(options.over.timeout_ms);
        let max_retries = self.config.max_retries(options.over.max_retries).max(1);
        let timeout_token = CancelToken::new();
        let composite = CancelToken::any_of([cancel.clone(), timeout_token.clone()]);
        let timeout_handle = tokio::spawn({
            let timeout_token = timeout_token.clone();
            async move {
                tokio::time::sleep(timeout).await;
                timeout_token.cancel();
            }
        });

        // Step 8: invoke with retry.
        let response = self
            .invoke_with_retry(&system_prompt, &user_message, &model, max_retries, &composite)
            .await;
        timeout_handle.abort();

        let response = match response {
            Ok(response) => response,
            Err(error) => return self.fail_and_mark(task, error, start).await,
        };

        // Step 9: validate response.
        if response.content.trim().is_empty() {
            return self.fail_and_mark(task, ExecutionError { code: "RESPONSE_EMPTY", message: String::new() }, start).await;
        }
        let truncated = matches!(response.stop_reason, mf_adapters::StopReason::MaxTokens);

        // Step 10: persist output.
        let output_path = if is_foundation_output(task) {
            match self.workspace.write_file(&task.output.path, &response.content).await {
                Ok(()) => task.output.path.clone(),
                Err(e) => {
                    return self
                        .fail_and_mark(task, ExecutionError { code: "WORKSPACE_WRITE_FAILED", message: e.to_string() }, start)
                        .await
                }
            }
        } else {
            let squad = skills::squad_for(&task.to);
            match self.workspace.write_output(squad, &task.to, task.id.as_str(), &response.content).await {
                Ok(path) => path,
                Err(e) => {
                    return self
                        .fail_and_mark(task, ExecutionError { code: "WORKSPACE_WRITE_FAILED", message: e.to_string() }, start)
                        .await
                }
            }
        };

        // Step 11: mark completed.
        let completed_at_ms = self.clock.epoch_ms();
        if let Err(e) = self.workspace.update_task_status(&task.id, TaskStatus::Completed, completed_at_ms).await {
            self.logger.warn(&format!("failed to mark {} completed after a successful run: {e}", task.id));
        }

        let duration_ms = duration_since_ms(&self.clock, start);
        ExecutionResult {
            status: ExecutionStatus::Completed,
            task_id: task.id,
            skill: task.to.clone(),
            output_path: Some(output_path),
            tokens_used: TokenUsage { input: response.input_tokens, output: response.output_tokens },
            duration_ms,
            error: None,
            truncated,
        }
    }

    async fn invoke_with_retry(
        &self,
        system_prompt: &str,
        user_message: &str,
        model: &str,
        max_retries: u32,
        composite: &CancelToken,
    ) -> Result<mf_adapters::CompletionResponse, ExecutionError> {
        let mut final_error: Option<ExecError> = None;
        for attempt in 0..max_retries {
            if composite.is_cancelled() {
                return Err(ExecutionError { code: "ABORTED", message: "cancelled".to_string() });
            }
            let request = CompletionRequest {
                system_prompt: system_prompt.to_string(),
                user_message: user_message.to_string(),
                model: model.to_string(),
                max_tokens: self.config.max_output_tokens,
                cancel: Some(composite.clone()),
            };
            match self.client.complete(request).await {
                Ok(response) => return Ok(response),
                Err(ExecError::Aborted) => {
                    return Err(ExecutionError { code: "ABORTED", message: "cancelled".to_string() })
                }
                Err(e) => {
                    let is_last_attempt = attempt + 1 == max_retries;
                    if !e.is_retryable() || is_last_attempt {
                        final_error = Some(e);
                        break;
                    }
                    if composite.sleep(self.config.backoff(attempt)).await.is_err() {
                        return Err(ExecutionError { code: "ABORTED", message: "cancelled during backoff".to_string() });
                    }
                }
            }
        }
        let error = final_error.unwrap_or(ExecError::Unknown("retry loop exited without a response".to_string()));
        Err(ExecutionError { code: error.code(), message: error.to_string() })
    }

    /// Best-effort move to `failed`
    /// so it never masks the original failure) then return the result.
    async fn fail_and_mark(&self, task: &Task, error: ExecutionError, start: std::time::Instant) -> ExecutionResult {
        let now_ms = self.clock.epoch_ms();
        if let Err(e) = self.workspace.update_task_status(&task.id, TaskStatus::Failed, now_ms).await {
            self.logger.warn(&format!("failed to mark {} failed after {}: {e}", task.id, error.code));
        }
        self.result_without_mark(task, error, start)
    }

    fn result_without_mark(&self, task: &Task, error: ExecutionError, start: std::time::Instant) -> ExecutionResult {
        ExecutionResult {
            status: ExecutionStatus::Failed,
            task_id: task.id,
            skill: task.to.clone(),
            output_path: None,
            tokens_used: TokenUsage::default(),
            duration_ms: duration_since_ms(&self.clock, start),
            error: Some(error),
            truncated: false,
        }
    }
}

fn duration_since_ms<C: Clock>(clock: &C, start: std::time::Instant) -> u64 {
    clock.now().saturating_duration_since(start).as_millis() as u64
}

/// A foundation skill's output is written to the task's own `output.path`
/// (typically under `context/`) rather than `outputs/{squad}/{skill}/...`.
fn is_foundation_output(task: &Task) -> bool {
    task.output.path.starts_with("context/")
}

/// Build the user message: sections in a fixed order.
fn build_user_message(task: &Task, product_context: Option<&str>, inputs: &[(InputRef, String)]) -> String {
    let mut out = String::new();

    out.push_str("## Product Context\n\n");
    match product_context {
        Some(context) if !context.trim().is_empty() => {
            out.push_str(context.trim());
            out.push('\n');
        }
        _ => out.push_str("(no product context available)\n"),
    }

    out.push_str("\n## Task Assignment\n\n");
    out.push_str(&format!("- **ID:** {}\n", task.id));
    out.push_str(&format!("- **From:** {}\n", task.from));
    out.push_str(&format!("- **Priority:** {}\n", task.priority));
    out.push_str(&format!("- **Goal:** {}\n", task.goal));

    out.push_str("\n## Upstream Inputs\n\n");
    if inputs.is_empty() {
        out.push_str("(no upstream inputs)\n");
    } else {
        for (input, content) in inputs {
            out.push_str(&format!("### {} — {}\n\n", input.path, input.description));
            out.push_str(content.trim());
            out.push_str("\n\n");
        }
    }

    out.push_str("## Requirements\n\n");
    out.push_str(&task.requirements);
    out.push('\n');

    if task.revision_count > 0 {
        out.push_str(&format!("\n## Revision Context\n\nThis is revision {}.\n", task.revision_count));
    }

    out.push_str(&format!("\n## Output Instructions\n\nWrite your response in {} format.\n", task.output.format));

    out
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
