#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use mimic_core::VerifyMode;

use crate::call::MockRef;
use crate::error::{MimicError, Result};
use crate::interceptor::MockScope;
use crate::registry::MockRegistry;
use crate::template::CallTemplate;
use crate::trace::CallTrace;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// No unconsumed call matches the template.
    NotFound,
    /// The number of matching calls is outside the mode's bounds.
    CountMismatch { actual: usize },
    /// Every template matches some call, but not in template order.
    OrderViolation,
    /// Calls of the verified mocks were left unconsumed.
    UnverifiedCalls,
}

/// Failed verification with everything needed to diagnose it from the message.
#[derive(Clone, Debug, Diagnostic)]
#[diagnostic(code(mimic::verification))]
pub struct VerificationFailure {
    pub kind: FailureKind,
    pub mode: VerifyMode,
    /// The template that could not be satisfied, if the failure is about one.
    pub template: Option<String>,
    /// All templates of the run, in order.
    pub expected: Vec<String>,
    /// Calls left over by an exhaustive check.
    pub unverified: Vec<String>,
    /// Every recorded call of the relevant receivers, in stamp order.
    pub recorded: Vec<String>,
}

impl VerificationFailure {
    fn render(&self) -> String {
        let template = self.template.as_deref().unwrap_or("<none>");
        let mut out = match &self.kind {
            FailureKind::NotFound => format!("Expected call {template} not found! (mode: {})", self.mode),
            FailureKind::CountMismatch { actual } => format!(
                "Expected call {template} to satisfy {} but {actual} matching call(s) were recorded!",
                self.mode
            ),
            FailureKind::OrderViolation => format!(
                "Calls out of order! {template} has no matching call after the previous verified call (mode: {})",
                self.mode
            ),
            FailureKind::UnverifiedCalls => format!("Not all calls were verified! (mode: {})", self.mode),
        };
        if matches!(self.kind, FailureKind::OrderViolation) {
            push_section(&mut out, "Expected order:", &self.expected);
        }
        if !self.unverified.is_empty() {
            push_section(&mut out, "Unverified calls:", &self.unverified);
        }
        push_section(&mut out, "Recorded calls:", &self.recorded);
        out
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl std::error::Error for VerificationFailure {}

fn push_section(out: &mut String, title: &str, lines: &[String]) {
    out.push('\n');
    out.push_str(title);
    if lines.is_empty() {
        out.push_str(" none");
        return;
    }
    for line in lines {
        out.push_str("\n  ");
        out.push_str(line);
    }
}

/// Why a run of templates failed, before rendering.
struct Miss {
    kind: FailureKind,
    template: Option<usize>,
}

/// Matches call templates against the recorded history of their receivers.
#[derive(Clone)]
pub struct Verifier {
    registry: MockRegistry,
    mode: VerifyMode,
}

impl Verifier {
    /// Verifier in the registry's configured default mode.
    pub fn new(registry: &MockRegistry) -> Self {
        Verifier {
            registry: registry.clone(),
            mode: registry.config().default_verify_mode,
        }
    }

    pub fn with_mode(mut self, mode: VerifyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> VerifyMode {
        self.mode
    }

    pub fn verify(&self, templates: &[CallTemplate]) -> Result<()> {
        let scopes = self.scopes_for(templates.iter().map(|t| &t.receiver))?;
        let history = merged_history(&scopes);
        let mut consumed = vec![false; history.len()];

        let outcome = match self.mode {
            VerifyMode::Soft | VerifyMode::Exhaustive => match_soft(templates, &history, &mut consumed),
            VerifyMode::Order | VerifyMode::ExhaustiveOrder => {
                match_ordered(templates, &history, &mut consumed)
            }
            counting => {
                let (min, max) = counting.count_bounds().unwrap_or((1, usize::MAX));
                match_counted(templates, &history, &mut consumed, min, max)
            }
        };
        if let Err(miss) = outcome {
            return Err(self.failure(miss, templates, &history, Vec::new()));
        }

        if self.mode.is_exhaustive() {
            let unverified: Vec<String> = history
                .iter()
                .zip(&consumed)
                .filter(|(_, used)| !**used)
                .map(|(t, _)| t.to_string())
                .collect();
            if !unverified.is_empty() {
                let miss = Miss {
                    kind: FailureKind::UnverifiedCalls,
                    template: None,
                };
                return Err(self.failure(miss, templates, &history, unverified));
            }
        }

        let stamps: Vec<u64> = history
            .iter()
            .zip(&consumed)
            .filter(|(_, used)| **used)
            .map(|(t, _)| t.order_stamp)
            .collect();
        for scope in &scopes {
            scope.traces().mark_verified(&stamps);
        }
        Ok(())
    }

    /// Fails if any call of `receivers` was never consumed by a verification.
    pub fn verify_no_more_calls(&self, receivers: &[&MockRef]) -> Result<()> {
        let scopes = self.scopes_for(receivers.iter().copied())?;
        let unverified: Vec<String> = scopes
            .iter()
            .flat_map(|s| s.traces().unverified())
            .map(|t| t.to_string())
            .collect();
        if unverified.is_empty() {
            return Ok(());
        }
        let history = merged_history(&scopes);
        let miss = Miss {
            kind: FailureKind::UnverifiedCalls,
            template: None,
        };
        Err(self.failure(miss, &[], &history, unverified))
    }

    fn scopes_for<'a>(&self, receivers: impl Iterator<Item = &'a MockRef>) -> Result<Vec<Arc<MockScope>>> {
        let mut seen = HashSet::new();
        let mut scopes = Vec::new();
        for receiver in receivers {
            if !seen.insert(receiver.id()) {
                continue;
            }
            let scope = self
                .registry
                .resolve(receiver)
                .ok_or_else(|| MimicError::ObjectNotMocked {
                    receiver: receiver.to_string(),
                })?;
            scopes.push(scope);
        }
        Ok(scopes)
    }

    fn failure(
        &self,
        miss: Miss,
        templates: &[CallTemplate],
        history: &[CallTrace],
        unverified: Vec<String>,
    ) -> MimicError {
        let failure = VerificationFailure {
            kind: miss.kind,
            mode: self.mode,
            template: miss.template.map(|i| templates[i].to_string()),
            expected: templates.iter().map(|t| t.to_string()).collect(),
            unverified,
            recorded: history.iter().map(|t| t.to_string()).collect(),
        };
        tracing::debug!(kind = ?failure.kind, mode = %self.mode, "verification failed");
        MimicError::Verification(failure)
    }
}

fn merged_history(scopes: &[Arc<MockScope>]) -> Vec<CallTrace> {
    let mut history: Vec<CallTrace> = scopes.iter().flat_map(|s| s.traces().snapshot()).collect();
    history.sort_by_key(|t| t.order_stamp);
    history
}

fn first_unconsumed(
    template: &CallTemplate,
    history: &[CallTrace],
    consumed: &[bool],
    after: Option<u64>,
) -> Option<usize> {
    history.iter().enumerate().position(|(i, t)| {
        !consumed[i] && after.is_none_or(|stamp| t.order_stamp > stamp) && t.matches(template)
    })
}

fn match_soft(templates: &[CallTemplate], history: &[CallTrace], consumed: &mut [bool]) -> std::result::Result<(), Miss> {
    for (ti, template) in templates.iter().enumerate() {
        let Some(i) = first_unconsumed(template, history, consumed, None) else {
            return Err(Miss {
                kind: FailureKind::NotFound,
                template: Some(ti),
            });
        };
        consumed[i] = true;
    }
    Ok(())
}

fn match_ordered(
    templates: &[CallTemplate],
    history: &[CallTrace],
    consumed: &mut [bool],
) -> std::result::Result<(), Miss> {
    let mut last: Option<u64> = None;
    for (ti, template) in templates.iter().enumerate() {
        let Some(i) = first_unconsumed(template, history, consumed, last) else {
            // Only a template with no matching call at all is not-found.
            let kind = if history.iter().any(|t| t.matches(template)) {
                FailureKind::OrderViolation
            } else {
                FailureKind::NotFound
            };
            return Err(Miss {
                kind,
                template: Some(ti),
            });
        };
        consumed[i] = true;
        last = Some(history[i].order_stamp);
    }
    Ok(())
}

fn match_counted(
    templates: &[CallTemplate],
    history: &[CallTrace],
    consumed: &mut [bool],
    min: usize,
    max: usize,
) -> std::result::Result<(), Miss> {
    for (ti, template) in templates.iter().enumerate() {
        let mut actual = 0;
        for (i, trace) in history.iter().enumerate() {
            if !consumed[i] && trace.matches(template) {
                consumed[i] = true;
                actual += 1;
            }
        }
        if actual < min || actual > max {
            return Err(Miss {
                kind: FailureKind::CountMismatch { actual },
                template: Some(ti),
            });
        }
    }
    Ok(())
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier").field("mode", &self.mode).finish()
    }
}
