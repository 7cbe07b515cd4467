//! Unsatisfied-want scan: resolve every want of every working
//! component and fold the outcomes into one report document.

use crate::diagnostic::{Diagnostic, failure_class};
use crate::registry::Registry;
use crate::resolution::{Resolution, Verdict};
use serde::{Deserialize, Serialize};

pub const WANT_REPORT_KIND: &str = "pact.want_report.v1";

pub const RESULT_SATISFIED: &str = "satisfied";
pub const RESULT_UNSATISFIED: &str = "unsatisfied";

/// One wanted behavior, who wants it, and how its resolution went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WantFinding {
    pub component: String,
    pub behavior: String,
    pub verdict: Verdict,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WantSummary {
    pub total: usize,
    pub satisfied: usize,
    pub unsatisfied: usize,
}

/// Report over every want in the registry's working table.
///
/// `result` is `"satisfied"` only when every finding is; an empty
/// registry has nothing unsatisfied and reports `"satisfied"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WantReport {
    pub report_kind: String,
    pub result: String,
    pub findings: Vec<WantFinding>,
    /// Behavior cycles encountered anywhere in the findings' trees.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
    pub summary: WantSummary,
}

impl WantReport {
    pub fn is_satisfied(&self) -> bool {
        self.result == RESULT_SATISFIED
    }
}

/// Walk the working table in name order, resolve each component's
/// wants in sorted order, and report. Deterministic for an unchanged
/// registry.
pub fn check_wants(registry: &Registry) -> WantReport {
    let mut findings = Vec::new();
    let mut diagnostics = Vec::new();
    let mut summary = WantSummary::default();
    for component in registry.working_components() {
        for want in component.wants(None) {
            let resolution = registry.resolve(want.name());
            collect_cycles(&resolution, &mut diagnostics);
            summary.total += 1;
            if resolution.is_satisfied() {
                summary.satisfied += 1;
            } else {
                summary.unsatisfied += 1;
            }
            findings.push(WantFinding {
                component: component.name().to_string(),
                behavior: want.name().to_string(),
                verdict: resolution.verdict(),
                resolution,
            });
        }
    }
    let result = if summary.unsatisfied == 0 {
        RESULT_SATISFIED
    } else {
        RESULT_UNSATISFIED
    };
    WantReport {
        report_kind: WANT_REPORT_KIND.to_string(),
        result: result.to_string(),
        findings,
        diagnostics,
        summary,
    }
}

fn collect_cycles(resolution: &Resolution, diagnostics: &mut Vec<Diagnostic>) {
    if let Some(path) = resolution.cycle() {
        // Shared wants hit the same cycle once per wanting component;
        // report each path once.
        if !diagnostics.iter().any(|d| d.path == path) {
            diagnostics.push(Diagnostic::new(
                failure_class::BEHAVIOR_CYCLE,
                path.to_vec(),
                format!("behavior cycle while resolving {:?}", resolution.behavior()),
            ));
        }
        return;
    }
    let offers = resolution.satisfied().iter().chain(resolution.unsatisfied());
    for offer in offers {
        for condition in offer.conditions() {
            collect_cycles(condition, diagnostics);
        }
    }
}
