//! Narrative boundary — prompt construction around an opaque text provider.
//!
//! RULE: Narrative generation runs strictly after analytics and never feeds
//! back into them. A missing provider or a failed call yields placeholder
//! text; no error crosses this boundary.

use crate::{
    context::{identify_data_sources, DataSource, NarrativeContext},
    inefficiency_analyzer::Inefficiencies,
    pattern_analyzer::Patterns,
    report::{ExecutiveSummary, InsightReport},
    risk_analyzer::Risks,
    table::CaseTable,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sample summaries sent with a case-type prompt.
pub const CASE_TYPE_SAMPLE: usize = 10;

/// One chat-style completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptRequest {
    pub system:      String,
    pub user:        String,
    pub temperature: f32,
    pub max_tokens:  u32,
}

/// Anything that turns a prompt into text. Transport lives with the caller.
pub trait NarrativeProvider: Send + Sync {
    fn complete(&self, request: &PromptRequest) -> anyhow::Result<String>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub text:    String,
    pub sources: BTreeMap<DataSource, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NarrativeInsights {
    pub executive_summary_ai: String,
    pub risk_analysis_ai:     String,
    pub recommendations_ai:   String,
    /// (case type, narrative) for the most frequent recurring issue.
    pub case_type_analysis:   Option<(String, String)>,
}

pub struct Narrator<'a> {
    provider: Option<&'a dyn NarrativeProvider>,
}

impl<'a> Narrator<'a> {
    pub fn new(provider: Option<&'a dyn NarrativeProvider>) -> Self {
        Self { provider }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn executive_summary(&self, summary: &ExecutiveSummary) -> String {
        let Some(request) = json_prompt(summary, |data| PromptRequest {
            system: "You are an expert business analyst specializing in operational intelligence and risk management.".into(),
            user: format!(
                "You are an expert analyst for case management oversight. Analyze the following case management insights and provide:\n\n\
                 1. Executive Summary (2-3 sentences)\n\
                 2. Top 3 Critical Risks requiring immediate attention\n\
                 3. Key Patterns and Trends\n\
                 4. Root Cause Analysis Summary\n\
                 5. Actionable Recommendations (prioritized)\n\n\
                 Case Management Insights:\n{data}\n\n\
                 Provide clear, actionable insights that help leadership make data-driven decisions."
            ),
            temperature: 0.3,
            max_tokens: 1500,
        }) else {
            return unserializable("AI insights");
        };
        self.complete(&request, "AI insights", "generating AI insights")
    }

    pub fn risk_analysis(&self, risks: &Risks) -> String {
        let Some(request) = json_prompt(risks, |data| PromptRequest {
            system: "You are a risk management expert specializing in operational risk assessment.".into(),
            user: format!(
                "Analyze these case management risks and provide:\n\n\
                 1. Risk Severity Assessment (Critical/High/Medium/Low)\n\
                 2. Impact Analysis (potential business impact)\n\
                 3. Urgency Assessment (immediate/short-term/long-term)\n\
                 4. Mitigation Strategies\n\n\
                 Risks Identified:\n{data}\n\n\
                 Focus on actionable risk mitigation strategies."
            ),
            temperature: 0.3,
            max_tokens: 1000,
        }) else {
            return unserializable("AI risk analysis");
        };
        self.complete(&request, "AI risk analysis", "generating risk analysis")
    }

    pub fn recommendations(&self, inefficiencies: &Inefficiencies, patterns: &Patterns) -> String {
        let data = serde_json::to_string_pretty(inefficiencies)
            .and_then(|i| serde_json::to_string_pretty(patterns).map(|p| (i, p)));
        let Ok((inefficiencies, patterns)) = data else {
            return unserializable("AI recommendations");
        };
        let request = PromptRequest {
            system: "You are a process improvement consultant specializing in operational efficiency.".into(),
            user: format!(
                "Based on these case management inefficiencies and patterns, provide prioritized recommendations:\n\n\
                 1. Immediate Actions (next 24-48 hours)\n\
                 2. Short-term Improvements (next week)\n\
                 3. Long-term Strategic Changes (next month+)\n\n\
                 Inefficiencies:\n{inefficiencies}\n\n\
                 Patterns:\n{patterns}\n\n\
                 Provide specific, actionable recommendations with expected impact."
            ),
            temperature: 0.4,
            max_tokens: 1200,
        };
        self.complete(&request, "AI recommendations", "generating recommendations")
    }

    /// Narrative for one case type, from its case count and up to
    /// [`CASE_TYPE_SAMPLE`] of its summaries.
    pub fn case_type_summary(&self, case_type: &str, table: &CaseTable) -> String {
        let request = case_type_prompt(case_type, table);
        self.complete(&request, "AI summary", "generating case type summary")
    }

    /// Answer a freeform question from the condensed context. Sources are
    /// only reported when an answer was produced.
    pub fn answer(&self, question: &str, context: &NarrativeContext) -> Answer {
        let Some(provider) = self.provider else {
            return Answer { text: "Narrative provider not configured.".into(), sources: BTreeMap::new() };
        };
        let request = question_prompt(question, context);
        match provider.complete(&request) {
            Ok(text) => Answer {
                text,
                sources: identify_data_sources(question)
                    .into_iter()
                    .map(|s| (s, s.description().to_string()))
                    .collect(),
            },
            Err(e) => {
                log::warn!("{} failed answering a question: {e:#}", provider.name());
                Answer { text: format!("Error generating response: {e}"), sources: BTreeMap::new() }
            }
        }
    }

    /// Every report-level narrative, in one pass.
    pub fn enhance(&self, report: &InsightReport, table: &CaseTable) -> NarrativeInsights {
        let insights = &report.insights;
        NarrativeInsights {
            executive_summary_ai: self.executive_summary(&report.executive_summary),
            risk_analysis_ai:     self.risk_analysis(&insights.risks),
            recommendations_ai:   self.recommendations(&insights.inefficiencies, &insights.patterns),
            case_type_analysis:   insights.inefficiencies.recurring_issues.first().map(|top| {
                (top.case_type.clone(), self.case_type_summary(&top.case_type, table))
            }),
        }
    }

    fn complete(&self, request: &PromptRequest, what: &str, doing: &str) -> String {
        let Some(provider) = self.provider else {
            return placeholder(what);
        };
        match provider.complete(request) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("{} failed {doing}: {e:#}", provider.name());
                format!("Error {doing}: {e}")
            }
        }
    }
}

// ── Prompt builders ──────────────────────────────────────────────────────────

pub fn case_type_prompt(case_type: &str, table: &CaseTable) -> PromptRequest {
    let cases: Vec<_> = table.iter().filter(|c| c.case_type == case_type).collect();
    let sample: Vec<&str> = cases
        .iter()
        .filter_map(|c| c.summary.as_deref())
        .take(CASE_TYPE_SAMPLE)
        .collect();
    PromptRequest {
        system: "You are a security operations analyst specializing in case analysis.".into(),
        user: format!(
            "Analyze this case type and provide insights:\n\n\
             Case Type: {case_type}\n\
             Number of Cases: {}\n\
             Case Summaries (sample):\n{}\n\n\
             Provide:\n\
             1. Common characteristics\n\
             2. Typical resolution patterns\n\
             3. Root cause themes\n\
             4. Prevention strategies",
            cases.len(),
            sample.join("\n"),
        ),
        temperature: 0.3,
        max_tokens: 800,
    }
}

pub fn question_prompt(question: &str, context: &NarrativeContext) -> PromptRequest {
    PromptRequest {
        system: "You are a precision-focused data analyst specializing in case management and operational intelligence.\n\
                 Your role is to provide CRISP, CONCISE, DATA-DRIVEN answers based solely on the provided analysis data.\n\n\
                 CRITICAL REQUIREMENTS:\n\
                 1. Keep answers SHORT - maximum 3-5 sentences, use bullet points for multiple items\n\
                 2. ALWAYS cite specific numbers, percentages, and counts from the data\n\
                 3. Use exact values - do not approximate or round unless the data shows rounded values\n\
                 4. Reference specific case types, assignment groups, or categories by their exact names\n\
                 5. Be precise and factual - avoid generic statements\n\
                 6. If data is not available for a question, state that clearly in one sentence"
            .into(),
        user: format!(
            "Question: {question}\n\n\
             Data Context:\n{}\n\
             INSTRUCTIONS:\n\
             - Answer in 3-5 SHORT sentences maximum, use bullet points for lists\n\
             - Lead with the most important number or finding\n\
             - Cite exact values\n\
             - Every number must come from the data provided above",
            context.render(),
        ),
        temperature: 0.1,
        max_tokens: 500,
    }
}

fn json_prompt<T, F>(data: &T, build: F) -> Option<PromptRequest>
where
    T: Serialize,
    F: FnOnce(String) -> PromptRequest,
{
    match serde_json::to_string_pretty(data) {
        Ok(json) => Some(build(json)),
        Err(e) => {
            log::warn!("Could not serialize narrative input: {e}");
            None
        }
    }
}

fn placeholder(what: &str) -> String {
    format!("{what} unavailable - narrative provider not configured.")
}

fn unserializable(what: &str) -> String {
    format!("{what} unavailable - analysis could not be serialized.")
}
