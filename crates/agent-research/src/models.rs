//! Structured answers exchanged with the model
//!
//! Each type doubles as its own JSON schema ([`StructuredOutput::json_schema`])
//! and is deserialized strictly: unknown fields are rejected and the
//! [`StructuredOutput::validate`] hook enforces what the schema cannot.

use agent_llm::{StructuredOutput, schema};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Lower bound on generated angles
pub const MIN_ANGLES: usize = 3;
/// Upper bound on generated angles
pub const MAX_ANGLES: usize = 4;

/// The subject behind a query, resolved against the discovery search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedQuery {
    /// Whether the input was a stock ticker
    pub is_ticker: bool,
    /// Company or topic name, e.g. "NVIDIA Corporation"
    pub subject: String,
    /// Context keywords, e.g. semiconductors, GPUs, AI
    pub keywords: Vec<String>,
    /// Refined search phrase for the subject
    ///
    /// Context for the angle and report prompts; the discovery search itself
    /// runs before resolution, on the ticker phrase or the raw text.
    pub search_query: String,
}

impl ResolvedQuery {
    /// Subject and keywords as one line, e.g. "NVIDIA (semiconductors, GPUs)"
    pub fn context_line(&self) -> String {
        if self.keywords.is_empty() {
            self.subject.clone()
        } else {
            format!("{} ({})", self.subject, self.keywords.join(", "))
        }
    }
}

impl StructuredOutput for ResolvedQuery {
    const SCHEMA_NAME: &'static str = "resolved_query";

    fn json_schema() -> Value {
        schema::object(
            json!({
                "is_ticker": schema::boolean("True if the input was a stock ticker symbol"),
                "subject": schema::string(
                    "Company name for a ticker, or a short name for the topic"
                ),
                "keywords": schema::array(
                    "A few context keywords (industry, products, themes)",
                    schema::string("Keyword"),
                ),
                "search_query": schema::string(
                    "Short web search phrase combining the subject and its context"
                ),
            }),
            vec!["is_ticker", "subject", "keywords", "search_query"],
        )
    }

    fn validate(&self) -> Result<(), String> {
        if self.subject.trim().is_empty() {
            return Err("subject is empty".to_string());
        }
        if self.search_query.trim().is_empty() {
            return Err("search_query is empty".to_string());
        }
        Ok(())
    }
}

/// Independent research directions for the deep-dive searches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchAngles {
    pub angles: Vec<String>,
}

impl SearchAngles {
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.angles.iter().map(String::as_str)
    }
}

impl StructuredOutput for SearchAngles {
    const SCHEMA_NAME: &'static str = "search_angles";

    fn json_schema() -> Value {
        schema::object(
            json!({
                "angles": schema::bounded_array(
                    "3 to 4 distinct, non-overlapping search phrases",
                    schema::string("Search phrase for one research angle"),
                    MIN_ANGLES,
                    MAX_ANGLES,
                ),
            }),
            vec!["angles"],
        )
    }

    fn validate(&self) -> Result<(), String> {
        if !(MIN_ANGLES..=MAX_ANGLES).contains(&self.angles.len()) {
            return Err(format!(
                "expected {MIN_ANGLES}-{MAX_ANGLES} angles, got {}",
                self.angles.len()
            ));
        }
        if let Some(i) = self.angles.iter().position(|a| a.trim().is_empty()) {
            return Err(format!("angle {i} is empty"));
        }
        Ok(())
    }
}

/// A single web page cited by the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Source {
    pub title: String,
    pub url: String,
}

impl Source {
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() || self.url.trim().is_empty()
    }

    fn json_schema() -> Value {
        schema::object(
            json!({
                "title": schema::string("Title of the page or article"),
                "url": schema::string("Exact URL copied from the search results"),
            }),
            vec!["title", "url"],
        )
    }
}

/// A claim and the page it was drawn from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Evidence {
    pub claim: String,
    pub source: Source,
}

/// Findings for one research angle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportSection {
    pub title: String,
    pub findings: String,
    pub evidence: Vec<Evidence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Swot {
    pub strengths: String,
    pub weaknesses: String,
    pub opportunities: String,
    pub threats: String,
}

/// The final research report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResearchReport {
    pub executive_summary: String,
    pub key_takeaways: Vec<String>,
    /// One section per research angle, in angle order
    pub sections: Vec<ReportSection>,
    pub strategic_overview: String,
    pub swot: Swot,
    pub implications: String,
    pub financial_performance: String,
    pub drivers_and_sensitivities: String,
    pub valuation_context: String,
    pub regulatory_and_legal: String,
    pub risks: Vec<String>,
    pub what_to_watch: Vec<String>,
    pub sources: Vec<Source>,
    #[serde(default)]
    pub additional_detail: String,
}

impl ResearchReport {
    /// Check the invariants that depend on the angles the report was built from
    pub fn validate_against(&self, angles: &SearchAngles) -> Result<(), String> {
        if self.sections.len() != angles.len() {
            return Err(format!(
                "report has {} sections for {} angles",
                self.sections.len(),
                angles.len()
            ));
        }
        self.validate()
    }

    /// Total evidence items across all sections
    pub fn evidence_count(&self) -> usize {
        self.sections.iter().map(|s| s.evidence.len()).sum()
    }
}

impl StructuredOutput for ResearchReport {
    const SCHEMA_NAME: &'static str = "research_report";

    fn json_schema() -> Value {
        let text = |d: &str| schema::string(d);
        let list = |d: &str| schema::array(d, schema::string("Item"));

        let evidence = schema::object(
            json!({
                "claim": text("One short factual sentence"),
                "source": Source::json_schema(),
            }),
            vec!["claim", "source"],
        );
        let section = schema::object(
            json!({
                "title": text("Section title for this research angle"),
                "findings": text("Concise findings for this angle"),
                "evidence": schema::array("Claims with their cited source", evidence),
            }),
            vec!["title", "findings", "evidence"],
        );
        let swot = schema::object(
            json!({
                "strengths": text("Strengths"),
                "weaknesses": text("Weaknesses"),
                "opportunities": text("Opportunities"),
                "threats": text("Threats"),
            }),
            vec!["strengths", "weaknesses", "opportunities", "threats"],
        );

        schema::object(
            json!({
                "executive_summary": text("2-4 sentence executive summary"),
                "key_takeaways": list("Key takeaways, one per item"),
                "sections": schema::array(
                    "Exactly one section per research angle, in the given order",
                    section,
                ),
                "strategic_overview": text("Market position, strategy and competitive context"),
                "swot": swot,
                "implications": text("Implications and strategic priorities"),
                "financial_performance": text("Key metrics, recent results and trends"),
                "drivers_and_sensitivities": text("Revenue and earnings drivers, key sensitivities"),
                "valuation_context": text("Multiples, key inputs and modeling notes"),
                "regulatory_and_legal": text("Relevant regulation, litigation and compliance"),
                "risks": list("Risks and uncertainties, including conflicting information"),
                "what_to_watch": list("Concrete follow-ups: earnings dates, metrics, events"),
                "sources": schema::array("Every cited source", Source::json_schema()),
                "additional_detail": text("Extra context or nuance; may be empty"),
            }),
            vec![
                "executive_summary",
                "key_takeaways",
                "sections",
                "strategic_overview",
                "swot",
                "implications",
                "financial_performance",
                "drivers_and_sensitivities",
                "valuation_context",
                "regulatory_and_legal",
                "risks",
                "what_to_watch",
                "sources",
                "additional_detail",
            ],
        )
    }

    fn validate(&self) -> Result<(), String> {
        if self.executive_summary.trim().is_empty() {
            return Err("executive_summary is empty".to_string());
        }
        for (i, section) in self.sections.iter().enumerate() {
            if let Some(j) = section.evidence.iter().position(|e| e.source.is_empty()) {
                return Err(format!(
                    "evidence {j} in section {i} ('{}') has no source",
                    section.title
                ));
            }
        }
        if let Some(i) = self.sources.iter().position(|s| s.url.trim().is_empty()) {
            return Err(format!("source {i} has no url"));
        }
        Ok(())
    }
}
