//! Prompt templates for the three model calls
//!
//! Templates use MiniJinja syntax and are rendered against serializable
//! context structs built by the agents.

use crate::error::{Result, ResearchError};
use minijinja::Environment;
use serde::Serialize;

/// A system prompt plus a user-message template
#[derive(Debug, Clone, Copy)]
pub struct Prompt {
    pub name: &'static str,
    pub system: &'static str,
    user: &'static str,
}

impl Prompt {
    /// Render the user message with `vars`
    pub fn render(&self, vars: &impl Serialize) -> Result<String> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        let value = minijinja::Value::from_serialize(vars);
        env.render_str(self.user, value)
            .map(|s| s.trim().to_string())
            .map_err(|e| ResearchError::PromptError {
                name: self.name.to_string(),
                detail: e.to_string(),
            })
    }
}

/// Numbered hit list shared by every template
macro_rules! hit_list {
    ($var:literal) => {
        concat!(
            "{% for hit in ",
            $var,
            " %}\n",
            "{{ loop.index }}. {{ hit.title }}\n",
            "   URL: {{ hit.url }}\n",
            "   {{ hit.snippet }}\n",
            "{% endfor %}\n"
        )
    };
}

pub const RESOLVE: Prompt = Prompt {
    name: "resolve",
    system: "You resolve user input into a subject for web research. \
        If the input is a stock ticker (e.g. NVDA, AAPL), set is_ticker to true, \
        set subject to the company name, list a few context keywords \
        (e.g. semiconductors, GPUs, AI) and write search_query as a short search \
        phrase combining company and context. \
        If the input is a general question or topic, set is_ticker to false, \
        set subject to a short name for the topic, and write search_query as the \
        user's query, cleaned up if needed. \
        Base the answer on the search results provided.",
    user: concat!(
        "Input: {{ query }}\n",
        "{% if is_ticker %}\n",
        "The input looks like a stock ticker.\n",
        "{% else %}\n",
        "The input is a free-text query.\n",
        "{% endif %}\n",
        "\n",
        "Discovery search results for \"{{ search }}\":\n",
        "\n",
        hit_list!("hits"),
    ),
};

pub const ANGLES: Prompt = Prompt {
    name: "angles",
    system: "From the discovery search results, produce exactly 3 to 4 \
        non-overlapping search angles (keywords or short phrases). \
        For a stock or company, cover: SWOT analysis, last 12 months stock \
        performance, competition and market positioning, latest quarterly \
        results and forward guidance. \
        For a general topic, derive analogous angles that cover different aspects. \
        Each angle is used verbatim as a web search query, so include the subject name.",
    user: concat!(
        "Subject: {{ context }}\n",
        "{% if is_ticker %}\n",
        "Kind: publicly traded company\n",
        "{% else %}\n",
        "Kind: general topic\n",
        "{% endif %}\n",
        "\n",
        "Discovery search results for: {{ search_query }}\n",
        "\n",
        hit_list!("hits"),
        "\n",
        "Produce 3-4 non-overlapping search angles for deep-dive searches.",
    ),
};

pub const REPORT: Prompt = Prompt {
    name: "report",
    system: "You are a research analyst. Using ONLY the provided search results \
        (no outside knowledge), produce a structured research report. Fill every field. \
        Write exactly one entry in sections per research angle, in the order the \
        angles are given, titled after the angle. \
        Every evidence item must cite one source with the exact title and url of a \
        search result shown below. If an angle has no results, say so briefly in its \
        findings and leave its evidence empty rather than inventing sources. \
        List every cited page in sources. Prefer primary sources for financials \
        (earnings releases, filings, investor relations). \
        Note conflicting information under risks.",
    user: concat!(
        "Produce a structured research report on {{ context }}.\n",
        "Resolved query: {{ search_query }}\n",
        "\n",
        "Research angles, in order:\n",
        "{% for dive in dives %}\n",
        "{{ loop.index }}. {{ dive.angle }}\n",
        "{% endfor %}\n",
        "\n",
        "--- Discovery search results ---\n",
        hit_list!("discovery"),
        "{% for dive in dives %}\n",
        "\n",
        "--- Deep-dive angle {{ loop.index }}: {{ dive.angle }} ---\n",
        "{% if dive.hits %}\n",
        hit_list!("dive.hits"),
        "{% else %}\n",
        "(no results)\n",
        "{% endif %}\n",
        "{% endfor %}\n",
    ),
};
