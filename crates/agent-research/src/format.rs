//! Report rendering

use crate::models::{ResearchReport, Source};

const NONE_LISTED: &str = "(None listed.)";
const RULE: &str = "\n---\n\n";

fn heading(out: &mut String, title: &str) {
    out.push_str(&format!("## {title}\n\n"));
}

fn or_none_listed(body: &str) -> &str {
    let body = body.trim();
    if body.is_empty() { NONE_LISTED } else { body }
}

fn paragraph(out: &mut String, title: &str, body: &str) {
    heading(out, title);
    out.push_str(or_none_listed(body));
    out.push('\n');
    out.push_str(RULE);
}

fn bullets(out: &mut String, title: &str, items: &[String]) {
    heading(out, title);
    if items.is_empty() {
        out.push_str(NONE_LISTED);
        out.push('\n');
    }
    for item in items {
        out.push_str(&format!("- {}\n", item.trim()));
    }
    out.push_str(RULE);
}

fn link(source: &Source) -> String {
    format!("[{}]({})", source.title.trim(), source.url.trim())
}

/// Render the full report as Markdown in a fixed section order
pub fn to_markdown(report: &ResearchReport) -> String {
    let mut out = String::new();

    paragraph(&mut out, "Executive summary", &report.executive_summary);
    bullets(&mut out, "Key takeaways", &report.key_takeaways);

    heading(&mut out, "Research sections");
    if report.sections.is_empty() {
        out.push_str(NONE_LISTED);
        out.push_str("\n\n");
    }
    for section in &report.sections {
        out.push_str(&format!(
            "### {}\n\n{}\n\n",
            section.title.trim(),
            section.findings.trim()
        ));
        for evidence in &section.evidence {
            out.push_str(&format!("- {} ({})\n", evidence.claim.trim(), link(&evidence.source)));
        }
        if !section.evidence.is_empty() {
            out.push('\n');
        }
    }
    out.push_str(RULE.trim_start());

    paragraph(&mut out, "Strategic overview", &report.strategic_overview);

    heading(&mut out, "SWOT");
    let swot = &report.swot;
    for (label, body) in [
        ("Strengths", &swot.strengths),
        ("Weaknesses", &swot.weaknesses),
        ("Opportunities", &swot.opportunities),
        ("Threats", &swot.threats),
    ] {
        out.push_str(&format!("**{label}**\n\n{}\n\n", or_none_listed(body)));
    }
    out.push_str(RULE.trim_start());

    paragraph(&mut out, "Implications and strategic priorities", &report.implications);
    paragraph(&mut out, "Financial performance", &report.financial_performance);
    paragraph(&mut out, "Drivers and sensitivities", &report.drivers_and_sensitivities);
    paragraph(&mut out, "Valuation context and modeling tips", &report.valuation_context);
    paragraph(&mut out, "Regulatory and legal environment", &report.regulatory_and_legal);
    bullets(&mut out, "Risks and uncertainties", &report.risks);
    bullets(&mut out, "What to watch next", &report.what_to_watch);

    heading(&mut out, "Sources");
    if report.sources.is_empty() {
        out.push_str(NONE_LISTED);
        out.push('\n');
    }
    for source in &report.sources {
        out.push_str(&format!("- {}\n", link(source)));
    }

    let detail = report.additional_detail.trim();
    if !detail.is_empty() {
        out.push_str(RULE);
        heading(&mut out, "More detail");
        out.push_str(detail);
        out.push('\n');
    }

    out
}

/// Executive summary and key takeaways, for terminal output
pub fn to_summary(report: &ResearchReport) -> String {
    let mut out = format!("{}\n", report.executive_summary.trim());
    if !report.key_takeaways.is_empty() {
        out.push_str("\nKey takeaways:\n");
        for item in &report.key_takeaways {
            out.push_str(&format!("- {}\n", item.trim()));
        }
    }
    out.push_str(&format!(
        "\n{} sections, {} cited sources.\n",
        report.sections.len(),
        report.sources.len()
    ));
    out
}
