use super::summary::ReviewReport;
use crate::workflow::{OverallStatus, ReviewItemStatus};

pub fn build_review_markdown(report: &ReviewReport) -> String {
    let mut md = String::new();

    md.push_str("# caseflow Review\n\n");
    md.push_str(&format!("**Generated:** {}\n", report.timestamp));
    md.push_str(&format!("**Session:** {}\n", report.session_id));
    if !report.request.is_empty() {
        md.push_str(&format!("**Request:** {}\n", report.request));
    }
    md.push_str(&format!(
        "**Plan:** {} (v{})\n",
        report.plan_title, report.plan_version
    ));
    md.push_str(&format!("**Duration:** {:.1}s\n\n", report.duration_sec));

    md.push_str(&format!(
        "## {} {}\n\n",
        overall_icon(report.overall_status),
        report.summary
    ));

    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Success | {} |\n", report.succeeded));
    md.push_str(&format!("| Warning | {} |\n", report.warnings));
    md.push_str(&format!("| Error | {} |\n\n", report.errors));

    if report.items.is_empty() {
        md.push_str("*No tasks*\n");
        return md;
    }

    md.push_str("## Tasks\n\n");
    md.push_str("| Task | Status | Summary |\n");
    md.push_str("|------|--------|---------|\n");
    for item in &report.items {
        md.push_str(&format!(
            "| {} | {} {} | {} |\n",
            table_cell(&item.task_title),
            item_icon(item.status),
            item.status,
            table_cell(&item.summary)
        ));
    }

    let detailed: Vec<_> = report.items.iter().filter(|i| i.details.is_some()).collect();
    if !detailed.is_empty() {
        md.push_str("\n## Details\n\n");
        for item in detailed {
            md.push_str(&format!("### {}\n\n", item.task_title));
            if let Some(ref details) = item.details {
                md.push_str(&format!("```\n{}\n```\n\n", details));
            }
        }
    }

    md
}

/// Keep a value on one table row
fn table_cell(text: &str) -> String {
    text.replace('\n', " ").replace('|', "\\|")
}

fn overall_icon(status: OverallStatus) -> &'static str {
    match status {
        OverallStatus::Success => "✅",
        OverallStatus::Partial => "⚠️",
        OverallStatus::Failed => "❌",
    }
}

fn item_icon(status: ReviewItemStatus) -> &'static str {
    match status {
        ReviewItemStatus::Success => "✅",
        ReviewItemStatus::Warning => "⏭️",
        ReviewItemStatus::Error => "❌",
    }
}
