use std::fmt::Write;

use serde_json::Value;

/// Human-readable summary of an audit response.
pub fn describe_audit(result: &Value) -> String {
    let findings = result["findings"].as_array().cloned().unwrap_or_default();
    let mut out = String::new();
    if findings.is_empty() {
        let _ = writeln!(out, "All branching rules are valid.");
        return out;
    }
    let _ = writeln!(out, "Rule findings:");
    for finding in &findings {
        let _ = writeln!(
            out,
            "  {} / {}: {}",
            finding["owner"].as_str().unwrap_or("<unknown>"),
            finding["rule_id"].as_str().unwrap_or("<unknown>"),
            describe_issue(&finding["issue"])
        );
    }
    out
}

fn describe_issue(issue: &Value) -> String {
    let code = issue["code"].as_str().unwrap_or("unknown");
    let detail = ["condition_id", "question_id", "option", "target", "owner"]
        .iter()
        .filter_map(|key| issue[*key].as_str().map(|value| format!("{}={}", key, value)))
        .collect::<Vec<_>>();
    if detail.is_empty() {
        code.to_string()
    } else {
        format!("{} ({})", code, detail.join(", "))
    }
}

pub fn describe_navigation(result: &Value) -> String {
    match (result["kind"].as_str(), result["question_id"].as_str()) {
        (Some("jump"), Some(id)) => format!("Jump to {}", id),
        (Some("next"), Some(id)) => format!("Next question: {}", id),
        _ => "End of survey".to_string(),
    }
}

pub fn describe_walk(result: &Value) -> String {
    let mut out = String::new();
    let path = result["path"].as_array().cloned().unwrap_or_default();
    let _ = writeln!(
        out,
        "Presented {} of {} questions:",
        path.len(),
        result["total"].as_u64().unwrap_or_default()
    );
    for (index, id) in path.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", index + 1, id.as_str().unwrap_or_default());
    }
    out
}

pub fn describe_questions(questions: &Value) -> String {
    let mut out = String::new();
    let questions = questions.as_array().cloned().unwrap_or_default();
    if questions.is_empty() {
        let _ = writeln!(out, "No eligible questions.");
    }
    for question in questions {
        let mut entry = format!(
            " - {} ({})",
            question["id"].as_str().unwrap_or_default(),
            question["type"].as_str().unwrap_or_default()
        );
        if let Some(title) = question["title"].as_str() {
            entry.push_str(": ");
            entry.push_str(title);
        }
        let _ = writeln!(out, "{}", entry);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn audit_lists_issue_details() {
        let text = describe_audit(&json!({
            "valid": false,
            "findings": [{
                "owner": "A",
                "rule_id": "r1",
                "issue": { "code": "dangling_target", "target": "C" }
            }]
        }));
        assert!(text.contains("A / r1: dangling_target (target=C)"));
    }

    #[test]
    fn navigation_text() {
        assert_eq!(
            describe_navigation(&json!({ "kind": "jump", "question_id": "C" })),
            "Jump to C"
        );
        assert_eq!(describe_navigation(&json!({ "kind": "end" })), "End of survey");
    }
}
