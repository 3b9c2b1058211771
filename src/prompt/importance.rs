// src/prompt/importance.rs

/// Instruction template for rating a change log summary.
/// `{summary}` is replaced verbatim with the row's summary text.
const IMPORTANCE_TEMPLATE: &str = r#"
You are an expert software documentation analyst. Your task is to review the following change log summary and classify its importance based on the potential impact it has on a user's workflow, integration, or understanding of the system's core capabilities.

Classification Criteria:

* Low: Cosmetic/housekeeping changes, non-breaking documentation updates, renaming of internal features, minor textual clarifications, or adding non-core helper functions.
* Medium: New non-breaking features, adding a new method/resource that doesn't affect existing integrations, introducing a new event type, or important policy/guideline updates.
* High: Changes requiring user action or significant integration impact. Breaking changes to an API, removal of an existing feature/endpoint, or fundamental changes to core product functionality.
* Critical: Immediate and urgent action required. Major security vulnerabilities, core system outages, or changes that could lead to data loss.

Change Log Summary to Rate:
---
{summary}
---

Constraint:
You MUST only output a single word, which must be one of the defined importance levels: Low, Medium, High, or Critical. Do not include any explanations, markdown, or other text.
"#;

/// Builds the classification prompt for one change log summary
pub fn build_importance_prompt(summary: &str) -> String {
    IMPORTANCE_TEMPLATE.replacen("{summary}", summary, 1)
}
