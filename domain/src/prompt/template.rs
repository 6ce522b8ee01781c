//! Prompt templates for extraction sampling

use crate::sampling::PromptDiversification;
use crate::schema::{FieldKind, Schema};

const ROLE_TEMPLATES: [&str; 10] = [
    "You are a cautious analyst who identifies potential problems.",
    "You are an optimistic strategist who sees opportunities.",
    "You are a pragmatic project manager focused on delivery.",
    "You are a critical reviewer looking for gaps and weaknesses.",
    "You are a creative problem-solver who thinks unconventionally.",
    "You are a risk-averse auditor who prioritises safety.",
    "You are an experienced practitioner who has seen similar situations.",
    "You are a fresh perspective from outside the domain.",
    "You are a detail-oriented specialist who examines specifics.",
    "You are a big-picture thinker who considers systemic effects.",
];

const INSTRUCTION_VARIATIONS: [&str; 10] = [
    "Analyse this and provide your assessment:",
    "Consider this carefully and share your findings:",
    "Review the following and identify key points:",
    "Examine this situation and provide insights:",
    "Evaluate this and give your professional opinion:",
    "Study this and highlight what stands out:",
    "Assess this from multiple angles:",
    "Look at this critically and share observations:",
    "Consider what others might miss in this:",
    "Think through this systematically:",
];

const PERSPECTIVE_SHIFTS: [&str; 10] = [
    "Answer as the sponsor accountable for the budget would see it.",
    "Answer from the point of view of the delivery team doing the work.",
    "Answer from the point of view of the end users affected.",
    "Answer as an external assurance reviewer would.",
    "Answer with a twelve-month horizon in mind.",
    "Answer focusing on what could happen in the next four weeks.",
    "Answer as a supplier or third party involved in delivery.",
    "Answer as the finance function would assess it.",
    "Answer from an operational service perspective after go-live.",
    "Answer as someone who has seen a similar initiative fail.",
];

/// Templates for generating prompts for each sample
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt sent with every extraction call
    pub fn extraction_system() -> &'static str {
        r#"You are a careful analyst producing structured answers.
Reply with a single JSON object and nothing else.
Use exactly the field names you are given. Omit a field rather than guessing."#
    }

    /// Base extraction prompt for a schema
    pub fn extraction(schema: &Schema, query: &str, context: Option<&str>) -> String {
        let mut prompt = String::new();

        if !schema.instructions.is_empty() {
            prompt.push_str(&schema.instructions);
            prompt.push_str("\n\n");
        }

        prompt.push_str(&format!(
            "Return one {} object with these fields:\n",
            schema.display_title()
        ));
        for field in &schema.fields {
            let kind = match field.kind {
                FieldKind::Numeric => "number".to_string(),
                FieldKind::Categorical => format!("one of {}", field.allowed.join(", ")),
                FieldKind::Text => "text".to_string(),
                FieldKind::List => "array of strings".to_string(),
            };
            let presence = if field.required { "required" } else { "optional" };
            prompt.push_str(&format!("- {} ({}, {})", field.name, kind, presence));
            if !field.description.is_empty() {
                prompt.push_str(&format!(": {}", field.description));
            }
            prompt.push('\n');
        }
        prompt.push_str("\nRespond with JSON only, no commentary.\n");

        if let Some(context) = context {
            prompt.push_str(&format!("\n## Context\n\n{}\n", context.trim()));
        }

        prompt.push_str(&format!("\n## Question\n\n{}\n", query.trim()));
        prompt
    }

    /// Prefix `base` with the diversification templates for `sample_index`.
    pub fn diversify(base: &str, strategy: PromptDiversification, sample_index: usize) -> String {
        let slot = sample_index % ROLE_TEMPLATES.len();
        let mut parts = Vec::new();

        if strategy.uses_roles() {
            parts.push(ROLE_TEMPLATES[slot]);
        }
        if strategy.uses_instructions() {
            parts.push(INSTRUCTION_VARIATIONS[slot]);
        }
        if strategy.uses_perspectives() {
            parts.push(PERSPECTIVE_SHIFTS[slot]);
        }

        if parts.is_empty() {
            base.to_string()
        } else {
            format!("{}\n\n{}", parts.join(" "), base)
        }
    }
}
