//! Built-in project-management schemas

use super::definition::Schema;
use super::field::{FieldConstraint, SchemaField};

pub const RISK: &str = "risk";
pub const ESTIMATE: &str = "estimate";
pub const RECOMMENDATION: &str = "recommendation";
pub const MILESTONE: &str = "milestone";
pub const BARRIER: &str = "barrier";
pub const OUTCOME_MEASURE: &str = "outcome_measure";
pub const STAKEHOLDER_IMPACT: &str = "stakeholder_impact";

const PRIORITIES: [&str; 3] = ["High", "Medium", "Low"];

/// All built-in schemas, in registration order.
pub fn all() -> Vec<Schema> {
    vec![
        risk(),
        estimate(),
        recommendation(),
        milestone(),
        barrier(),
        outcome_measure(),
        stakeholder_impact(),
    ]
}

pub fn risk() -> Schema {
    Schema::new(RISK)
        .with_title("Risk Analysis")
        .with_instructions("Identify the single most significant risk in the material.")
        .with_field(SchemaField::text("description").describe("Clear description of the risk"))
        .with_field(
            SchemaField::categorical(
                "category",
                ["Technical", "Commercial", "Schedule", "Resource", "External"],
            )
            .describe("Risk category"),
        )
        .with_field(
            SchemaField::numeric("probability").describe("1-5 scale (1=Very Low, 5=Very High)"),
        )
        .with_field(SchemaField::numeric("impact").describe("1-5 scale (1=Very Low, 5=Very High)"))
        .with_field(SchemaField::text("mitigation").describe("Recommended mitigation action"))
        .with_field(
            SchemaField::text("owner")
                .optional()
                .describe("Who should own this risk, if identifiable"),
        )
        .with_field(
            SchemaField::categorical("status", ["Open", "Mitigating", "Closed", "Accepted"])
                .optional()
                .describe("Current status, default Open"),
        )
}

pub fn estimate() -> Schema {
    Schema::new(ESTIMATE)
        .with_title("Effort/Cost Estimate")
        .with_instructions("Produce a single estimate for the work described.")
        .with_field(SchemaField::text("description").describe("What is being estimated"))
        .with_field(SchemaField::numeric("value").describe("Point estimate"))
        .with_field(
            SchemaField::text("unit").describe("Unit of measurement (days, hours, GBP, USD)"),
        )
        .with_field(
            SchemaField::numeric("range_low")
                .optional()
                .describe("Lower bound of a reasonable range"),
        )
        .with_field(
            SchemaField::numeric("range_high")
                .optional()
                .describe("Upper bound of a reasonable range"),
        )
        .with_field(
            SchemaField::list("assumptions")
                .optional()
                .describe("Key assumptions"),
        )
        .with_field(
            SchemaField::text("confidence_notes")
                .optional()
                .describe("Notes about estimate confidence"),
        )
        .with_constraint(FieldConstraint::ordered("range_low", "value"))
        .with_constraint(FieldConstraint::ordered("value", "range_high"))
}

pub fn recommendation() -> Schema {
    Schema::new(RECOMMENDATION)
        .with_title("Recommendations")
        .with_instructions("Recommend the single most valuable action.")
        .with_field(SchemaField::text("action").describe("Clear, actionable recommendation"))
        .with_field(SchemaField::text("rationale").describe("Why this is recommended"))
        .with_field(SchemaField::categorical("priority", PRIORITIES).describe("Priority"))
        .with_field(
            SchemaField::text("owner")
                .optional()
                .describe("Suggested owner or responsible party"),
        )
        .with_field(
            SchemaField::text("timeframe")
                .optional()
                .describe("When this should be completed"),
        )
        .with_field(
            SchemaField::list("dependencies")
                .optional()
                .describe("What this depends on"),
        )
}

pub fn milestone() -> Schema {
    Schema::new(MILESTONE)
        .with_title("Milestones")
        .with_instructions("Identify the next key milestone.")
        .with_field(SchemaField::text("name").describe("Short milestone name"))
        .with_field(SchemaField::text("description").describe("What this milestone represents"))
        .with_field(
            SchemaField::text("target_date")
                .optional()
                .describe("Target completion date"),
        )
        .with_field(
            SchemaField::list("dependencies")
                .optional()
                .describe("What must complete before this"),
        )
        .with_field(
            SchemaField::list("deliverables")
                .optional()
                .describe("What is delivered at this milestone"),
        )
}

pub fn barrier() -> Schema {
    Schema::new(BARRIER)
        .with_title("Barriers and Blockers")
        .with_instructions("Identify the most significant barrier to delivery.")
        .with_field(SchemaField::text("description").describe("Clear description of the barrier"))
        .with_field(
            SchemaField::categorical(
                "barrier_theme",
                ["Leadership", "Data", "Digital", "Skills", "Procurement", "Risk"],
            )
            .describe("Barrier theme"),
        )
        .with_field(SchemaField::categorical("severity", PRIORITIES).describe("Severity"))
        .with_field(
            SchemaField::list("affected_personas")
                .describe("Who is affected (Project Lead, Programme Lead, Business Lead)"),
        )
        .with_field(
            SchemaField::list("recommended_actions")
                .describe("Actions to overcome this barrier"),
        )
        .with_field(
            SchemaField::list("success_metrics")
                .optional()
                .describe("How to measure if the barrier is overcome"),
        )
}

pub fn outcome_measure() -> Schema {
    Schema::new(OUTCOME_MEASURE)
        .with_title("Outcome Measures")
        .with_instructions("Propose the single most useful outcome measure.")
        .with_field(SchemaField::text("measure").describe("Name of the measure"))
        .with_field(
            SchemaField::text("description").describe("What it measures and why it matters"),
        )
        .with_field(SchemaField::text("target").optional().describe("Target value or state"))
        .with_field(
            SchemaField::text("baseline")
                .optional()
                .describe("Current baseline if known"),
        )
        .with_field(
            SchemaField::text("measurement_method")
                .optional()
                .describe("How it will be measured"),
        )
        .with_field(
            SchemaField::text("frequency")
                .optional()
                .describe("How often it will be measured"),
        )
}

pub fn stakeholder_impact() -> Schema {
    Schema::new(STAKEHOLDER_IMPACT)
        .with_title("Stakeholder Impacts")
        .with_instructions("Describe the impact on the most affected stakeholder group.")
        .with_field(SchemaField::text("stakeholder").describe("Stakeholder group or individual"))
        .with_field(SchemaField::text("impact_description").describe("How they are impacted"))
        .with_field(
            SchemaField::categorical("sentiment", ["Positive", "Negative", "Neutral", "Mixed"])
                .describe("Overall sentiment"),
        )
        .with_field(
            SchemaField::list("actions_required")
                .optional()
                .describe("Actions needed to address this stakeholder"),
        )
        .with_field(
            SchemaField::text("communication_needs")
                .optional()
                .describe("What communication is needed"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtins_validate() {
        for schema in all() {
            schema
                .validate()
                .unwrap_or_else(|e| panic!("{} invalid: {e}", schema.name));
        }
    }

    #[test]
    fn test_risk_fields() {
        let schema = risk();
        assert_eq!(schema.fields.len(), 7);
        let category = schema.field("category").unwrap();
        assert_eq!(category.match_category("schedule"), Some("Schedule"));
        assert!(!schema.field("owner").unwrap().required);
    }

    #[test]
    fn test_builtin_names_unique() {
        let mut names: Vec<_> = all().into_iter().map(|s| s.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 7);
    }
}
