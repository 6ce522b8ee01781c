//! Console output formatter for run results

use colored::Colorize;
use concord_domain::{ConsensusResult, MiningResult, ReviewLevel, Schema};

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format_consensus(result: &ConsensusResult) -> String {
        let consensus = &result.consensus;
        let mut output = Self::header("Consensus");

        for (name, field) in &consensus.fields {
            let value = field
                .value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "  {:<24} {}  {}\n",
                name.cyan(),
                value,
                format!("({:.2}, {} present)", field.confidence, field.present_count).dimmed()
            ));
        }

        output.push_str(&format!(
            "\n{} {:.2}\n{} {}\n",
            "Confidence:".bold(),
            consensus.confidence,
            "Review:".bold(),
            Self::review(consensus.review_level)
        ));
        if let Some(reason) = &consensus.review_reason {
            output.push_str(&format!("  {}\n", reason));
        }

        if !consensus.outliers.is_empty() {
            output.push_str(&format!("\n{}\n", "Outliers:".yellow().bold()));
            for outlier in &consensus.outliers {
                output.push_str(&format!("  * sample {}: {}\n", outlier.sample_index, outlier.reason));
            }
        }

        output.push_str(&format!(
            "\n{}\n",
            format!(
                "samples {}/{} ({} failed, {} discarded){}{}  cost ${:.4} (saved ${:.4})  tokens {}  {} ms",
                result.samples_used,
                result.samples_requested,
                result.samples_failed,
                result.records_discarded,
                if result.early_stopped { ", early stop" } else { "" },
                if result.budget_exhausted { ", budget reached" } else { "" },
                result.cost_usd,
                result.cost_saved_usd,
                result.tokens_used.total(),
                result.latency_ms
            )
            .dimmed()
        ));
        output
    }

    pub fn format_mining(result: &MiningResult) -> String {
        let mining = &result.mining;
        let mut output = Self::header("Candidates");

        for (rank, candidate) in mining.candidates.iter().enumerate() {
            let novel = if mining.high_novelty.contains(&candidate.cluster_id) {
                format!(" {}", "novel".magenta())
            } else {
                String::new()
            };
            output.push_str(&format!(
                "\n{}{}\n",
                format!(
                    "#{} cluster {} ({} samples) score {:.2}",
                    rank + 1,
                    candidate.cluster_id,
                    candidate.cluster_size,
                    candidate.composite
                )
                .yellow()
                .bold(),
                novel
            ));
            for (field, value) in candidate.record.values() {
                output.push_str(&format!("  {:<24} {}\n", field.cyan(), value));
            }
        }

        output.push_str(&format!(
            "\n{} {} clusters via {} (diversity {:.2}, effective {:.2})\n",
            "Clusters:".bold(),
            mining.num_clusters,
            mining.tier,
            mining.diversity_score,
            mining.effective_diversity
        ));
        if let Some(separation) = mining.separation {
            output.push_str(&format!("{} {:.2}\n", "Separation:".bold(), separation));
        }
        if let Some(baseline) = &mining.consensus_baseline {
            output.push_str(&format!(
                "{} confidence {:.2}, {}\n",
                "Consensus baseline:".bold(),
                baseline.confidence,
                Self::review(baseline.review_level)
            ));
        }

        output.push_str(&format!(
            "\n{}\n",
            format!(
                "samples {} ({} failed, {} discarded, {} passed quality){}  cost ${:.4}  tokens {}  {} ms",
                result.samples_generated,
                result.samples_failed,
                result.records_discarded,
                mining.samples_passed_quality,
                if result.budget_exhausted { ", budget reached" } else { "" },
                result.cost_usd,
                result.tokens_used.total(),
                result.latency_ms
            )
            .dimmed()
        ));
        output
    }

    pub fn format_schemas<'a>(schemas: impl Iterator<Item = &'a Schema>) -> String {
        let mut output = String::new();
        for schema in schemas {
            let fields = schema
                .fields
                .iter()
                .map(|f| format!("{}:{}", f.name, f.kind.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!(
                "{:<20} {}\n{:<20} {}\n",
                schema.name.cyan().bold(),
                schema.display_title(),
                "",
                fields.dimmed()
            ));
        }
        output
    }

    pub fn format_json<T: serde::Serialize>(result: &T) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    fn header(title: &str) -> String {
        format!("{}\n{}\n", title.bold(), "=".repeat(title.len()))
    }

    fn review(level: ReviewLevel) -> colored::ColoredString {
        let label = level.to_string();
        match level {
            ReviewLevel::None => label.green(),
            ReviewLevel::SpotCheck => label.normal(),
            ReviewLevel::DetailedReview => label.yellow(),
            ReviewLevel::ExpertRequired => label.red().bold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_domain::SchemaRegistry;

    #[test]
    fn test_schema_listing_names_every_schema() {
        colored::control::set_override(false);
        let registry = SchemaRegistry::with_builtins();
        let listing = ConsoleFormatter::format_schemas(registry.iter());
        for name in registry.names() {
            assert!(listing.contains(name), "missing {name}");
        }
        assert!(listing.contains("severity:categorical"));
    }
}
