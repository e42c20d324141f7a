use std::sync::Arc;

use serde_json::Value;

use crate::rubric::Rubric;

/// Builds the evaluation prompt from the rubric and the user's answers.
///
/// The rubric is inlined in full rather than summarized: scoring quality
/// depends on the model seeing the complete scale text for every criterion.
pub struct EvaluationPromptBuilder {
    rubric: Arc<Rubric>,
}

impl EvaluationPromptBuilder {
    pub fn new(rubric: Arc<Rubric>) -> Self {
        Self { rubric }
    }

    pub fn build(&self, answers: &Value) -> String {
        let mut prompt = String::from(
            "You are evaluating a brand-strategy self-assessment. Score the \
             respondent's answers against the rubric below.\n",
        );

        prompt.push_str("\n=== SCORING RUBRIC ===\n");
        for phase in self.rubric.phases() {
            prompt.push_str(&format!("\n## Phase: {}\n", phase.phase.title()));
            for criterion in &phase.criteria {
                prompt.push_str(&format!("\n### {}\n", criterion.label));
                prompt.push_str(&format!("Question: {}\n", criterion.question));
                prompt.push_str("Indicators of maturity:\n");
                for indicator in criterion.indicators {
                    prompt.push_str(&format!("- {}\n", indicator));
                }
                prompt.push_str("Scale (1-10):\n");
                for band in criterion.scale {
                    prompt.push_str(&format!("- {}-{}: {}\n", band.from, band.to, band.text));
                }
            }
        }

        prompt.push_str("\n=== RECOMMENDED ACTIONS BY SCORE ===\n");
        for phase in self.rubric.phases() {
            prompt.push_str(&format!("\n## Phase: {}\n", phase.phase.title()));
            for criterion in &phase.criteria {
                prompt.push_str(&format!("\n### {}\n", criterion.label));
                for band in criterion.actions {
                    prompt.push_str(&format!("- {}-{}: {}\n", band.from, band.to, band.text));
                }
            }
        }

        prompt.push_str("\n=== RESPONDENT ANSWERS ===\n");
        prompt.push_str(
            &serde_json::to_string_pretty(answers).unwrap_or_else(|_| answers.to_string()),
        );

        prompt.push_str(
            "\n\n=== OUTPUT FORMAT ===\n\
             Score every rubric criterion from 1 to 10 using its scale text. \
             Unanswered or empty answers score low. Write feedback and a \
             recommendation per criterion, grounded in the action texts above, \
             plus an overall summary.\n\
             Return ONLY a JSON object of this exact shape, with no surrounding \
             prose and no code fencing:\n\
             {\"scores\": {\"<criterion label>\": <integer 1-10>, ...}, \
             \"feedback\": {\"<criterion label>\": \"<text>\", ...}, \
             \"recommendations\": {\"<criterion label>\": \"<text>\", ...}, \
             \"overall\": \"<text>\"}",
        );

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_contains_rubric_answers_and_format() {
        let builder = EvaluationPromptBuilder::new(Arc::new(Rubric::new()));
        let answers = json!({"assess": {"marketResearch": "we run a yearly agency tracker"}});
        let prompt = builder.build(&answers);

        assert!(prompt.contains("Market Research Quality"));
        assert!(prompt.contains("Customer Feedback Loop"));
        assert!(prompt.contains("Phase: Implement"));
        assert!(prompt.contains("we run a yearly agency tracker"));
        assert!(prompt.contains("Return ONLY a JSON object"));
        assert!(prompt.contains("\"overall\""));
    }

    #[test]
    fn every_scale_band_is_inlined() {
        let rubric = Rubric::new();
        let builder = EvaluationPromptBuilder::new(Arc::new(rubric.clone()));
        let prompt = builder.build(&json!({}));
        for phase in rubric.phases() {
            for criterion in &phase.criteria {
                for band in criterion.scale {
                    assert!(prompt.contains(band.text), "missing scale text: {}", band.text);
                }
            }
        }
    }
}
