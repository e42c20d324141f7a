use serde_json::Value;

/// Percentage of answered leaf fields in a nested answers object.
///
/// A leaf counts as answered iff it is a string whose trimmed form is
/// non-empty. Descends recursively into nested objects, so the flat Simple
/// shape and the nested Advanced shape are handled uniformly. Returns 0 for
/// an object with no leaves. Always recomputed server-side on save; the
/// client-supplied value is ignored.
pub fn calculate_progress(answers: &Value) -> i32 {
    let mut answered = 0u32;
    let mut total = 0u32;
    walk(answers, &mut answered, &mut total);
    if total == 0 {
        return 0;
    }
    (100.0 * f64::from(answered) / f64::from(total)).round() as i32
}

fn walk(value: &Value, answered: &mut u32, total: &mut u32) {
    match value {
        Value::Object(map) => {
            for child in map.values() {
                walk(child, answered, total);
            }
        }
        leaf => {
            *total += 1;
            if let Value::String(s) = leaf {
                if !s.trim().is_empty() {
                    *answered += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_is_zero() {
        assert_eq!(calculate_progress(&json!({})), 0);
    }

    #[test]
    fn all_empty_strings_is_zero() {
        let answers = json!({
            "assess": {"marketResearch": "", "consumerSegmentation": "  "},
            "monitor": {"brandTracking": ""}
        });
        assert_eq!(calculate_progress(&answers), 0);
    }

    #[test]
    fn all_filled_is_one_hundred() {
        let answers = json!({
            "assess": {"marketResearch": "surveys", "consumerSegmentation": "needs-based"},
            "monitor": {"brandTracking": "tracker"}
        });
        assert_eq!(calculate_progress(&answers), 100);
    }

    #[test]
    fn one_of_ten_leaves_is_ten_percent() {
        let answers = json!({
            "assess": {
                "marketResearch": "x",
                "consumerSegmentation": "",
                "competitiveAnalysis": "",
                "problemSolutionFit": ""
            },
            "implement": {
                "brandPositioning": "",
                "visualIdentity": "",
                "channelStrategy": "",
                "messagingConsistency": ""
            },
            "monitor": {
                "brandTracking": "",
                "customerFeedback": ""
            }
        });
        assert_eq!(calculate_progress(&answers), 10);
    }

    #[test]
    fn advanced_nested_shape_counts_sub_fields() {
        let answers = json!({
            "assess": {
                "marketResearch": {
                    "currentApproach": "agency tracker",
                    "gaps": ""
                }
            }
        });
        assert_eq!(calculate_progress(&answers), 50);
    }

    #[test]
    fn non_string_leaves_count_toward_total_only() {
        let answers = json!({"assess": {"marketResearch": 7, "consumerSegmentation": "done"}});
        assert_eq!(calculate_progress(&answers), 50);
    }

    #[test]
    fn deterministic_on_identical_input() {
        let answers = json!({"assess": {"a": "x", "b": ""}, "monitor": {"c": "y"}});
        assert_eq!(calculate_progress(&answers), calculate_progress(&answers));
        assert_eq!(calculate_progress(&answers), 67);
    }
}
