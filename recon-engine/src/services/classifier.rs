//! Filename classification
//!
//! Maps a filename to a destination queue and subscription id using the
//! ordered include/exclude keyword rules of each queue. Pure: no I/O.

use crate::config::{ClassificationRule, ReconConfig};
use std::path::Path;

/// Named, ordered rule set of one queue
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub queue: String,
    pub rules: Vec<ClassificationRule>,
}

/// Classification result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Matched {
        queue: String,
        subscription_id: String,
    },
    /// No rule in any rule set matched; the file is skipped
    NotFound,
}

/// Classify a filename against rule sets in priority order
///
/// The first rule (in declaration order, within the first rule set in
/// priority order) whose include keywords intersect the lowercased stem and
/// whose exclude keywords do not, wins.
pub fn classify(filename: &str, rule_sets: &[RuleSet]) -> Classification {
    let stem = normalized_stem(filename);

    for rule_set in rule_sets {
        if let Some(rule) = rule_set.rules.iter().find(|rule| rule_matches(rule, &stem)) {
            return Classification::Matched {
                queue: rule_set.queue.clone(),
                subscription_id: rule.subscription_id.clone(),
            };
        }
    }

    Classification::NotFound
}

/// Lowercased file stem (extension and directories dropped)
fn normalized_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| filename.to_lowercase())
}

fn rule_matches(rule: &ClassificationRule, stem: &str) -> bool {
    let contains = |keyword: &String| {
        let keyword = keyword.trim().to_lowercase();
        !keyword.is_empty() && stem.contains(&keyword)
    };

    rule.include.iter().any(contains) && !rule.exclude.iter().any(contains)
}

/// Classifier over the configured queues
#[derive(Debug, Clone)]
pub struct Classifier {
    rule_sets: Vec<RuleSet>,
}

impl Classifier {
    pub fn new(rule_sets: Vec<RuleSet>) -> Self {
        Self { rule_sets }
    }

    /// Rule sets in the configured queue order
    pub fn from_config(config: &ReconConfig) -> Self {
        Self::new(
            config
                .queues
                .iter()
                .map(|queue| RuleSet {
                    queue: queue.name.clone(),
                    rules: queue.rules.clone(),
                })
                .collect(),
        )
    }

    /// Classify across every rule set
    pub fn classify(&self, filename: &str) -> Classification {
        classify(filename, &self.rule_sets)
    }

    /// Classify using only the named queue's rule set
    pub fn classify_in(&self, filename: &str, queue: &str) -> Classification {
        let scoped: Vec<RuleSet> = self
            .rule_sets
            .iter()
            .filter(|set| set.queue.eq_ignore_ascii_case(queue))
            .cloned()
            .collect();
        classify(filename, &scoped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_classifier() -> Classifier {
        Classifier::from_config(&ReconConfig::default())
    }

    fn matched(queue: &str, subscription_id: &str) -> Classification {
        Classification::Matched {
            queue: queue.to_string(),
            subscription_id: subscription_id.to_string(),
        }
    }

    #[test]
    fn test_bws_matches_first_euro_rule() {
        let classifier = default_classifier();
        assert_eq!(
            classifier.classify("BWS_2024.txt"),
            matched("euro", "sub_YK5GU0000019")
        );
    }

    #[test]
    fn test_exclude_keyword_skips_rule() {
        let classifier = default_classifier();
        // cdpg rule excludes "dolares", so the dolares rule picks it up
        assert_eq!(
            classifier.classify("CDPG_DOLARES_0101.txt"),
            matched("euro", "sub_YK5GU0000022")
        );
        assert_eq!(
            classifier.classify("cdpg_soles.txt"),
            matched("euro", "sub_YK5GU0000020")
        );
    }

    #[test]
    fn test_queue_priority_order() {
        let classifier = default_classifier();
        // "rec" is a udep keyword, but "eur" in the euro set wins first
        assert_eq!(
            classifier.classify("EUR_rec.txt"),
            matched("euro", "sub_YK5GU0000021")
        );
        assert_eq!(
            classifier.classify("rec_2103093.txt"),
            matched("udep", "sub_YK5GU0000022")
        );
    }

    #[test]
    fn test_extension_is_ignored() {
        let classifier = default_classifier();
        assert_eq!(classifier.classify("report.eur"), Classification::NotFound);
    }

    #[test]
    fn test_no_match_returns_not_found() {
        let classifier = default_classifier();
        assert_eq!(
            classifier.classify("unknown_format.txt"),
            Classification::NotFound
        );
    }

    #[test]
    fn test_classify_in_scopes_to_queue() {
        let classifier = default_classifier();
        assert_eq!(
            classifier.classify_in("sbp_0101.txt", "udep"),
            matched("udep", "sub_YK5GU0000023")
        );
        assert_eq!(
            classifier.classify_in("sbp_0101.txt", "nope"),
            Classification::NotFound
        );
    }

    #[test]
    fn test_directory_components_are_ignored() {
        let rule_sets = vec![RuleSet {
            queue: "q".to_string(),
            rules: vec![ClassificationRule::new("sub_1", &["inbox"], &[])],
        }];
        assert_eq!(classify("inbox/file.txt", &rule_sets), Classification::NotFound);
    }
}
