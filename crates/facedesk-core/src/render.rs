//! Displayable view of a recognition outcome.

use crate::types::{RecognitionResult, TopMatch};
use crate::workflow::{failure_message, Outcome};

/// Scores above this are highlighted as strong matches.
const STRONG_MATCH_SCORE: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRow {
    pub name: String,
    pub score_pct: String,
    pub strong: bool,
}

impl std::fmt::Display for MatchRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} — {}", self.name, self.score_pct)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub tone: Tone,
    /// Matched name, `Unknown`, or `Error`.
    pub headline: String,
    /// Confidence line on success, error text on failure.
    pub detail: String,
    pub description: Option<String>,
    pub matches: Vec<MatchRow>,
    pub processing_time: Option<String>,
}

impl ResultView {
    pub fn from_outcome(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Response(result) => Self::from_result(result),
            Outcome::Failed { message } => Self {
                tone: Tone::Error,
                headline: "Error".into(),
                detail: message.clone(),
                description: None,
                matches: Vec::new(),
                processing_time: None,
            },
        }
    }

    pub fn from_result(result: &RecognitionResult) -> Self {
        let (tone, headline, detail) = if !result.success() {
            (Tone::Error, "Error".to_string(), failure_message(result).to_string())
        } else {
            let confidence = format!("Confidence: {}", percent(result.confidence()));
            if result.recognized() {
                (Tone::Success, result.person_name().to_string(), confidence)
            } else {
                (Tone::Warning, "Unknown".to_string(), confidence)
            }
        };

        Self {
            tone,
            headline,
            detail,
            description: result
                .description()
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            matches: result.top_matches().iter().map(match_row).collect(),
            processing_time: Some(format!("Processing Time: {:.3}s", result.processing_time())),
        }
    }
}

impl std::fmt::Display for ResultView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = match self.tone {
            Tone::Success => '✓',
            Tone::Warning => '?',
            Tone::Error => '!',
        };
        writeln!(f, "[{marker}] {}", self.headline)?;
        if !self.detail.is_empty() {
            writeln!(f, "    {}", self.detail)?;
        }
        if let Some(description) = &self.description {
            writeln!(f)?;
            writeln!(f, "Description")?;
            writeln!(f, "    {description}")?;
        }
        if !self.matches.is_empty() {
            writeln!(f)?;
            writeln!(f, "Top Matches")?;
            for row in &self.matches {
                let flag = if row.strong { '*' } else { ' ' };
                writeln!(f, "  {flag} {row}")?;
            }
        }
        if let Some(time) = &self.processing_time {
            writeln!(f)?;
            writeln!(f, "{time}")?;
        }
        Ok(())
    }
}

fn match_row(m: &TopMatch) -> MatchRow {
    MatchRow {
        name: m.name.clone(),
        score_pct: percent(m.score),
        strong: m.score > STRONG_MATCH_SCORE,
    }
}

/// A [0, 1] fraction as a percentage with one decimal, e.g. `87.0%`.
fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(value: serde_json::Value) -> RecognitionResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_recognized_view() {
        let view = ResultView::from_result(&result(json!({
            "success": true,
            "recognized": true,
            "person_name": "Alice",
            "confidence": 0.87,
            "top_matches": [{"name": "Alice", "score": 0.87}, {"name": "Bob", "score": 0.41}],
            "processing_time": 0.12
        })));

        assert_eq!(view.tone, Tone::Success);
        assert_eq!(view.headline, "Alice");
        assert_eq!(view.detail, "Confidence: 87.0%");
        assert_eq!(view.matches[0].to_string(), "Alice — 87.0%");
        assert!(view.matches[0].strong);
        assert_eq!(view.matches[1].to_string(), "Bob — 41.0%");
        assert!(!view.matches[1].strong);
        assert_eq!(view.processing_time.as_deref(), Some("Processing Time: 0.120s"));
    }

    #[test]
    fn test_confidence_rounds_to_one_decimal() {
        let view = ResultView::from_result(&result(json!({
            "success": true, "recognized": true, "person_name": "Carol", "confidence": 0.91237
        })));
        assert_eq!(view.detail, "Confidence: 91.2%");
    }

    #[test]
    fn test_failure_view_never_shows_confidence() {
        let view = ResultView::from_result(&result(json!({
            "success": false, "error": "No face detected", "confidence": 0.5
        })));
        assert_eq!(view.tone, Tone::Error);
        assert_eq!(view.headline, "Error");
        assert_eq!(view.detail, "No face detected");
        assert!(!view.to_string().contains("Confidence"));
    }

    #[test]
    fn test_failure_view_without_error_matches_notification() {
        for body in [json!({"success": false}), json!({"success": false, "error": ""})] {
            let result = result(body);
            let view = ResultView::from_result(&result);
            assert_eq!(view.detail, "Recognition failed");
            assert_eq!(Outcome::Response(result).classify().0, view.detail);
        }
    }

    #[test]
    fn test_unrecognized_view() {
        let view = ResultView::from_result(&result(json!({
            "success": true, "recognized": false, "person_name": "unknown", "confidence": 0.22
        })));
        assert_eq!(view.tone, Tone::Warning);
        assert_eq!(view.headline, "Unknown");
        assert_eq!(view.detail, "Confidence: 22.0%");
    }

    #[test]
    fn test_description_only_when_present() {
        let with = ResultView::from_result(&result(json!({
            "success": true, "recognized": true, "person_name": "Dan", "description": "Night shift"
        })));
        assert_eq!(with.description.as_deref(), Some("Night shift"));
        assert!(with.to_string().contains("Description\n    Night shift"));

        let empty = ResultView::from_result(&result(json!({
            "success": true, "recognized": true, "person_name": "Dan", "description": ""
        })));
        assert!(empty.description.is_none());
    }

    #[test]
    fn test_request_failure_view() {
        let view = ResultView::from_outcome(&Outcome::Failed {
            message: "Failed to connect to recognition service".into(),
        });
        assert_eq!(view.headline, "Error");
        assert!(view.matches.is_empty());
        assert!(view.processing_time.is_none());
        assert_eq!(
            view.to_string(),
            "[!] Error\n    Failed to connect to recognition service\n"
        );
    }
}
