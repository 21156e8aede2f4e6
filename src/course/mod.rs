//! Course Model
//!
//! In-memory representation of a course, its weeks, and each week's few-shot
//! examples, loaded from the `courses.json` document. The document is owned
//! by the configuration layer and treated as read-only by every component.

pub mod week;

pub use week::{date_for_week, resolve_week};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use crate::constants::course as course_constants;
use crate::types::{Result, ScribeError};

/// A historical `(student_post, instructor_response)` pair used for few-shot
/// grounding. Order in the source list is preserved as a recency signal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Example {
    pub post: String,
    pub response: String,
}

/// Per-week course data
#[derive(Debug, Clone, Deserialize)]
pub struct WeekSpec {
    /// Canvas discussion topic id. Absence is a configuration error only
    /// when a discussion action targets this week.
    #[serde(default)]
    pub topic_id: Option<String>,
    /// Discussion prompt text for the week
    pub discussion_prompt: String,
    /// Historical post/response pairs, oldest first
    #[serde(default)]
    pub discussion_data: Vec<Example>,
}

impl WeekSpec {
    /// Usable examples: pairs where both sides are non-blank after trimming.
    pub fn examples(&self) -> Vec<Example> {
        self.discussion_data
            .iter()
            .filter(|e| !e.post.trim().is_empty() && !e.response.trim().is_empty())
            .map(|e| Example {
                post: e.post.trim().to_string(),
                response: e.response.trim().to_string(),
            })
            .collect()
    }
}

/// A single course: identity, start date, and week mapping.
///
/// Week numbers are unique and positive; contiguity is not required, a week
/// may simply be absent.
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    /// Canvas course id (numeric string)
    pub course_id: String,
    /// Course start date (ISO date); the start date itself is week 1
    pub course_start_date: NaiveDate,
    #[serde(default = "default_course_name")]
    pub name: String,
    /// Week number (string-keyed in JSON) to week data
    #[serde(default)]
    pub weeks: BTreeMap<u32, WeekSpec>,
}

fn default_course_name() -> String {
    "Unnamed Course".to_string()
}

impl Course {
    /// Look up a week, failing with `UnknownWeek` when absent.
    pub fn week(&self, week: u32) -> Result<&WeekSpec> {
        self.weeks.get(&week).ok_or_else(|| ScribeError::UnknownWeek {
            week,
            course: self.name.clone(),
        })
    }

    /// Resolve the discussion topic id for a week.
    ///
    /// Missing or placeholder topic ids (FILL_ME, TODO, TBD) are rejected
    /// here, at the point where a discussion action actually targets the
    /// week, not at document load.
    pub fn topic_for_week(&self, week: u32) -> Result<&str> {
        let spec = self.week(week)?;
        let topic = spec
            .topic_id
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ScribeError::Config(format!(
                    "missing topic_id for week {} in course '{}'",
                    week, self.name
                ))
            })?;

        if course_constants::TOPIC_ID_PLACEHOLDERS
            .iter()
            .any(|p| topic.eq_ignore_ascii_case(p))
        {
            return Err(ScribeError::Config(format!(
                "topic_id for week {} in course '{}' is a placeholder: {}",
                week, self.name, topic
            )));
        }

        Ok(topic)
    }
}

/// The `courses.json` document: course selector to course.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseDocument {
    pub courses: BTreeMap<String, Course>,
}

impl CourseDocument {
    /// Load and validate the course document.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading course document");
        let raw = fs::read_to_string(path)?;
        let doc: CourseDocument = serde_json::from_str(&raw)?;
        doc.validate()?;
        info!(courses = doc.courses.len(), "Loaded course document");
        Ok(doc)
    }

    /// Structural validation beyond what serde enforces.
    pub fn validate(&self) -> Result<()> {
        if self.courses.is_empty() {
            return Err(ScribeError::Config(
                "course document defines no courses".to_string(),
            ));
        }

        for (selector, course) in &self.courses {
            if !course.course_id.chars().all(|c| c.is_ascii_digit())
                || course.course_id.is_empty()
            {
                return Err(ScribeError::Config(format!(
                    "course '{}' has non-numeric course_id: {}",
                    selector, course.course_id
                )));
            }
            if course.weeks.contains_key(&0) {
                return Err(ScribeError::Config(format!(
                    "course '{}' defines week 0; week numbers start at 1",
                    selector
                )));
            }
        }

        Ok(())
    }

    /// Resolve a selector to a course: first by selector key, then by
    /// matching `course_id`.
    pub fn resolve(&self, selector: &str) -> Result<&Course> {
        if let Some(course) = self.courses.get(selector) {
            return Ok(course);
        }
        self.courses
            .values()
            .find(|c| c.course_id == selector)
            .ok_or_else(|| {
                ScribeError::Config(format!("course '{}' not found in course document", selector))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_doc() -> CourseDocument {
        let json = r#"{
            "courses": {
                "A": {
                    "course_id": "12345",
                    "course_start_date": "2025-09-02",
                    "name": "Intro to Networks",
                    "weeks": {
                        "1": {
                            "topic_id": "987",
                            "discussion_prompt": "Discuss the OSI model.",
                            "discussion_data": [
                                {"post": "Layers are confusing", "response": "Think of them as envelopes."},
                                {"post": " ", "response": "orphan"}
                            ]
                        },
                        "3": {
                            "topic_id": "FILL_ME",
                            "discussion_prompt": "Subnetting."
                        }
                    }
                }
            }
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resolve_by_selector_and_id() {
        let doc = sample_doc();
        assert_eq!(doc.resolve("A").unwrap().course_id, "12345");
        assert_eq!(doc.resolve("12345").unwrap().name, "Intro to Networks");
        assert!(doc.resolve("B").is_err());
    }

    #[test]
    fn test_week_gaps_allowed() {
        let doc = sample_doc();
        let course = doc.resolve("A").unwrap();
        assert!(course.week(1).is_ok());
        assert!(matches!(
            course.week(2),
            Err(ScribeError::UnknownWeek { week: 2, .. })
        ));
        assert!(course.week(3).is_ok());
    }

    #[test]
    fn test_blank_example_pairs_filtered() {
        let doc = sample_doc();
        let examples = doc.resolve("A").unwrap().week(1).unwrap().examples();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].post, "Layers are confusing");
    }

    #[test]
    fn test_placeholder_topic_rejected() {
        let doc = sample_doc();
        let course = doc.resolve("A").unwrap();
        assert_eq!(course.topic_for_week(1).unwrap(), "987");
        assert!(matches!(
            course.topic_for_week(3),
            Err(ScribeError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_numeric_id() {
        let json = r#"{"courses": {"A": {
            "course_id": "abc",
            "course_start_date": "2025-09-02",
            "weeks": {}
        }}}"#;
        let doc: CourseDocument = serde_json::from_str(json).unwrap();
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_document() {
        let doc: CourseDocument = serde_json::from_str(r#"{"courses": {}}"#).unwrap();
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"courses": {{"A": {{
                "course_id": "1",
                "course_start_date": "2025-09-02",
                "weeks": {{}}
            }}}}}}"#
        )
        .unwrap();
        let doc = CourseDocument::load(file.path()).unwrap();
        assert_eq!(doc.courses.len(), 1);
    }
}
