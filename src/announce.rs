//! Announcement Scheduling
//!
//! Maps week-keyed announcement templates onto concrete publish dates using
//! the course start date. Scheduling is pure date arithmetic; nothing here
//! talks to the network.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::course::WEEK_TOKEN;
use crate::course::{Course, date_for_week};
use crate::types::{Result, ScribeError};
use chrono::NaiveDate;

/// One announcement template, keyed by course week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub week: u32,
    pub title: String,
    /// HTML body
    pub content: String,
}

/// The `announcements.json` document: one template list, applied to
/// whichever course is selected at schedule time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementDocument {
    pub announcements: Vec<Announcement>,
}

impl AnnouncementDocument {
    /// Load and validate an announcements file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let doc: Self = serde_json::from_str(&raw)?;
        doc.validate()?;
        debug!(
            path = %path.display(),
            announcements = doc.announcements.len(),
            "Loaded announcement document"
        );
        Ok(doc)
    }

    fn validate(&self) -> Result<()> {
        if self.announcements.is_empty() {
            return Err(ScribeError::Config(
                "announcement document defines no announcements".to_string(),
            ));
        }
        for item in &self.announcements {
            if item.week == 0 {
                return Err(ScribeError::Config(format!(
                    "announcement '{}' has week 0; weeks start at 1",
                    item.title
                )));
            }
            if item.title.trim().is_empty() {
                return Err(ScribeError::Config(format!(
                    "announcement for week {} has an empty title",
                    item.week
                )));
            }
        }
        Ok(())
    }
}

/// An announcement resolved to a concrete publish date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub week: u32,
    pub title: String,
    pub content: String,
    pub publish_date: NaiveDate,
}

/// Build the publish schedule for one course.
///
/// Week `w` publishes on the first day of that course week. The `{w}` token
/// in titles and bodies is replaced with the week number. Output is sorted
/// by week; announcements sharing a week keep their input order.
pub fn schedule(course: &Course, announcements: &[Announcement]) -> Vec<ScheduleEntry> {
    let mut entries: Vec<ScheduleEntry> = announcements
        .iter()
        .map(|a| {
            let week_str = a.week.to_string();
            ScheduleEntry {
                week: a.week,
                title: a.title.replace(WEEK_TOKEN, &week_str),
                content: a.content.replace(WEEK_TOKEN, &week_str),
                publish_date: date_for_week(course.course_start_date, a.week),
            }
        })
        .collect();
    entries.sort_by_key(|e| e.week);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn course() -> Course {
        Course {
            course_id: "20574".to_string(),
            course_start_date: NaiveDate::from_ymd_opt(2025, 9, 2).unwrap(),
            name: "Networking".to_string(),
            weeks: Default::default(),
        }
    }

    #[test]
    fn test_week_token_and_date() {
        let entries = schedule(
            &course(),
            &[Announcement {
                week: 1,
                title: "Week {w}".to_string(),
                content: "Welcome to week {w}!".to_string(),
            }],
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Week 1");
        assert_eq!(entries[0].content, "Welcome to week 1!");
        assert_eq!(
            entries[0].publish_date,
            NaiveDate::from_ymd_opt(2025, 9, 2).unwrap()
        );
    }

    #[test]
    fn test_later_week_offsets_by_seven_days() {
        let entries = schedule(
            &course(),
            &[Announcement {
                week: 3,
                title: "Midpoint".to_string(),
                content: "No token here".to_string(),
            }],
        );
        assert_eq!(
            entries[0].publish_date,
            NaiveDate::from_ymd_opt(2025, 9, 16).unwrap()
        );
    }

    #[test]
    fn test_sorted_by_week_preserving_ties() {
        let input = vec![
            Announcement {
                week: 2,
                title: "b".into(),
                content: String::new(),
            },
            Announcement {
                week: 1,
                title: "a".into(),
                content: String::new(),
            },
            Announcement {
                week: 2,
                title: "c".into(),
                content: String::new(),
            },
        ];
        let entries = schedule(&course(), &input);
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[test]
    fn test_load_rejects_week_zero() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"announcements": [{{"week": 0, "title": "Bad", "content": "x"}}]}}"#
        )
        .unwrap();

        let err = AnnouncementDocument::load(file.path()).unwrap_err();
        assert!(matches!(err, ScribeError::Config(_)));
        assert!(err.to_string().contains("week 0"));
    }

    #[test]
    fn test_load_rejects_empty_list() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"announcements": []}}"#).unwrap();
        assert!(AnnouncementDocument::load(file.path()).is_err());
    }

    #[test]
    fn test_load_roundtrip() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"announcements": [
                {{"week": 2, "title": "Quiz {{w}}", "content": "<p>Quiz opens in week {{w}}.</p>"}},
                {{"week": 1, "title": "Welcome", "content": "<p>Hello!</p>"}}
            ]}}"#
        )
        .unwrap();

        let doc = AnnouncementDocument::load(file.path()).unwrap();
        assert_eq!(doc.announcements.len(), 2);

        let entries = schedule(&course(), &doc.announcements);
        assert_eq!(entries[0].title, "Welcome");
        assert_eq!(entries[1].title, "Quiz 2");
        assert_eq!(entries[1].content, "<p>Quiz opens in week 2.</p>");
    }
}
