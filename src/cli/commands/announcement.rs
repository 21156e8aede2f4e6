//! Announcement Command
//!
//! Print the resolved announcement publish schedule for a course.

use std::path::Path;

use console::style;

use crate::announce::{AnnouncementDocument, schedule};
use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::course::CourseDocument;
use crate::types::Result;

pub struct AnnouncementArgs {
    /// Course selector (document key or Canvas course id)
    pub course: String,
}

pub fn run(config_file: Option<&Path>, args: AnnouncementArgs) -> Result<()> {
    let out = Output::new();

    let config = ConfigLoader::load(config_file)?;
    let courses = CourseDocument::load(&config.documents.courses_file)?;
    let course = courses.resolve(&args.course)?;

    let announcements = AnnouncementDocument::load(&config.documents.announcements_file)?;
    let entries = schedule(course, &announcements.announcements);

    out.section(&format!("Announcement schedule — {}", course.name));
    for entry in &entries {
        println!(
            "{}  week {:>2}  {}",
            entry.publish_date,
            entry.week,
            style(&entry.title).bold()
        );
    }
    out.success(&format!("{} announcement(s) scheduled", entries.len()));

    Ok(())
}
