//! Discussion Command
//!
//! Generate a validated instructor response for a student discussion post.

use std::io::Read;
use std::path::Path;

use chrono::Local;
use tokio::runtime::Runtime;

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::course::{CourseDocument, resolve_week};
use crate::generate::{GenerationRequest, ResponseGenerator, ValidationStatus};
use crate::llm::{Credentials, ProviderKind};
use crate::types::{Result, ScribeError};

pub struct DiscussionArgs {
    /// Course selector (document key or Canvas course id)
    pub course: String,
    /// Explicit week; resolved from today's date when absent
    pub week: Option<u32>,
    /// Explicit provider; credential auto-detection when absent
    pub provider: Option<ProviderKind>,
    /// Student post text; read from stdin when absent
    pub post: Option<String>,
}

pub fn run(config_file: Option<&Path>, args: DiscussionArgs) -> Result<()> {
    let out = Output::new();

    let config = ConfigLoader::load(config_file)?;
    let document = CourseDocument::load(&config.documents.courses_file)?;
    let course = document.resolve(&args.course)?;

    let week_number = match args.week {
        Some(w) => w,
        None => resolve_week(course.course_start_date, Local::now().date_naive())?,
    };
    let week = course.week(week_number)?;
    let topic_id = course.topic_for_week(week_number)?.to_string();

    let target_post = read_target_post(args.post)?;
    if target_post.trim().is_empty() {
        return Err(ScribeError::Config(
            "no student post provided; pass --post or pipe text on stdin".to_string(),
        ));
    }

    let credentials = Credentials::from_env();
    let generator = ResponseGenerator::from_config(&config, &credentials, args.provider)?;

    out.section(&format!("{} — week {}", course.name, week_number));
    out.field("Topic", &topic_id);

    let rt = Runtime::new()?;
    let result = rt.block_on(generator.respond(week, &GenerationRequest { target_post }))?;

    match result.validation {
        ValidationStatus::Accepted => out.success(&format!(
            "Response accepted ({}, {} attempt(s))",
            result.provider, result.attempts
        )),
        ValidationStatus::AcceptedAfterRetry { rejections } => out.warning(&format!(
            "Response accepted after {} rejected draft(s) ({}, {} attempt(s))",
            rejections, result.provider, result.attempts
        )),
    }

    println!();
    println!("{}", result.text);

    Ok(())
}

fn read_target_post(post: Option<String>) -> Result<String> {
    match post {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
