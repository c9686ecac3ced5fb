//! Demo content loading.
//!
//! Seed files list courses with their topics in display order; topic order
//! numbers are assigned from position (1..=N) so they are always unique and
//! contiguous within a course.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::error::CatalogError;
use crate::models::{Course, Note, Topic};

const DEMO_COURSES: &str = include_str!("data/demo_course.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("seed file contains no courses")]
    NoCourses,

    #[error("course #{0} has an empty title")]
    EmptyCourseTitle(usize),

    #[error("topic #{topic} of course `{course}` has an empty title")]
    EmptyTopicTitle { course: String, topic: usize },

    #[error(transparent)]
    Store(#[from] CatalogError),
}

#[derive(Deserialize, Debug, Clone)]
pub struct SeedFile {
    pub courses: Vec<CourseSeed>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CourseSeed {
    pub title: String,
    #[serde(default)]
    pub topics: Vec<TopicSeed>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TopicSeed {
    pub title: String,
    /// Markdown body. Topics without content get no note row.
    #[serde(default)]
    pub content: Option<String>,
}

/// Rows ready to be written by [`CatalogStore::replace_all`].
#[derive(Default, Debug, Clone)]
pub struct SeedBatch {
    pub courses: Vec<Course>,
    pub topics: Vec<Topic>,
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub course_ids: Vec<String>,
    pub topics: usize,
    pub notes: usize,
}

impl SeedFile {
    pub fn demo() -> Result<Self, SeedError> {
        Self::from_json(DEMO_COURSES)
    }

    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Validates the file and assigns ids, order numbers and timestamps.
    ///
    /// The first course in the file gets the latest `created_at`, so it is the
    /// one listed first and picked by the "demo" route.
    pub fn into_batch(self, now: DateTime<Utc>) -> Result<SeedBatch, SeedError> {
        if self.courses.is_empty() {
            return Err(SeedError::NoCourses);
        }

        let mut batch = SeedBatch::default();
        for (course_index, course_seed) in self.courses.into_iter().enumerate() {
            if course_seed.title.trim().is_empty() {
                return Err(SeedError::EmptyCourseTitle(course_index + 1));
            }

            let course = Course {
                id: Uuid::new_v4().to_string(),
                title: course_seed.title,
                created_at: now - Duration::milliseconds(course_index as i64),
            };

            for (topic_index, topic_seed) in course_seed.topics.into_iter().enumerate() {
                if topic_seed.title.trim().is_empty() {
                    return Err(SeedError::EmptyTopicTitle {
                        course: course.title.clone(),
                        topic: topic_index + 1,
                    });
                }

                let topic = Topic {
                    id: Uuid::new_v4().to_string(),
                    course_id: course.id.clone(),
                    title: topic_seed.title,
                    topic_order: topic_index as i32 + 1,
                };

                if let Some(content) = topic_seed.content {
                    batch.notes.push(Note {
                        id: Uuid::new_v4().to_string(),
                        topic_id: topic.id.clone(),
                        content,
                        updated_at: now,
                    });
                }
                batch.topics.push(topic);
            }
            batch.courses.push(course);
        }

        Ok(batch)
    }
}

/// Replaces the store contents with `file`.
pub fn seed<S: CatalogStore + ?Sized>(store: &S, file: SeedFile) -> Result<SeedReport, SeedError> {
    let batch = file.into_batch(Utc::now())?;
    store.replace_all(&batch)?;

    let report = SeedReport {
        course_ids: batch.courses.iter().map(|c| c.id.clone()).collect(),
        topics: batch.topics.len(),
        notes: batch.notes.len(),
    };
    tracing::info!(
        courses = report.course_ids.len(),
        topics = report.topics,
        notes = report.notes,
        "seed complete"
    );
    Ok(report)
}

/// Seeds only when the store holds no courses. Returns `None` when skipped.
pub fn seed_if_empty<S: CatalogStore + ?Sized>(
    store: &S,
    file: SeedFile,
) -> Result<Option<SeedReport>, SeedError> {
    let count = store.count_courses()?;
    if count != 0 {
        tracing::debug!(count, "store already has courses, skipping seed");
        return Ok(None);
    }
    seed(store, file).map(Some)
}
