use std::sync::{Arc, RwLock};

use diesel::prelude::*;

use crate::connection::{PgPool, PgPooled};
use crate::error::CatalogError;
use crate::models::{
    Course, CourseSummary, Note, NoteBody, Topic, TopicDetail, TopicHeader, TopicSummary,
};
use crate::schema::{courses, notes, topics};
use crate::seed::SeedBatch;

/// Read access to courses, topics and notes, plus the single write path the
/// seed process needs.
pub trait CatalogStore: Send + Sync {
    /// All courses, most recently created first.
    fn list_courses(&self) -> Result<Vec<CourseSummary>, CatalogError>;

    /// Topics of one course ascending by order. Unknown ids give an empty list.
    fn list_topics(&self, course_id: &str) -> Result<Vec<TopicSummary>, CatalogError>;

    fn get_topic(&self, topic_id: &str) -> Result<TopicDetail, CatalogError>;

    fn count_courses(&self) -> Result<i64, CatalogError>;

    /// Drops every course, topic and note and inserts `batch` in their place.
    fn replace_all(&self, batch: &SeedBatch) -> Result<(), CatalogError>;
}

/// Runs a store call on the blocking pool; diesel connections are synchronous.
pub async fn run_blocking<T, F>(store: &Arc<dyn CatalogStore>, call: F) -> Result<T, CatalogError>
where
    T: Send + 'static,
    F: FnOnce(&dyn CatalogStore) -> Result<T, CatalogError> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || call(store.as_ref())).await?
}

pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        PgCatalog { pool }
    }

    fn conn(&self) -> Result<PgPooled, CatalogError> {
        Ok(self.pool.get()?)
    }
}

impl CatalogStore for PgCatalog {
    fn list_courses(&self) -> Result<Vec<CourseSummary>, CatalogError> {
        let mut conn = self.conn()?;
        let rows = courses::table
            .order((courses::created_at.desc(), courses::id.asc()))
            .select(CourseSummary::as_select())
            .load(&mut conn)?;
        Ok(rows)
    }

    fn list_topics(&self, course_id: &str) -> Result<Vec<TopicSummary>, CatalogError> {
        let mut conn = self.conn()?;
        let rows = topics::table
            .filter(topics::course_id.eq(course_id))
            .order((topics::topic_order.asc(), topics::id.asc()))
            .select(TopicSummary::as_select())
            .load(&mut conn)?;
        Ok(rows)
    }

    fn get_topic(&self, topic_id: &str) -> Result<TopicDetail, CatalogError> {
        let mut conn = self.conn()?;
        let header = topics::table
            .find(topic_id)
            .select(TopicHeader::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| CatalogError::TopicNotFound(topic_id.to_string()))?;

        let note = notes::table
            .filter(notes::topic_id.eq(&header.id))
            .select(NoteBody::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(TopicDetail::from_parts(header, note))
    }

    fn count_courses(&self) -> Result<i64, CatalogError> {
        let mut conn = self.conn()?;
        Ok(courses::table.count().get_result::<i64>(&mut conn)?)
    }

    fn replace_all(&self, batch: &SeedBatch) -> Result<(), CatalogError> {
        let mut conn = self.conn()?;
        conn.transaction::<_, CatalogError, _>(|conn| {
            diesel::delete(notes::table).execute(conn)?;
            diesel::delete(topics::table).execute(conn)?;
            diesel::delete(courses::table).execute(conn)?;

            if !batch.courses.is_empty() {
                diesel::insert_into(courses::table)
                    .values(&batch.courses)
                    .execute(conn)?;
            }
            if !batch.topics.is_empty() {
                diesel::insert_into(topics::table)
                    .values(&batch.topics)
                    .execute(conn)?;
            }
            if !batch.notes.is_empty() {
                diesel::insert_into(notes::table)
                    .values(&batch.notes)
                    .execute(conn)?;
            }
            Ok(())
        })
    }
}

#[derive(Default)]
struct MemoryTables {
    courses: Vec<Course>,
    topics: Vec<Topic>,
    notes: Vec<Note>,
}

/// Process-local store with the same ordering rules as [`PgCatalog`].
#[derive(Default)]
pub struct MemoryCatalog {
    tables: RwLock<MemoryTables>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch(batch: &SeedBatch) -> Result<Self, CatalogError> {
        let catalog = Self::new();
        catalog.replace_all(batch)?;
        Ok(catalog)
    }
}

impl CatalogStore for MemoryCatalog {
    fn list_courses(&self) -> Result<Vec<CourseSummary>, CatalogError> {
        let tables = self.tables.read().map_err(|_| CatalogError::Poisoned)?;
        let mut rows: Vec<&Course> = tables.courses.iter().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(rows
            .into_iter()
            .map(|c| CourseSummary {
                id: c.id.clone(),
                title: c.title.clone(),
            })
            .collect())
    }

    fn list_topics(&self, course_id: &str) -> Result<Vec<TopicSummary>, CatalogError> {
        let tables = self.tables.read().map_err(|_| CatalogError::Poisoned)?;
        let mut rows: Vec<&Topic> = tables
            .topics
            .iter()
            .filter(|t| t.course_id == course_id)
            .collect();
        rows.sort_by(|a, b| a.topic_order.cmp(&b.topic_order).then_with(|| a.id.cmp(&b.id)));
        Ok(rows
            .into_iter()
            .map(|t| TopicSummary {
                id: t.id.clone(),
                title: t.title.clone(),
                order: t.topic_order,
            })
            .collect())
    }

    fn get_topic(&self, topic_id: &str) -> Result<TopicDetail, CatalogError> {
        let tables = self.tables.read().map_err(|_| CatalogError::Poisoned)?;
        let topic = tables
            .topics
            .iter()
            .find(|t| t.id == topic_id)
            .ok_or_else(|| CatalogError::TopicNotFound(topic_id.to_string()))?;
        let note = tables
            .notes
            .iter()
            .find(|n| n.topic_id == topic.id)
            .map(|n| NoteBody {
                content: n.content.clone(),
                updated_at: n.updated_at,
            });

        Ok(TopicDetail::from_parts(
            TopicHeader {
                id: topic.id.clone(),
                title: topic.title.clone(),
                order: topic.topic_order,
                course_id: topic.course_id.clone(),
            },
            note,
        ))
    }

    fn count_courses(&self) -> Result<i64, CatalogError> {
        let tables = self.tables.read().map_err(|_| CatalogError::Poisoned)?;
        Ok(tables.courses.len() as i64)
    }

    fn replace_all(&self, batch: &SeedBatch) -> Result<(), CatalogError> {
        let mut tables = self.tables.write().map_err(|_| CatalogError::Poisoned)?;
        tables.courses = batch.courses.clone();
        tables.topics = batch.topics.clone();
        tables.notes = batch.notes.clone();
        Ok(())
    }
}
