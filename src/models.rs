use crate::schema::{courses, notes, topics};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Course {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = topics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Topic {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub topic_order: i32,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Note {
    pub id: String,
    pub topic_id: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

/// One entry of `GET /api/courses`.
#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
}

/// One entry of `GET /api/courses/:course_id/topics`.
#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = topics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TopicSummary {
    pub id: String,
    pub title: String,
    #[diesel(column_name = topic_order)]
    pub order: i32,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct NoteBody {
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = topics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TopicHeader {
    pub id: String,
    pub title: String,
    #[diesel(column_name = topic_order)]
    pub order: i32,
    pub course_id: String,
}

/// A topic with its note inlined, as served by `GET /api/topics/:topic_id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TopicDetail {
    pub id: String,
    pub title: String,
    pub order: i32,
    pub course_id: String,
    pub note: Option<NoteBody>,
}

impl TopicDetail {
    pub fn from_parts(header: TopicHeader, note: Option<NoteBody>) -> Self {
        TopicDetail {
            id: header.id,
            title: header.title,
            order: header.order,
            course_id: header.course_id,
            note,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CoursesResponse {
    pub courses: Vec<CourseSummary>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TopicsResponse {
    pub topics: Vec<TopicSummary>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TopicResponse {
    pub topic: TopicDetail,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
