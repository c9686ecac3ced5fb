//! Topic browser state and its load sequence.
//!
//! A page visit runs three dependent loads: resolve the course id, load the
//! topic list, then load the active topic's detail. Each load owns its
//! failure: it logs, clears `loading` and leaves whatever state it had.
//!
//! Detail loads are tagged with a [`DetailRequest`]. Only the response to the
//! most recently issued request for the current active topic is applied, so
//! quick successive selections settle on the last one whatever the order in
//! which responses arrive.

use thiserror::Error;

use crate::client::{ClientError, NotesSource};
use crate::models::{TopicDetail, TopicSummary};

/// Route value that stands for "the most recently created course".
pub const DEMO_COURSE_ID: &str = "demo";
pub const LOADING_TITLE: &str = "Loading...";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] ClientError),

    #[error("no courses found")]
    NoCourses,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseRoute {
    /// The route already named a concrete course.
    Direct(String),
    /// The sentinel was resolved; the route should be replaced with this id.
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub topic_id: String,
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct TopicBrowser {
    resolved_course_id: Option<String>,
    course_title: String,
    topics: Vec<TopicSummary>,
    active_topic_id: Option<String>,
    active_topic: Option<TopicDetail>,
    loading: bool,
    sidebar_collapsed: bool,
    detail_generation: u64,
}

impl TopicBrowser {
    pub fn new(sidebar_collapsed: bool) -> Self {
        TopicBrowser {
            resolved_course_id: None,
            course_title: LOADING_TITLE.to_string(),
            topics: Vec::new(),
            active_topic_id: None,
            active_topic: None,
            loading: true,
            sidebar_collapsed,
            detail_generation: 0,
        }
    }

    pub fn resolved_course_id(&self) -> Option<&str> {
        self.resolved_course_id.as_deref()
    }

    pub fn course_title(&self) -> &str {
        &self.course_title
    }

    pub fn topics(&self) -> &[TopicSummary] {
        &self.topics
    }

    pub fn active_topic_id(&self) -> Option<&str> {
        self.active_topic_id.as_deref()
    }

    pub fn active_topic(&self) -> Option<&TopicDetail> {
        self.active_topic.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    /// Step 1. Returns `None` when resolution failed; the failure is logged.
    pub async fn resolve_course<S>(&mut self, source: &S, route_course_id: &str) -> Option<CourseRoute>
    where
        S: NotesSource + ?Sized,
    {
        match self.try_resolve_course(source, route_course_id).await {
            Ok(route) => Some(route),
            Err(err) => {
                tracing::error!(error = %err, course_id = route_course_id, "failed to resolve course");
                self.loading = false;
                None
            }
        }
    }

    async fn try_resolve_course<S>(
        &mut self,
        source: &S,
        route_course_id: &str,
    ) -> Result<CourseRoute, LoadError>
    where
        S: NotesSource + ?Sized,
    {
        if route_course_id != DEMO_COURSE_ID {
            self.resolved_course_id = Some(route_course_id.to_string());
            return Ok(CourseRoute::Direct(route_course_id.to_string()));
        }

        let courses = source.courses().await?;
        let first = courses.into_iter().next().ok_or(LoadError::NoCourses)?;
        self.course_title = first.title;
        self.resolved_course_id = Some(first.id.clone());
        Ok(CourseRoute::Redirect(first.id))
    }

    /// Step 2. Loads the topic list and picks the initial active topic:
    /// `topic_from_query` if given, else the first topic.
    pub async fn load_topics<S>(&mut self, source: &S, topic_from_query: Option<&str>)
    where
        S: NotesSource + ?Sized,
    {
        let Some(course_id) = self.resolved_course_id.clone() else {
            return;
        };

        self.loading = true;
        if let Err(err) = self.try_load_topics(source, &course_id, topic_from_query).await {
            tracing::error!(error = %err, %course_id, "failed to load topics");
        }
        self.loading = false;
    }

    async fn try_load_topics<S>(
        &mut self,
        source: &S,
        course_id: &str,
        topic_from_query: Option<&str>,
    ) -> Result<(), LoadError>
    where
        S: NotesSource + ?Sized,
    {
        let courses = source.courses().await?;
        if let Some(course) = courses.into_iter().find(|c| c.id == course_id) {
            self.course_title = course.title;
        }

        self.topics = source.topics(course_id).await?;

        let initial = topic_from_query
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| self.topics.first().map(|t| t.id.clone()));
        self.active_topic_id = initial;
        Ok(())
    }

    /// Step 3. Fetches the active topic's detail, if there is an active topic.
    pub async fn load_active_topic<S>(&mut self, source: &S)
    where
        S: NotesSource + ?Sized,
    {
        let Some(request) = self.begin_detail_load() else {
            return;
        };
        let result = source.topic(&request.topic_id).await;
        self.finish_detail_load(&request, result);
    }

    /// Tags a fetch for the current active topic. Issuing a new request makes
    /// every earlier one stale.
    pub fn begin_detail_load(&mut self) -> Option<DetailRequest> {
        let topic_id = self.active_topic_id.clone()?;
        self.detail_generation += 1;
        Some(DetailRequest {
            topic_id,
            generation: self.detail_generation,
        })
    }

    /// Applies a detail response. Returns `false` if it was stale or failed.
    pub fn finish_detail_load(
        &mut self,
        request: &DetailRequest,
        result: Result<TopicDetail, ClientError>,
    ) -> bool {
        let current = request.generation == self.detail_generation
            && self.active_topic_id.as_deref() == Some(request.topic_id.as_str());
        if !current {
            tracing::debug!(topic_id = %request.topic_id, "discarding stale topic response");
            return false;
        }

        match result {
            Ok(detail) => {
                self.active_topic = Some(detail);
                true
            }
            Err(err) => {
                tracing::error!(error = %err, topic_id = %request.topic_id, "failed to load topic");
                false
            }
        }
    }

    /// Position of the active topic in the loaded list.
    pub fn active_index(&self) -> Option<usize> {
        let active = self.active_topic_id.as_deref()?;
        self.topics.iter().position(|t| t.id == active)
    }

    pub fn can_go_prev(&self) -> bool {
        matches!(self.active_index(), Some(i) if i > 0)
    }

    pub fn can_go_next(&self) -> bool {
        matches!(self.active_index(), Some(i) if i + 1 < self.topics.len())
    }

    pub fn prev_topic(&self) -> Option<&TopicSummary> {
        if !self.can_go_prev() {
            return None;
        }
        self.active_index().map(|i| &self.topics[i - 1])
    }

    pub fn next_topic(&self) -> Option<&TopicSummary> {
        if !self.can_go_next() {
            return None;
        }
        self.active_index().map(|i| &self.topics[i + 1])
    }

    /// Makes `topic_id` active and returns the detail request to issue for it.
    pub fn select_topic(&mut self, topic_id: &str) -> Option<DetailRequest> {
        self.active_topic_id = Some(topic_id.to_string());
        self.begin_detail_load()
    }

    pub fn go_prev(&mut self) -> Option<DetailRequest> {
        let id = self.prev_topic()?.id.clone();
        self.select_topic(&id)
    }

    pub fn go_next(&mut self) -> Option<DetailRequest> {
        let id = self.next_topic()?.id.clone();
        self.select_topic(&id)
    }
}
