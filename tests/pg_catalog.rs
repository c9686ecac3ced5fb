//! Runs the diesel-backed store against a real Postgres database.
//!
//! These tests wipe every course, topic and note, so they only run when
//! `TEST_DATABASE_URL` names a throwaway database:
//!
//! ```text
//! TEST_DATABASE_URL=postgres://localhost/coursenotes_test cargo test --test pg_catalog -- --ignored
//! ```

use chrono::{Duration, TimeZone, Utc};
use coursenotes::catalog::{CatalogStore, PgCatalog};
use coursenotes::connection::{establish_pool, run_migrations};
use coursenotes::models::{Course, Note, Topic};
use coursenotes::seed::SeedBatch;

fn catalog() -> Option<PgCatalog> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = establish_pool(&url, 2).unwrap();
    run_migrations(&pool).unwrap();
    Some(PgCatalog::new(pool))
}

fn course(id: &str, minutes: i64) -> Course {
    Course {
        id: id.into(),
        title: format!("Course {id}"),
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
    }
}

fn topic(id: &str, course_id: &str, order: i32) -> Topic {
    Topic {
        id: id.into(),
        course_id: course_id.into(),
        title: format!("Topic {id}"),
        topic_order: order,
    }
}

fn batch() -> SeedBatch {
    SeedBatch {
        courses: vec![course("b-old", 0), course("a-new", 10), course("c-new", 10)],
        // Inserted out of order and with gaps.
        topics: vec![
            topic("t-10", "a-new", 10),
            topic("t-2", "a-new", 2),
            topic("t-5", "a-new", 5),
            topic("t-other", "b-old", 1),
        ],
        notes: vec![Note {
            id: "n-2".into(),
            topic_id: "t-2".into(),
            content: "# Two\n\n- a\n- b\n".into(),
            updated_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        }],
    }
}

// One test so the shared tables are never touched concurrently.
#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn pg_catalog_queries_and_replace() {
    let Some(store) = catalog() else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    store.replace_all(&batch()).unwrap();
    assert_eq!(store.count_courses().unwrap(), 3);

    // Newest first, equal timestamps by id.
    let ids: Vec<String> = store.list_courses().unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["a-new", "c-new", "b-old"]);

    let orders: Vec<i32> = store
        .list_topics("a-new")
        .unwrap()
        .into_iter()
        .map(|t| t.order)
        .collect();
    assert_eq!(orders, vec![2, 5, 10]);
    assert!(store.list_topics("missing").unwrap().is_empty());

    let detail = store.get_topic("t-2").unwrap();
    assert_eq!(detail.course_id, "a-new");
    let note = detail.note.unwrap();
    assert_eq!(note.content, "# Two\n\n- a\n- b\n");
    assert_eq!(note.updated_at, Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
    assert!(store.get_topic("t-5").unwrap().note.is_none());
    assert!(store.get_topic("missing").unwrap_err().is_not_found());

    // A batch violating the foreign key rolls back and keeps the old rows.
    let broken = SeedBatch {
        courses: vec![course("fresh", 20)],
        topics: vec![topic("orphan", "no-such-course", 1)],
        notes: Vec::new(),
    };
    assert!(store.replace_all(&broken).is_err());
    assert_eq!(store.count_courses().unwrap(), 3);
    assert_eq!(store.list_topics("a-new").unwrap().len(), 3);

    store.replace_all(&SeedBatch::default()).unwrap();
    assert_eq!(store.count_courses().unwrap(), 0);
}
