use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::error::SyncError;
use crate::models::{ActivityRow, CourseChildren, CourseRow, TaxonomyRef};

/// Rows written by one page commit, split by whether the parent/activity key
/// already existed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageCounts {
    pub inserted: u64,
    pub updated: u64,
}

impl PageCounts {
    pub fn merge(&mut self, other: PageCounts) {
        self.inserted += other.inserted;
        self.updated += other.updated;
    }

    pub fn total(&self) -> u64 {
        self.inserted + self.updated
    }
}

enum Upserted {
    Inserted,
    Updated,
}

/// Commits one page of course rows in a single transaction: parent upsert,
/// taxonomy get-or-insert, then delete-and-reinsert of every child
/// collection. Any failure rolls the whole page back.
pub async fn write_course_page(
    db: &SqlitePool,
    rows: &[(CourseRow, CourseChildren)],
) -> Result<PageCounts, SyncError> {
    let mut tx: Transaction<'_, Sqlite> = db.begin().await?;
    let mut counts = PageCounts::default();

    for (course, children) in rows {
        match upsert_course(&mut tx, course).await? {
            Upserted::Inserted => counts.inserted += 1,
            Upserted::Updated => counts.updated += 1,
        }
        replace_children(&mut tx, course.id, children).await?;
    }

    tx.commit().await?;
    Ok(counts)
}

/// Commits one page of activity rows in a single transaction, upserting by
/// the (user_id, course_id) natural key with full column overwrite.
pub async fn write_activity_page(
    db: &SqlitePool,
    rows: &[ActivityRow],
) -> Result<PageCounts, SyncError> {
    let mut tx: Transaction<'_, Sqlite> = db.begin().await?;
    let mut counts = PageCounts::default();

    for row in rows {
        match upsert_activity(&mut tx, row).await? {
            Upserted::Inserted => counts.inserted += 1,
            Upserted::Updated => counts.updated += 1,
        }
    }

    tx.commit().await?;
    Ok(counts)
}

async fn upsert_course(
    tx: &mut Transaction<'_, Sqlite>,
    course: &CourseRow,
) -> Result<Upserted, SyncError> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = ?")
        .bind(course.id)
        .fetch_optional(&mut **tx)
        .await?;

    if existing.is_some() {
        sqlx::query(
            r#"
            UPDATE courses SET
                title = ?, description = ?, url = ?, estimated_content_length = ?,
                num_lectures = ?, num_videos = ?, mobile_native_deeplink = ?,
                is_practice_test_course = ?, num_quizzes = ?, num_practice_tests = ?,
                has_closed_caption = ?, last_update_date = ?, xapi_activity_id = ?,
                is_custom = ?, is_imported = ?, headline = ?, level = ?, locale = ?
            WHERE id = ?
            "#,
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.url)
        .bind(course.estimated_content_length)
        .bind(course.num_lectures)
        .bind(course.num_videos)
        .bind(&course.mobile_native_deeplink)
        .bind(course.is_practice_test_course)
        .bind(course.num_quizzes)
        .bind(course.num_practice_tests)
        .bind(course.has_closed_caption)
        .bind(&course.last_update_date)
        .bind(&course.xapi_activity_id)
        .bind(course.is_custom)
        .bind(course.is_imported)
        .bind(&course.headline)
        .bind(&course.level)
        .bind(&course.locale)
        .bind(course.id)
        .execute(&mut **tx)
        .await?;
        Ok(Upserted::Updated)
    } else {
        sqlx::query(
            r#"
            INSERT INTO courses
                (id, title, description, url, estimated_content_length, num_lectures,
                 num_videos, mobile_native_deeplink, is_practice_test_course, num_quizzes,
                 num_practice_tests, has_closed_caption, last_update_date, xapi_activity_id,
                 is_custom, is_imported, headline, level, locale)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(course.id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.url)
        .bind(course.estimated_content_length)
        .bind(course.num_lectures)
        .bind(course.num_videos)
        .bind(&course.mobile_native_deeplink)
        .bind(course.is_practice_test_course)
        .bind(course.num_quizzes)
        .bind(course.num_practice_tests)
        .bind(course.has_closed_caption)
        .bind(&course.last_update_date)
        .bind(&course.xapi_activity_id)
        .bind(course.is_custom)
        .bind(course.is_imported)
        .bind(&course.headline)
        .bind(&course.level)
        .bind(&course.locale)
        .execute(&mut **tx)
        .await?;
        Ok(Upserted::Inserted)
    }
}

/// Child collections carry no stable per-row key, so the fresh set replaces
/// whatever the previous sync left behind.
async fn replace_children(
    tx: &mut Transaction<'_, Sqlite>,
    course_id: i64,
    children: &CourseChildren,
) -> Result<(), SyncError> {
    const CHILD_TABLES: &[&str] = &[
        "course_categories",
        "course_subcategories",
        "topics",
        "promo_videos",
        "instructors",
        "requirements",
        "what_you_will_learn",
        "images",
        "caption_languages",
        "caption_locales",
    ];
    for table in CHILD_TABLES {
        sqlx::query(&format!("DELETE FROM {table} WHERE course_id = ?"))
            .bind(course_id)
            .execute(&mut **tx)
            .await?;
    }

    for category in &children.categories {
        let category_id = get_or_insert_taxonomy(&mut **tx, "categories", category).await?;
        sqlx::query("INSERT INTO course_categories (course_id, category_id) VALUES (?, ?)")
            .bind(course_id)
            .bind(category_id)
            .execute(&mut **tx)
            .await?;
    }
    for subcategory in &children.subcategories {
        let subcategory_id = get_or_insert_taxonomy(&mut **tx, "subcategories", subcategory).await?;
        sqlx::query("INSERT INTO course_subcategories (course_id, subcategory_id) VALUES (?, ?)")
            .bind(course_id)
            .bind(subcategory_id)
            .execute(&mut **tx)
            .await?;
    }
    for topic in &children.topics {
        sqlx::query("INSERT INTO topics (course_id, topic_id, title, url) VALUES (?, ?, ?, ?)")
            .bind(course_id)
            .bind(topic.topic_id)
            .bind(&topic.title)
            .bind(&topic.url)
            .execute(&mut **tx)
            .await?;
    }
    for video in &children.promo_videos {
        sqlx::query("INSERT INTO promo_videos (course_id, type, label, file) VALUES (?, ?, ?, ?)")
            .bind(course_id)
            .bind(&video.kind)
            .bind(&video.label)
            .bind(&video.file)
            .execute(&mut **tx)
            .await?;
    }
    for instructor in &children.instructors {
        sqlx::query("INSERT INTO instructors (course_id, instructor_name) VALUES (?, ?)")
            .bind(course_id)
            .bind(instructor)
            .execute(&mut **tx)
            .await?;
    }
    for requirement in &children.requirements {
        sqlx::query("INSERT INTO requirements (course_id, requirement) VALUES (?, ?)")
            .bind(course_id)
            .bind(requirement)
            .execute(&mut **tx)
            .await?;
    }
    for item in &children.objectives {
        sqlx::query("INSERT INTO what_you_will_learn (course_id, item) VALUES (?, ?)")
            .bind(course_id)
            .bind(item)
            .execute(&mut **tx)
            .await?;
    }
    for image in &children.images {
        sqlx::query("INSERT INTO images (course_id, size, url) VALUES (?, ?, ?)")
            .bind(course_id)
            .bind(&image.size)
            .bind(&image.url)
            .execute(&mut **tx)
            .await?;
    }
    for language in &children.caption_languages {
        sqlx::query("INSERT INTO caption_languages (course_id, language) VALUES (?, ?)")
            .bind(course_id)
            .bind(language)
            .execute(&mut **tx)
            .await?;
    }
    for caption in &children.caption_locales {
        sqlx::query(
            "INSERT INTO caption_locales (course_id, locale, title, english_title) VALUES (?, ?, ?, ?)",
        )
        .bind(course_id)
        .bind(&caption.locale)
        .bind(&caption.title)
        .bind(&caption.english_title)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Taxonomy rows are shared across courses and never deleted; look them up by
/// title and create on first sight.
async fn get_or_insert_taxonomy(
    conn: &mut SqliteConnection,
    table: &str,
    taxonomy: &TaxonomyRef,
) -> Result<i64, SyncError> {
    let existing: Option<i64> = sqlx::query_scalar(&format!("SELECT id FROM {table} WHERE title = ?"))
        .bind(&taxonomy.title)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let id: i64 =
        sqlx::query_scalar(&format!("INSERT INTO {table} (title, url) VALUES (?, ?) RETURNING id"))
            .bind(&taxonomy.title)
            .bind(&taxonomy.url)
            .fetch_one(&mut *conn)
            .await?;
    Ok(id)
}

async fn upsert_activity(
    tx: &mut Transaction<'_, Sqlite>,
    row: &ActivityRow,
) -> Result<Upserted, SyncError> {
    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT user_id FROM user_course_data WHERE user_id = ? AND course_id = ?",
    )
    .bind(row.user_id)
    .bind(row.course_id)
    .fetch_optional(&mut **tx)
    .await?;

    if existing.is_some() {
        sqlx::query(
            r#"
            UPDATE user_course_data SET
                user_name = ?, user_surname = ?, user_email = ?, user_role = ?,
                user_external_id = ?, course_title = ?, course_category = ?,
                course_duration = ?, completion_ratio = ?, num_video_consumed_minutes = ?,
                course_enroll_date = ?, course_start_date = ?, course_completion_date = ?,
                course_first_completion_date = ?, course_last_accessed_date = ?,
                last_activity_date = ?, is_assigned = ?, assigned_by = ?,
                user_is_deactivated = ?, lms_user_id = ?
            WHERE user_id = ? AND course_id = ?
            "#,
        )
        .bind(&row.user_name)
        .bind(&row.user_surname)
        .bind(&row.user_email)
        .bind(&row.user_role)
        .bind(&row.user_external_id)
        .bind(&row.course_title)
        .bind(&row.course_category)
        .bind(row.course_duration)
        .bind(row.completion_ratio)
        .bind(row.num_video_consumed_minutes)
        .bind(row.course_enroll_date)
        .bind(row.course_start_date)
        .bind(row.course_completion_date)
        .bind(row.course_first_completion_date)
        .bind(row.course_last_accessed_date)
        .bind(&row.last_activity_date)
        .bind(row.is_assigned)
        .bind(&row.assigned_by)
        .bind(row.user_is_deactivated)
        .bind(&row.lms_user_id)
        .bind(row.user_id)
        .bind(row.course_id)
        .execute(&mut **tx)
        .await?;
        Ok(Upserted::Updated)
    } else {
        sqlx::query(
            r#"
            INSERT INTO user_course_data
                (user_id, course_id, user_name, user_surname, user_email, user_role,
                 user_external_id, course_title, course_category, course_duration,
                 completion_ratio, num_video_consumed_minutes, course_enroll_date,
                 course_start_date, course_completion_date, course_first_completion_date,
                 course_last_accessed_date, last_activity_date, is_assigned, assigned_by,
                 user_is_deactivated, lms_user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.user_id)
        .bind(row.course_id)
        .bind(&row.user_name)
        .bind(&row.user_surname)
        .bind(&row.user_email)
        .bind(&row.user_role)
        .bind(&row.user_external_id)
        .bind(&row.course_title)
        .bind(&row.course_category)
        .bind(row.course_duration)
        .bind(row.completion_ratio)
        .bind(row.num_video_consumed_minutes)
        .bind(row.course_enroll_date)
        .bind(row.course_start_date)
        .bind(row.course_completion_date)
        .bind(row.course_first_completion_date)
        .bind(row.course_last_accessed_date)
        .bind(&row.last_activity_date)
        .bind(row.is_assigned)
        .bind(&row.assigned_by)
        .bind(row.user_is_deactivated)
        .bind(&row.lms_user_id)
        .execute(&mut **tx)
        .await?;
        Ok(Upserted::Inserted)
    }
}
