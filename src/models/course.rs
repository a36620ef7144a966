use serde::Serialize;

/// One row of the `courses` table, keyed by the external numeric id.
#[derive(Debug, Clone, Serialize)]
pub struct CourseRow {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub estimated_content_length: Option<i64>,
    pub num_lectures: Option<i64>,
    pub num_videos: Option<i64>,
    pub mobile_native_deeplink: Option<String>,
    pub is_practice_test_course: Option<bool>,
    pub num_quizzes: Option<i64>,
    pub num_practice_tests: Option<i64>,
    pub has_closed_caption: Option<bool>,
    pub last_update_date: Option<String>,
    pub xapi_activity_id: Option<String>,
    pub is_custom: Option<bool>,
    pub is_imported: Option<bool>,
    pub headline: Option<String>,
    pub level: Option<String>,
    pub locale: Option<String>,
}

/// Reference into the category/subcategory taxonomy, resolved to a row id at
/// write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyRef {
    pub title: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    pub topic_id: i64,
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromoVideo {
    pub kind: Option<String>,
    pub label: Option<String>,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub size: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptionLocale {
    pub locale: Option<String>,
    pub title: Option<String>,
    pub english_title: Option<String>,
}

/// Child collections owned by one course. Every collection is replaced
/// wholesale on each sync, so the rows here are always the complete set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseChildren {
    pub categories: Vec<TaxonomyRef>,
    pub subcategories: Vec<TaxonomyRef>,
    pub topics: Vec<Topic>,
    pub promo_videos: Vec<PromoVideo>,
    pub instructors: Vec<String>,
    pub requirements: Vec<String>,
    pub objectives: Vec<String>,
    pub images: Vec<Image>,
    pub caption_languages: Vec<String>,
    pub caption_locales: Vec<CaptionLocale>,
}

impl CourseChildren {
    pub fn row_count(&self) -> usize {
        self.categories.len()
            + self.subcategories.len()
            + self.topics.len()
            + self.promo_videos.len()
            + self.instructors.len()
            + self.requirements.len()
            + self.objectives.len()
            + self.images.len()
            + self.caption_languages.len()
            + self.caption_locales.len()
    }
}
