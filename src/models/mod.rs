pub mod activity;
pub mod course;

pub use activity::ActivityRow;
pub use course::{CaptionLocale, CourseChildren, CourseRow, Image, PromoVideo, TaxonomyRef, Topic};
