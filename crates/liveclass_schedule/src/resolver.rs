//! Read-only timetable lookup.
//!
//! The push engine never owns schedule content; it asks a [`ScheduleResolver`]
//! for the lessons of a class on a given weekday and falls back to
//! placeholders when nothing is known.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::ScheduleError;

/// One lesson slot in a class timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub period: u8,
    pub subject: String,
    #[serde(default)]
    pub classroom: String,
}

/// Looks up the lessons of `(grade, class_number)` on a weekday (Monday = 0).
pub trait ScheduleResolver: Send + Sync {
    /// Lessons ordered by period. Empty when the class or day is unknown.
    fn lessons(&self, grade: u32, class_number: u32, weekday_index: u32) -> Vec<Lesson>;

    fn lesson(
        &self,
        grade: u32,
        class_number: u32,
        weekday_index: u32,
        period: u8,
    ) -> Option<Lesson> {
        self.lessons(grade, class_number, weekday_index)
            .into_iter()
            .find(|l| l.period == period)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimetableFile {
    #[serde(default)]
    classes: Vec<ClassTimetable>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassTimetable {
    grade: u32,
    class_number: u32,
    /// Indexed by weekday, Monday first.
    #[serde(default)]
    days: Vec<Vec<Lesson>>,
}

/// A resolver backed by a timetable held in memory.
///
/// The JSON form is
/// `{"classes": [{"grade": 2, "classNumber": 3, "days": [[{"period": 1, "subject": "...", "classroom": "..."}], ...]}]}`.
#[derive(Debug, Clone, Default)]
pub struct StaticScheduleResolver {
    entries: HashMap<(u32, u32, u32), Vec<Lesson>>,
}

impl StaticScheduleResolver {
    /// A resolver that knows nothing; every lookup falls through to placeholders.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ScheduleError> {
        let file: TimetableFile = serde_json::from_str(json)?;
        let mut resolver = Self::empty();
        for class in file.classes {
            for (weekday_index, lessons) in class.days.into_iter().enumerate() {
                resolver.insert(class.grade, class.class_number, weekday_index as u32, lessons);
            }
        }
        debug!(entries = resolver.entries.len(), "timetable parsed");
        Ok(resolver)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScheduleError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let resolver = Self::from_json_str(&contents)?;
        info!(path = %path.display(), "loaded timetable");
        Ok(resolver)
    }

    pub fn insert(
        &mut self,
        grade: u32,
        class_number: u32,
        weekday_index: u32,
        mut lessons: Vec<Lesson>,
    ) {
        lessons.sort_by_key(|l| l.period);
        self.entries
            .insert((grade, class_number, weekday_index), lessons);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ScheduleResolver for StaticScheduleResolver {
    fn lessons(&self, grade: u32, class_number: u32, weekday_index: u32) -> Vec<Lesson> {
        self.entries
            .get(&(grade, class_number, weekday_index))
            .cloned()
            .unwrap_or_default()
    }
}
