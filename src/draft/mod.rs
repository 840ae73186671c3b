//! Editable package draft backing the admin form.
//!
//! A draft is a plain value: every edit returns a new draft and leaves the
//! original untouched, so a UI can keep the previous value around for
//! undo or comparison without any shared mutable state.
//!
//! Timeline days are renumbered on removal so `day` always equals the
//! 1-based position. Points carry no numbering of their own.

use std::fmt;

use crate::catalog::check_submission;
use crate::errors::AppError;
use crate::models::{Package, PackageRequest, PackageType, TimelineDay};

/// Index arguments outside the current timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    DayOutOfRange {
        index: usize,
        len: usize,
    },
    PointOutOfRange {
        day_index: usize,
        index: usize,
        len: usize,
    },
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::DayOutOfRange { index, len } => {
                write!(f, "Day index {} out of range for timeline of {} days", index, len)
            }
            DraftError::PointOutOfRange {
                day_index,
                index,
                len,
            } => write!(
                f,
                "Point index {} out of range for day {} with {} points",
                index, day_index, len
            ),
        }
    }
}

impl std::error::Error for DraftError {}

impl From<DraftError> for AppError {
    fn from(err: DraftError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// In-progress package being created or edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDraft {
    city: String,
    package_type: Option<PackageType>,
    img: String,
    days: String,
    des: String,
    timeline: Vec<TimelineDay>,
    /// City of the stored package this draft edits, if any
    editing: Option<String>,
}

impl PackageDraft {
    /// An empty draft for a new package.
    pub fn new() -> Self {
        Self::default()
    }

    /// A draft pre-filled from a stored package; submitting it replaces that package.
    pub fn from_package(package: &Package) -> Self {
        Self {
            city: package.city.clone(),
            package_type: Some(package.package_type),
            img: package.img.clone().unwrap_or_default(),
            days: package.days.clone(),
            des: package.des.clone(),
            timeline: package.timeline.clone(),
            editing: Some(package.city.clone()),
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn package_type(&self) -> Option<PackageType> {
        self.package_type
    }

    pub fn img(&self) -> &str {
        &self.img
    }

    pub fn days(&self) -> &str {
        &self.days
    }

    pub fn des(&self) -> &str {
        &self.des
    }

    pub fn timeline(&self) -> &[TimelineDay] {
        &self.timeline
    }

    /// City of the stored package being edited, `None` for a new package.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn with_city(&self, city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            ..self.clone()
        }
    }

    pub fn with_type(&self, package_type: Option<PackageType>) -> Self {
        Self {
            package_type,
            ..self.clone()
        }
    }

    pub fn with_img(&self, img: impl Into<String>) -> Self {
        Self {
            img: img.into(),
            ..self.clone()
        }
    }

    pub fn with_days(&self, days: impl Into<String>) -> Self {
        Self {
            days: days.into(),
            ..self.clone()
        }
    }

    pub fn with_des(&self, des: impl Into<String>) -> Self {
        Self {
            des: des.into(),
            ..self.clone()
        }
    }

    /// Append a blank day numbered after the current last one.
    pub fn add_day(&self) -> Self {
        let mut timeline = self.timeline.clone();
        timeline.push(TimelineDay::blank(timeline.len() as u32 + 1));
        self.with_timeline(timeline)
    }

    /// Remove the day at `index` if `confirm` approves, renumbering what remains.
    ///
    /// A declined confirmation returns an unchanged copy.
    pub fn remove_day(
        &self,
        index: usize,
        confirm: impl FnOnce(&TimelineDay) -> bool,
    ) -> Result<Self, DraftError> {
        let day = self.day(index)?;
        if !confirm(day) {
            return Ok(self.clone());
        }

        let mut timeline = self.timeline.clone();
        timeline.remove(index);
        for (position, day) in timeline.iter_mut().enumerate() {
            day.day = position as u32 + 1;
        }
        Ok(self.with_timeline(timeline))
    }

    /// Append an empty point to the day at `day_index`.
    pub fn add_point(&self, day_index: usize) -> Result<Self, DraftError> {
        self.edit_day(day_index, |day| {
            day.points.push(String::new());
            Ok(())
        })
    }

    pub fn remove_point(&self, day_index: usize, point_index: usize) -> Result<Self, DraftError> {
        self.edit_day(day_index, |day| {
            check_point(day_index, point_index, day.points.len())?;
            day.points.remove(point_index);
            Ok(())
        })
    }

    pub fn update_title(
        &self,
        day_index: usize,
        title: impl Into<String>,
    ) -> Result<Self, DraftError> {
        let title = title.into();
        self.edit_day(day_index, |day| {
            day.title = title;
            Ok(())
        })
    }

    pub fn update_point(
        &self,
        day_index: usize,
        point_index: usize,
        value: impl Into<String>,
    ) -> Result<Self, DraftError> {
        let value = value.into();
        self.edit_day(day_index, |day| {
            check_point(day_index, point_index, day.points.len())?;
            day.points[point_index] = value;
            Ok(())
        })
    }

    /// Request body for this draft, exactly as typed.
    pub fn to_request(&self) -> PackageRequest {
        PackageRequest {
            city: self.city.clone(),
            package_type: self
                .package_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            img: Some(self.img.clone()).filter(|img| !img.trim().is_empty()),
            days: self.days.clone(),
            des: self.des.clone(),
            timeline: self.timeline.clone(),
        }
    }

    /// Apply the admin submission policy and produce the request to send.
    pub fn validate_for_submission(&self) -> Result<PackageRequest, AppError> {
        let request = self.to_request();
        check_submission(&request)?;
        Ok(request)
    }

    fn day(&self, index: usize) -> Result<&TimelineDay, DraftError> {
        self.timeline.get(index).ok_or(DraftError::DayOutOfRange {
            index,
            len: self.timeline.len(),
        })
    }

    fn edit_day(
        &self,
        index: usize,
        edit: impl FnOnce(&mut TimelineDay) -> Result<(), DraftError>,
    ) -> Result<Self, DraftError> {
        self.day(index)?;
        let mut timeline = self.timeline.clone();
        edit(&mut timeline[index])?;
        Ok(self.with_timeline(timeline))
    }

    fn with_timeline(&self, timeline: Vec<TimelineDay>) -> Self {
        Self {
            timeline,
            ..self.clone()
        }
    }
}

fn check_point(day_index: usize, index: usize, len: usize) -> Result<(), DraftError> {
    if index < len {
        Ok(())
    } else {
        Err(DraftError::PointOutOfRange {
            day_index,
            index,
            len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day_numbers(draft: &PackageDraft) -> Vec<u32> {
        draft.timeline().iter().map(|d| d.day).collect()
    }

    fn three_day_draft() -> PackageDraft {
        PackageDraft::new()
            .add_day()
            .update_title(0, "Arrival")
            .unwrap()
            .add_day()
            .update_title(1, "Sightseeing")
            .unwrap()
            .add_day()
            .update_title(2, "Departure")
            .unwrap()
    }

    #[test]
    fn test_add_day_appends_blank_day() {
        let draft = PackageDraft::new().add_day();

        assert_eq!(draft.timeline().len(), 1);
        assert_eq!(draft.timeline()[0], TimelineDay::blank(1));
    }

    #[test]
    fn test_edits_leave_original_untouched() {
        let original = PackageDraft::new().add_day();
        let edited = original.update_title(0, "Arrival").unwrap();

        assert_eq!(original.timeline()[0].title, "");
        assert_eq!(edited.timeline()[0].title, "Arrival");
    }

    #[test]
    fn test_remove_middle_day_renumbers() {
        let draft = three_day_draft().remove_day(1, |_| true).unwrap();

        assert_eq!(day_numbers(&draft), vec![1, 2]);
        assert_eq!(draft.timeline()[0].title, "Arrival");
        assert_eq!(draft.timeline()[1].title, "Departure");
    }

    #[test]
    fn test_remove_day_declined_is_unchanged() {
        let draft = three_day_draft();
        let mut asked_about = None;

        let after = draft
            .remove_day(2, |day| {
                asked_about = Some(day.title.clone());
                false
            })
            .unwrap();

        assert_eq!(after, draft);
        assert_eq!(asked_about.as_deref(), Some("Departure"));
    }

    #[test]
    fn test_day_numbers_stay_contiguous_over_edit_sequences() {
        let mut draft = PackageDraft::new();
        let mut seed: u64 = 0x5eed;

        for _ in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let len = draft.timeline().len();
            if len == 0 || seed % 3 != 0 {
                draft = draft.add_day();
            } else {
                let index = (seed >> 33) as usize % len;
                draft = draft.remove_day(index, |_| true).unwrap();
            }

            let expected: Vec<u32> = (1..=draft.timeline().len() as u32).collect();
            assert_eq!(day_numbers(&draft), expected);
        }
    }

    #[test]
    fn test_remove_point_touches_only_its_day() {
        let draft = three_day_draft()
            .add_point(0)
            .unwrap()
            .update_point(0, 0, "Check in")
            .unwrap()
            .update_point(0, 1, "Beach walk")
            .unwrap()
            .update_point(1, 0, "Fort Aguada")
            .unwrap();

        let after = draft.remove_point(0, 0).unwrap();

        assert_eq!(after.timeline()[0].points, vec!["Beach walk".to_string()]);
        assert_eq!(after.timeline()[1], draft.timeline()[1]);
        assert_eq!(after.timeline()[2], draft.timeline()[2]);
        assert_eq!(day_numbers(&after), vec![1, 2, 3]);
    }

    #[test]
    fn test_add_point_on_day_without_points() {
        let draft = PackageDraft::new().add_day().remove_point(0, 0).unwrap();
        assert!(draft.timeline()[0].points.is_empty());

        let draft = draft.add_point(0).unwrap();
        assert_eq!(draft.timeline()[0].points, vec![String::new()]);
    }

    #[test]
    fn test_out_of_range_indices_are_errors() {
        let empty = PackageDraft::new();
        assert_eq!(
            empty.add_point(0),
            Err(DraftError::DayOutOfRange { index: 0, len: 0 })
        );
        assert!(empty.remove_day(0, |_| true).is_err());
        assert!(empty.update_title(3, "x").is_err());

        let one_day = empty.add_day();
        assert_eq!(
            one_day.remove_point(0, 1),
            Err(DraftError::PointOutOfRange {
                day_index: 0,
                index: 1,
                len: 1
            })
        );
        assert!(one_day.update_point(0, 5, "x").is_err());
    }

    #[test]
    fn test_submission_requires_city_type_and_img() {
        let draft = PackageDraft::new();
        assert!(matches!(
            draft.validate_for_submission(),
            Err(AppError::Validation(_))
        ));

        let draft = draft
            .with_city("Goa")
            .with_type(Some(PackageType::Domestic));
        assert!(draft.validate_for_submission().is_err());

        let request = draft
            .with_img("http://x/y.png")
            .validate_for_submission()
            .unwrap();
        assert_eq!(request.city, "Goa");
        assert_eq!(request.package_type, "domestic");
        assert_eq!(request.img.as_deref(), Some("http://x/y.png"));
    }

    #[test]
    fn test_from_package_marks_editing() {
        let package = Package {
            city: "Paris".to_string(),
            package_type: PackageType::International,
            img: None,
            days: "5 Days 4 Nights".to_string(),
            des: "City of light".to_string(),
            timeline: vec![TimelineDay::blank(1)],
        };

        let draft = PackageDraft::from_package(&package);

        assert_eq!(draft.editing(), Some("Paris"));
        assert_eq!(draft.img(), "");
        assert_eq!(draft.to_request().img, None);
        assert!(!PackageDraft::new().is_editing());
    }
}
