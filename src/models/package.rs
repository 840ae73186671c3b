//! Package model matching the frontend package document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Market a package is sold in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Domestic,
    International,
}

impl PackageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::Domestic => "domestic",
            PackageType::International => "international",
        }
    }
}

impl FromStr for PackageType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domestic" => Ok(PackageType::Domestic),
            "international" => Ok(PackageType::International),
            other => Err(AppError::Validation(format!(
                "Package type must be 'domestic' or 'international', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day of a package itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineDay {
    /// 1-based position of the day within the timeline
    pub day: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub points: Vec<String>,
}

impl TimelineDay {
    /// A blank day with a single empty point, ready for editing.
    pub fn blank(day: u32) -> Self {
        Self {
            day,
            title: String::new(),
            points: vec![String::new()],
        }
    }
}

/// A sellable travel package, keyed by city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub city: String,
    #[serde(rename = "type")]
    pub package_type: PackageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(default)]
    pub days: String,
    #[serde(default)]
    pub des: String,
    #[serde(default)]
    pub timeline: Vec<TimelineDay>,
}

impl Package {
    /// Schema-level checks applied by the store before any write.
    ///
    /// `img` is optional here; the admin submission policy is stricter.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.city.trim().is_empty() {
            return Err(AppError::Validation("City is required".to_string()));
        }
        validate_timeline(&self.timeline)
    }
}

/// Timeline days must be numbered 1..=n in sequence order.
pub fn validate_timeline(timeline: &[TimelineDay]) -> Result<(), AppError> {
    for (position, day) in timeline.iter().enumerate() {
        let expected = position as u32 + 1;
        if day.day != expected {
            return Err(AppError::Validation(format!(
                "Timeline day at position {} is numbered {}, expected {}",
                position, day.day, expected
            )));
        }
    }
    Ok(())
}

/// Request body for creating or replacing a package.
///
/// `type` arrives as a free string and is only turned into a [`PackageType`]
/// at the service boundary, so unknown values surface as validation errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageRequest {
    #[serde(default)]
    pub city: String,
    #[serde(default, rename = "type")]
    pub package_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(default)]
    pub days: String,
    #[serde(default)]
    pub des: String,
    #[serde(default)]
    pub timeline: Vec<TimelineDay>,
}

impl PackageRequest {
    /// Parse into a typed record and apply schema-level validation.
    pub fn into_package(self) -> Result<Package, AppError> {
        let package_type = self.package_type.trim().parse::<PackageType>()?;
        let img = self
            .img
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let package = Package {
            city: self.city.trim().to_string(),
            package_type,
            img,
            days: self.days,
            des: self.des,
            timeline: self.timeline,
        };
        package.validate()?;
        Ok(package)
    }
}

impl From<&Package> for PackageRequest {
    fn from(package: &Package) -> Self {
        Self {
            city: package.city.clone(),
            package_type: package.package_type.as_str().to_string(),
            img: package.img.clone(),
            days: package.days.clone(),
            des: package.des.clone(),
            timeline: package.timeline.clone(),
        }
    }
}

/// Query parameters for listing packages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageQuery {
    #[serde(default, rename = "type")]
    pub package_type: Option<String>,
}

impl PackageQuery {
    /// Resolve the optional `type` filter; an empty value means no filter.
    pub fn filter(&self) -> Result<Option<PackageType>, AppError> {
        match self.package_type.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some),
        }
    }
}
