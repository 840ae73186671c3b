//! Admin page session.
//!
//! Drives one package submission at a time:
//! `Draft -> Validated -> Submitted -> Persisted | Rejected`.
//! Validation happens before any request is sent. A rejected submission
//! keeps the draft so it can be corrected; a persisted one resets the draft
//! and reloads the listing. Failures never escape the session: each one
//! becomes the current alert and re-enables the control that triggered it.

use crate::client::CatalogApi;
use crate::draft::{DraftError, PackageDraft};
use crate::errors::AppError;
use crate::models::Package;
use crate::upload::ImageUpload;

/// Where the current draft is in its submission lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Draft,
    Validated,
    Submitted,
    Persisted(Package),
    Rejected(AppError),
}

/// State behind the admin page: the draft, the listing and in-flight flags.
pub struct AdminSession<C: CatalogApi> {
    api: C,
    draft: PackageDraft,
    packages: Vec<Package>,
    state: SubmissionState,
    uploading: bool,
    submitting: bool,
    alert: Option<String>,
}

impl<C: CatalogApi> AdminSession<C> {
    pub fn new(api: C) -> Self {
        Self {
            api,
            draft: PackageDraft::new(),
            packages: Vec::new(),
            state: SubmissionState::Draft,
            uploading: false,
            submitting: false,
            alert: None,
        }
    }

    pub fn draft(&self) -> &PackageDraft {
        &self.draft
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// An upload is in flight; the file picker should be disabled.
    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// A submission is in flight; the save button should be disabled.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The last user-visible failure message, if any.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Replace the draft with the result of an infallible edit.
    pub fn edit(&mut self, edit: impl FnOnce(&PackageDraft) -> PackageDraft) {
        self.draft = edit(&self.draft);
        self.state = SubmissionState::Draft;
    }

    /// Replace the draft with the result of an index-based edit.
    ///
    /// On error the draft is left as it was.
    pub fn try_edit(
        &mut self,
        edit: impl FnOnce(&PackageDraft) -> Result<PackageDraft, DraftError>,
    ) -> Result<(), DraftError> {
        self.draft = edit(&self.draft)?;
        self.state = SubmissionState::Draft;
        Ok(())
    }

    /// Load a listed package into the draft for editing.
    pub fn edit_existing(&mut self, city: &str) -> Result<(), AppError> {
        let package = self
            .packages
            .iter()
            .find(|p| p.city == city)
            .ok_or_else(|| AppError::NotFound(format!("Package {} not found", city)))?;
        self.draft = PackageDraft::from_package(package);
        self.state = SubmissionState::Draft;
        Ok(())
    }

    /// Discard the draft and start a new package.
    pub fn reset_draft(&mut self) {
        self.draft = PackageDraft::new();
        self.state = SubmissionState::Draft;
    }

    /// Reload the admin listing. On failure the previous listing is kept.
    pub async fn refresh(&mut self) {
        match self.api.all_packages().await {
            Ok(packages) => self.packages = packages,
            Err(e) => tracing::error!("Error fetching packages: {}", e),
        }
    }

    /// Upload an image and put its URL on the draft.
    ///
    /// On failure the draft's image is left as it was and the alert is set.
    pub async fn upload_image(&mut self, image: ImageUpload) -> Result<String, AppError> {
        let result = {
            let _in_flight = InFlight::raise(&mut self.uploading);
            self.api.upload_image(image).await
        };

        match result {
            Ok(url) => {
                self.draft = self.draft.with_img(url.clone());
                Ok(url)
            }
            Err(e) => {
                tracing::error!("Upload failed: {}", e);
                self.alert = Some("Image upload failed!".to_string());
                Err(e)
            }
        }
    }

    /// Validate and send the draft.
    ///
    /// A draft loaded with [`edit_existing`](Self::edit_existing) replaces the
    /// stored package; any other draft creates a new one.
    pub async fn submit(&mut self) -> Result<Package, AppError> {
        let request = match self.draft.validate_for_submission() {
            Ok(request) => request,
            Err(e) => return Err(self.reject(e)),
        };
        self.state = SubmissionState::Validated;

        self.state = SubmissionState::Submitted;
        let result = {
            let _in_flight = InFlight::raise(&mut self.submitting);
            match self.draft.editing() {
                Some(city) => self.api.replace_package(city, &request).await,
                None => self.api.create_package(&request).await,
            }
        };

        match result {
            Ok(package) => {
                tracing::info!(city = %package.city, "Package saved");
                self.draft = PackageDraft::new();
                self.alert = None;
                self.state = SubmissionState::Persisted(package.clone());
                self.refresh().await;
                Ok(package)
            }
            Err(e) => {
                tracing::error!("Error saving package: {}", e);
                Err(self.reject(e))
            }
        }
    }

    /// Delete a package by city and reload the listing.
    pub async fn delete(&mut self, city: &str) -> Result<(), AppError> {
        match self.api.delete_package(city).await {
            Ok(()) => {
                if self.draft.editing() == Some(city) {
                    self.reset_draft();
                }
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error deleting package: {}", e);
                self.alert = Some("Failed to delete package.".to_string());
                Err(e)
            }
        }
    }

    fn reject(&mut self, error: AppError) -> AppError {
        self.alert = Some(alert_for(&error));
        self.state = SubmissionState::Rejected(error.clone());
        error
    }
}

/// Holds an in-flight flag up until dropped, including when the request
/// future is abandoned part-way.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// User-facing text for a failed submission.
fn alert_for(error: &AppError) -> String {
    match error {
        AppError::Validation(message) => message.clone(),
        AppError::DuplicateKey(_) => {
            "A package for this city already exists. Choose another city.".to_string()
        }
        _ => "Failed to save package.".to_string(),
    }
}
