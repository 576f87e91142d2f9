//! Tutor endpoints, including pet links.

use std::sync::Arc;

use petmanager_domain::{ApiRequest, Page, PageRequest, Pet, Photo, RequestBody, Tutor, TutorForm};

use super::{decode, expect_success};
use crate::auth::AuthInterceptor;
use crate::error::ApiResult;

const TUTORS: &str = "/v1/tutores";

/// Client for `/v1/tutores`.
#[derive(Debug, Clone)]
pub struct TutorService {
    api: Arc<AuthInterceptor>,
}

impl TutorService {
    /// Creates a service sending through `api`.
    #[must_use]
    pub const fn new(api: Arc<AuthInterceptor>) -> Self {
        Self { api }
    }

    /// Lists one page of tutors, optionally filtered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the page cannot be decoded.
    pub async fn list(&self, page: &PageRequest) -> ApiResult<Page<Tutor>> {
        decode(self.api.send(page.apply(ApiRequest::get(TUTORS))).await?)
    }

    /// Fetches one tutor.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the tutor cannot be decoded.
    pub async fn get(&self, id: u64) -> ApiResult<Tutor> {
        decode(self.api.send(ApiRequest::get(format!("{TUTORS}/{id}"))).await?)
    }

    /// Creates a tutor.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is invalid or the call fails.
    pub async fn create(&self, form: &TutorForm) -> ApiResult<Tutor> {
        form.validate()?;
        let request = ApiRequest::post(TUTORS).with_json(form)?;
        decode(self.api.send(request).await?)
    }

    /// Replaces a tutor's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is invalid or the call fails.
    pub async fn update(&self, id: u64, form: &TutorForm) -> ApiResult<Tutor> {
        form.validate()?;
        let request = ApiRequest::put(format!("{TUTORS}/{id}")).with_json(form)?;
        decode(self.api.send(request).await?)
    }

    /// Uploads a tutor's photo.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn upload_photo(&self, id: u64, photo: Photo) -> ApiResult<Tutor> {
        let request = ApiRequest::post(format!("{TUTORS}/{id}/fotos"))
            .with_body(RequestBody::Multipart(photo.into_multipart()));
        decode(self.api.send(request).await?)
    }

    /// Deletes a tutor.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        expect_success(self.api.send(ApiRequest::delete(format!("{TUTORS}/{id}"))).await?)?;
        Ok(())
    }

    /// Links a pet to a tutor.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn link_pet(&self, tutor_id: u64, pet_id: u64) -> ApiResult<()> {
        let request = ApiRequest::post(format!("{TUTORS}/{tutor_id}/pets/{pet_id}"))
            .with_json(&serde_json::json!({}))?;
        expect_success(self.api.send(request).await?)?;
        Ok(())
    }

    /// Removes the link between a pet and a tutor.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn unlink_pet(&self, tutor_id: u64, pet_id: u64) -> ApiResult<()> {
        let request = ApiRequest::delete(format!("{TUTORS}/{tutor_id}/pets/{pet_id}"));
        expect_success(self.api.send(request).await?)?;
        Ok(())
    }

    /// Lists the pets linked to a tutor.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the list cannot be decoded.
    pub async fn linked_pets(&self, tutor_id: u64) -> ApiResult<Vec<Pet>> {
        decode(
            self.api
                .send(ApiRequest::get(format!("{TUTORS}/{tutor_id}/pets")))
                .await?,
        )
    }
}
