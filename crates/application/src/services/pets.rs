//! Pet endpoints.

use std::sync::Arc;

use petmanager_domain::{ApiRequest, Page, PageRequest, Pet, PetForm, Photo, RequestBody};

use super::{decode, expect_success};
use crate::auth::AuthInterceptor;
use crate::error::ApiResult;

const PETS: &str = "/v1/pets";

/// Client for `/v1/pets`.
#[derive(Debug, Clone)]
pub struct PetService {
    api: Arc<AuthInterceptor>,
}

impl PetService {
    /// Creates a service sending through `api`.
    #[must_use]
    pub const fn new(api: Arc<AuthInterceptor>) -> Self {
        Self { api }
    }

    /// Lists one page of pets, optionally filtered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the page cannot be decoded.
    pub async fn list(&self, page: &PageRequest) -> ApiResult<Page<Pet>> {
        decode(self.api.send(page.apply(ApiRequest::get(PETS))).await?)
    }

    /// Fetches one pet.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the pet cannot be decoded.
    pub async fn get(&self, id: u64) -> ApiResult<Pet> {
        decode(self.api.send(ApiRequest::get(format!("{PETS}/{id}"))).await?)
    }

    /// Creates a pet.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is invalid or the call fails.
    pub async fn create(&self, form: &PetForm) -> ApiResult<Pet> {
        form.validate()?;
        let request = ApiRequest::post(PETS).with_json(form)?;
        decode(self.api.send(request).await?)
    }

    /// Replaces a pet's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is invalid or the call fails.
    pub async fn update(&self, id: u64, form: &PetForm) -> ApiResult<Pet> {
        form.validate()?;
        let request = ApiRequest::put(format!("{PETS}/{id}")).with_json(form)?;
        decode(self.api.send(request).await?)
    }

    /// Uploads a pet's photo.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn upload_photo(&self, id: u64, photo: Photo) -> ApiResult<Pet> {
        let request = ApiRequest::post(format!("{PETS}/{id}/fotos"))
            .with_body(RequestBody::Multipart(photo.into_multipart()));
        decode(self.api.send(request).await?)
    }

    /// Deletes a pet.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        expect_success(self.api.send(ApiRequest::delete(format!("{PETS}/{id}"))).await?)?;
        Ok(())
    }
}
