//! Save pet use case.

use petmanager_domain::{Pet, PetForm, Photo};
use tracing::info;

use crate::error::ApiResult;
use crate::services::PetService;

/// Input for saving a pet.
#[derive(Debug, Clone)]
pub struct SavePetInput {
    /// Id of the pet to update; None creates a new one.
    pub id: Option<u64>,
    /// Pet fields.
    pub form: PetForm,
    /// Photo to upload after the fields are saved.
    pub photo: Option<Photo>,
}

/// Use case for creating or updating a pet together with its photo.
pub struct SavePet {
    pets: PetService,
}

impl SavePet {
    /// Creates a new `SavePet` use case.
    #[must_use]
    pub const fn new(pets: PetService) -> Self {
        Self { pets }
    }

    /// Saves the fields, then uploads the photo if one was given.
    ///
    /// # Errors
    ///
    /// Returns the first failing call's error; later steps are skipped.
    pub async fn execute(&self, input: SavePetInput) -> ApiResult<Pet> {
        let pet = match input.id {
            Some(id) => self.pets.update(id, &input.form).await?,
            None => self.pets.create(&input.form).await?,
        };

        let pet = match input.photo {
            Some(photo) => self.pets.upload_photo(pet.id, photo).await?,
            None => pet,
        };

        info!(pet_id = pet.id, nome = %pet.nome, "pet saved");
        Ok(pet)
    }
}
