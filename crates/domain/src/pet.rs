//! Pet resource types.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A pet as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    /// Server-assigned id.
    pub id: u64,
    /// Name.
    pub nome: String,
    /// Species, when the API reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub especie: Option<String>,
    /// Age in years.
    #[serde(default)]
    pub idade: u32,
    /// Breed.
    #[serde(default)]
    pub raca: String,
    /// Photo URL, once a photo was uploaded.
    #[serde(default, rename = "urlFoto", skip_serializing_if = "Option::is_none")]
    pub url_foto: Option<String>,
}

/// Fields accepted when creating or updating a pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetForm {
    /// Name.
    pub nome: String,
    /// Breed.
    pub raca: String,
    /// Age in years.
    pub idade: u32,
}

impl PetForm {
    /// Creates a form.
    #[must_use]
    pub fn new(nome: impl Into<String>, raca: impl Into<String>, idade: u32) -> Self {
        Self {
            nome: nome.into(),
            raca: raca.into(),
            idade,
        }
    }

    /// Checks required fields before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` when the name is blank.
    pub fn validate(&self) -> DomainResult<()> {
        if self.nome.trim().is_empty() {
            return Err(DomainError::InvalidField {
                field: "nome",
                reason: "must not be blank".to_string(),
            });
        }
        Ok(())
    }
}
