//! Tutor (pet owner) resource types.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A tutor as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tutor {
    /// Server-assigned id.
    pub id: u64,
    /// Full name.
    pub nome: String,
    /// Phone number, digits only or formatted.
    #[serde(default)]
    pub telefone: String,
    /// Postal address.
    #[serde(default)]
    pub endereco: String,
    /// Photo URL, once a photo was uploaded.
    #[serde(default, rename = "urlFoto", skip_serializing_if = "Option::is_none")]
    pub url_foto: Option<String>,
}

/// Fields accepted when creating or updating a tutor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorForm {
    /// Full name.
    pub nome: String,
    /// Phone number.
    pub telefone: String,
    /// Postal address.
    pub endereco: String,
}

impl TutorForm {
    /// Creates a form.
    #[must_use]
    pub fn new(
        nome: impl Into<String>,
        telefone: impl Into<String>,
        endereco: impl Into<String>,
    ) -> Self {
        Self {
            nome: nome.into(),
            telefone: telefone.into(),
            endereco: endereco.into(),
        }
    }

    /// Checks required fields before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` for a blank name or a phone
    /// number without digits.
    pub fn validate(&self) -> DomainResult<()> {
        if self.nome.trim().is_empty() {
            return Err(DomainError::InvalidField {
                field: "nome",
                reason: "must not be blank".to_string(),
            });
        }
        if !self.telefone.chars().any(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidField {
                field: "telefone",
                reason: "must contain digits".to_string(),
            });
        }
        Ok(())
    }
}
