//! Save tutor use case.

use petmanager_domain::{Photo, Tutor, TutorForm};
use tracing::info;

use crate::error::ApiResult;
use crate::services::TutorService;

/// Input for saving a tutor.
#[derive(Debug, Clone)]
pub struct SaveTutorInput {
    /// Id of the tutor to update; None creates a new one.
    pub id: Option<u64>,
    /// Tutor fields.
    pub form: TutorForm,
    /// Photo to upload after the fields are saved.
    pub photo: Option<Photo>,
}

/// Use case for creating or updating a tutor together with their photo.
pub struct SaveTutor {
    tutors: TutorService,
}

impl SaveTutor {
    /// Creates a new `SaveTutor` use case.
    #[must_use]
    pub const fn new(tutors: TutorService) -> Self {
        Self { tutors }
    }

    /// Saves the fields, then uploads the photo if one was given.
    ///
    /// # Errors
    ///
    /// Returns the first failing call's error; later steps are skipped.
    pub async fn execute(&self, input: SaveTutorInput) -> ApiResult<Tutor> {
        let tutor = match input.id {
            Some(id) => self.tutors.update(id, &input.form).await?,
            None => self.tutors.create(&input.form).await?,
        };

        let tutor = match input.photo {
            Some(photo) => self.tutors.upload_photo(tutor.id, photo).await?,
            None => tutor,
        };

        info!(tutor_id = tutor.id, "tutor saved");
        Ok(tutor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::testing::{FakeApi, Harness};
    use petmanager_domain::{ApiResponse, DomainError};

    #[tokio::test]
    async fn test_invalid_phone_is_rejected_locally() {
        let h = Harness::new(FakeApi::new(|_| Ok(ApiResponse::empty(201)))).logged_in("T1", "R1");
        let save = SaveTutor::new(TutorService::new(h.interceptor.clone()));

        let err = save
            .execute(SaveTutorInput {
                id: None,
                form: TutorForm::new("Ana", "sem telefone", "Rua A"),
                photo: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Domain(DomainError::InvalidField {
                field: "telefone",
                ..
            })
        ));
        assert!(h.api.requests().is_empty());
    }

    #[tokio::test]
    async fn test_create_tutor_with_photo() {
        let h = Harness::new(FakeApi::new(|_| {
            Ok(ApiResponse::json(
                201,
                &serde_json::json!({"id": 3, "nome": "Ana", "telefone": "65999990000", "endereco": "Rua A"}),
            ))
        }))
        .logged_in("T1", "R1");
        let save = SaveTutor::new(TutorService::new(h.interceptor.clone()));

        let tutor = save
            .execute(SaveTutorInput {
                id: None,
                form: TutorForm::new("Ana", "65999990000", "Rua A"),
                photo: Some(Photo::new("ana.png", "image/png", vec![0x89])),
            })
            .await
            .unwrap();

        assert_eq!(tutor.id, 3);
        assert_eq!(h.api.requests()[1].path, "/v1/tutores/3/fotos");
    }
}
