use crate::types::DbId;

/// Domain error taxonomy shared by the persistence and HTTP layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{field}: {}", reasons.join(", "))
            })
            .collect();
        // HashMap iteration order is unstable; keep messages deterministic.
        fields.sort();
        CoreError::Validation(fields.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Probe {
        #[validate(range(min = 0, max = 10, message = "out of range"))]
        value: i32,
        #[validate(length(min = 1))]
        label: String,
    }

    #[test]
    fn test_validation_errors_convert_to_validation_variant() {
        let probe = Probe {
            value: 42,
            label: String::new(),
        };
        let err: CoreError = probe.validate().unwrap_err().into();
        assert_matches!(
            err,
            CoreError::Validation(ref msg) if msg == "label: length; value: out of range"
        );
    }

    #[test]
    fn test_not_found_display_names_entity() {
        let err = CoreError::NotFound {
            entity: "WalkSession",
            id: 7,
        };
        assert_eq!(err.to_string(), "Entity not found: WalkSession with id 7");
    }
}
