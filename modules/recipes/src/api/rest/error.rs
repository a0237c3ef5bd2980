use api_ingress::AppError;

use crate::domain::error::DomainError;

/// Map a domain error to the HTTP error rendered as `{"error": ...}`.
pub fn map_domain_error(e: &DomainError) -> AppError {
    match e {
        DomainError::RecipeNotFound { .. } => AppError::NotFound("Recipe not found".to_string()),
        DomainError::NameAlreadyExists { .. } => {
            AppError::Conflict("name already exists".to_string())
        }
        DomainError::Database { message } => AppError::Internal(anyhow::anyhow!(message.clone())),
        other => AppError::BadRequest(other.to_string()),
    }
}

/// Path ids arrive as text so a bad one gets a JSON 400, not axum's plain rejection.
pub fn parse_recipe_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::BadRequest("invalid recipe id".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn status_mapping() {
        let cases = [
            (DomainError::recipe_not_found(3), StatusCode::NOT_FOUND),
            (DomainError::name_already_exists("Soup"), StatusCode::CONFLICT),
            (DomainError::field_required("name"), StatusCode::BAD_REQUEST),
            (DomainError::field_invalid("prep_time"), StatusCode::BAD_REQUEST),
            (DomainError::field_not_allowed("id"), StatusCode::BAD_REQUEST),
            (DomainError::InvalidBody, StatusCode::BAD_REQUEST),
            (DomainError::CommentContentRequired, StatusCode::BAD_REQUEST),
            (DomainError::database("disk I/O"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(map_domain_error(&err).status(), status, "{err}");
        }
    }

    #[test]
    fn validation_messages_name_the_field() {
        assert_eq!(
            map_domain_error(&DomainError::field_invalid("prep_time")).to_string(),
            "prep_time is invalid"
        );
        assert_eq!(
            map_domain_error(&DomainError::recipe_not_found(9)).to_string(),
            "Recipe not found"
        );
    }

    #[test]
    fn recipe_id_must_be_integer() {
        assert_eq!(parse_recipe_id("42").unwrap(), 42);
        assert!(parse_recipe_id("abc").is_err());
        assert!(parse_recipe_id("").is_err());
    }
}
