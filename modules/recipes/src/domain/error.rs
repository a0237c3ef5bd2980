use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Recipe not found: {id}")]
    RecipeNotFound { id: i64 },

    #[error("{field} is required")]
    FieldRequired { field: String },

    #[error("{field} is invalid")]
    FieldInvalid { field: String },

    #[error("{field} is not allowed")]
    FieldNotAllowed { field: String },

    #[error("request body must be a JSON object")]
    InvalidBody,

    #[error("All required fields are required")]
    FormIncomplete,

    #[error("Recipe named '{name}' already exists")]
    NameAlreadyExists { name: String },

    #[error("Content is required")]
    CommentContentRequired,

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn recipe_not_found(id: i64) -> Self {
        Self::RecipeNotFound { id }
    }

    pub fn field_required(field: impl Into<String>) -> Self {
        Self::FieldRequired {
            field: field.into(),
        }
    }

    pub fn field_invalid(field: impl Into<String>) -> Self {
        Self::FieldInvalid {
            field: field.into(),
        }
    }

    pub fn field_not_allowed(field: impl Into<String>) -> Self {
        Self::FieldNotAllowed {
            field: field.into(),
        }
    }

    pub fn name_already_exists(name: impl Into<String>) -> Self {
        Self::NameAlreadyExists { name: name.into() }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Client-side mistakes that never touched storage.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::FieldRequired { .. }
                | Self::FieldInvalid { .. }
                | Self::FieldNotAllowed { .. }
                | Self::InvalidBody
                | Self::FormIncomplete
                | Self::CommentContentRequired
        )
    }
}

impl From<DomainError> for crate::contract::error::RecipesError {
    fn from(e: DomainError) -> Self {
        use crate::contract::error::RecipesError;
        match e {
            DomainError::RecipeNotFound { id } => RecipesError::not_found(id),
            DomainError::NameAlreadyExists { name } => RecipesError::conflict(name),
            DomainError::Database { .. } => RecipesError::internal(),
            other => RecipesError::validation(other.to_string()),
        }
    }
}
