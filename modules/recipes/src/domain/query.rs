//! Turns raw query-string pairs into a [`FilterRequest`].

use crate::domain::error::DomainError;
use crate::domain::fields::{parse_prep_time, FieldInput, FieldRegistry, RecipeField};

pub const ORDERING_QUERY_KEY: &str = "ordering";
pub const SEARCH_QUERY_KEY: &str = "search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Id,
    Field(RecipeField),
}

/// Filter value after validation; `prep_time` compares as an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterRequest {
    pub order_by: SortKey,
    pub direction: SortDirection,
    /// Equality filters, in registry order.
    pub filters: Vec<(RecipeField, FilterValue)>,
    /// Case-insensitive substring of name or category.
    pub search: Option<String>,
}

impl FilterRequest {
    /// Parse query pairs. Unknown keys are ignored; when a key repeats the
    /// first occurrence wins. An unknown ordering field falls back to id
    /// ascending. The first invalid filter value, in registry order, fails
    /// the whole request.
    pub fn from_query(
        pairs: &[(String, String)],
        registry: &FieldRegistry,
    ) -> Result<Self, DomainError> {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        let (order_by, direction) = match first(ORDERING_QUERY_KEY) {
            None => (SortKey::Id, SortDirection::Asc),
            Some(token) => {
                let (name, direction) = match token.strip_prefix('-') {
                    Some(rest) => (rest, SortDirection::Desc),
                    None => (token, SortDirection::Asc),
                };
                match registry.get(name) {
                    Some((field, _)) => (SortKey::Field(field), direction),
                    None => (SortKey::Id, SortDirection::Asc),
                }
            }
        };

        let mut filters = Vec::new();
        for (field, validator) in registry.iter() {
            let Some(raw) = first(field.as_str()) else {
                continue;
            };
            if !validator(FieldInput::Text(raw)) {
                return Err(DomainError::field_invalid(field.as_str()));
            }
            let value = match field {
                RecipeField::PrepTime => match parse_prep_time(FieldInput::Text(raw)) {
                    Some(n) => FilterValue::Int(i64::from(n)),
                    None => return Err(DomainError::field_invalid(field.as_str())),
                },
                _ => FilterValue::Text(raw.to_string()),
            };
            filters.push((field, value));
        }

        let search = first(SEARCH_QUERY_KEY)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            order_by,
            direction,
            filters,
            search,
        })
    }
}
