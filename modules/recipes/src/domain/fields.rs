//! Recipe field validators and the ordered registry built from them.
//!
//! The registry is the single source of truth for which fields are required
//! on create/replace, which may appear in a PATCH body, and which are
//! eligible as sort and filter keys. Its order decides which error wins when
//! several fields are wrong at once.

use std::fmt;

use serde_json::{Map, Value};

use crate::contract::model::{NewRecipe, RecipePatch};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeField {
    Name,
    Category,
    Description,
    PrepTime,
    Instructions,
}

impl RecipeField {
    pub const ALL: [RecipeField; 5] = [
        RecipeField::Name,
        RecipeField::Category,
        RecipeField::Description,
        RecipeField::PrepTime,
        RecipeField::Instructions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecipeField::Name => "name",
            RecipeField::Category => "category",
            RecipeField::Description => "description",
            RecipeField::PrepTime => "prep_time",
            RecipeField::Instructions => "instructions",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for RecipeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw value as it reached us: typed JSON from a body, or text from a
/// query string or form post.
#[derive(Debug, Clone, Copy)]
pub enum FieldInput<'a> {
    Json(&'a Value),
    Text(&'a str),
}

impl<'a> FieldInput<'a> {
    fn as_str(self) -> Option<&'a str> {
        match self {
            FieldInput::Json(Value::String(s)) => Some(s.as_str()),
            FieldInput::Json(_) => None,
            FieldInput::Text(s) => Some(s),
        }
    }
}

pub type Validator = fn(FieldInput<'_>) -> bool;

/// Non-empty and alphabetic only: no digits, spaces or punctuation.
pub fn validate_name(input: FieldInput<'_>) -> bool {
    input
        .as_str()
        .is_some_and(|s| !s.is_empty() && s.chars().all(char::is_alphabetic))
}

pub fn validate_text(input: FieldInput<'_>) -> bool {
    input.as_str().is_some_and(|s| !s.is_empty())
}

pub fn validate_prep_time(input: FieldInput<'_>) -> bool {
    parse_prep_time(input).is_some()
}

/// Integer strictly between 0 and 999. JSON input must be an integer
/// number; text input must be ASCII digits only.
pub fn parse_prep_time(input: FieldInput<'_>) -> Option<i32> {
    let value = match input {
        FieldInput::Json(v) => v.as_i64()?,
        FieldInput::Text(s) => {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse::<i64>().ok()?
        }
    };
    if 0 < value && value < 999 {
        i32::try_from(value).ok()
    } else {
        None
    }
}

/// Which validator set a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationProfile {
    /// Alphabetic name, free text elsewhere.
    #[default]
    Standard,
    /// Every string field must be alphabetic.
    Strict,
}

/// Ordered (field, validator) pairs. Immutable once built.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    entries: Vec<(RecipeField, Validator)>,
}

impl FieldRegistry {
    pub fn standard() -> Self {
        Self {
            entries: vec![
                (RecipeField::Name, validate_name as Validator),
                (RecipeField::Category, validate_text),
                (RecipeField::Description, validate_text),
                (RecipeField::PrepTime, validate_prep_time),
                (RecipeField::Instructions, validate_text),
            ],
        }
    }

    pub fn strict() -> Self {
        Self {
            entries: vec![
                (RecipeField::Name, validate_name as Validator),
                (RecipeField::Category, validate_name),
                (RecipeField::Description, validate_name),
                (RecipeField::PrepTime, validate_prep_time),
                (RecipeField::Instructions, validate_name),
            ],
        }
    }

    pub fn for_profile(profile: ValidationProfile) -> Self {
        match profile {
            ValidationProfile::Standard => Self::standard(),
            ValidationProfile::Strict => Self::strict(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecipeField, Validator)> + '_ {
        self.entries.iter().copied()
    }

    pub fn get(&self, name: &str) -> Option<(RecipeField, Validator)> {
        self.iter().find(|(f, _)| f.as_str() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn validator_for(&self, field: RecipeField) -> Option<Validator> {
        self.iter().find(|(f, _)| *f == field).map(|(_, v)| v)
    }

    fn accepts(&self, field: RecipeField, input: FieldInput<'_>) -> bool {
        self.validator_for(field).is_some_and(|v| v(input))
    }

    /// Create/replace check: walk the registry in order; a missing field is
    /// `required`, a present but rejected one is `invalid`. First failure wins.
    pub fn check_required(&self, body: &Map<String, Value>) -> Result<(), DomainError> {
        for (field, validator) in self.iter() {
            match body.get(field.as_str()) {
                None => return Err(DomainError::field_required(field.as_str())),
                Some(v) if !validator(FieldInput::Json(v)) => {
                    return Err(DomainError::field_invalid(field.as_str()))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// PATCH check: walk the body keys; keys outside the registry are
    /// `not allowed`, rejected values are `invalid`.
    pub fn check_patch(&self, body: &Map<String, Value>) -> Result<(), DomainError> {
        for (key, value) in body {
            let Some((_, validator)) = self.get(key) else {
                return Err(DomainError::field_not_allowed(key.as_str()));
            };
            if !validator(FieldInput::Json(value)) {
                return Err(DomainError::field_invalid(key.as_str()));
            }
        }
        Ok(())
    }

    /// Form check: every registry field must be present (else
    /// `FormIncomplete`), then each value is validated in registry order.
    pub fn check_form(&self, form: &[(String, String)]) -> Result<(), DomainError> {
        let lookup = |name: &str| form.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());
        if self.iter().any(|(f, _)| lookup(f.as_str()).is_none()) {
            return Err(DomainError::FormIncomplete);
        }
        for (field, validator) in self.iter() {
            let value = lookup(field.as_str()).unwrap_or_default();
            if !validator(FieldInput::Text(value)) {
                return Err(DomainError::field_invalid(field.as_str()));
            }
        }
        Ok(())
    }

    /// Value check for an already-typed recipe.
    pub fn check_new_recipe(&self, recipe: &NewRecipe) -> Result<(), DomainError> {
        for (field, _) in self.iter() {
            let value = match field {
                RecipeField::Name => Value::from(recipe.name.as_str()),
                RecipeField::Category => Value::from(recipe.category.as_str()),
                RecipeField::Description => Value::from(recipe.description.as_str()),
                RecipeField::PrepTime => Value::from(recipe.prep_time),
                RecipeField::Instructions => Value::from(recipe.instructions.as_str()),
            };
            if !self.accepts(field, FieldInput::Json(&value)) {
                return Err(DomainError::field_invalid(field.as_str()));
            }
        }
        Ok(())
    }

    /// Value check for the fields a typed patch sets.
    pub fn check_typed_patch(&self, patch: &RecipePatch) -> Result<(), DomainError> {
        let provided = [
            (RecipeField::Name, patch.name.as_deref().map(Value::from)),
            (RecipeField::Category, patch.category.as_deref().map(Value::from)),
            (RecipeField::Description, patch.description.as_deref().map(Value::from)),
            (RecipeField::PrepTime, patch.prep_time.map(Value::from)),
            (RecipeField::Instructions, patch.instructions.as_deref().map(Value::from)),
        ];
        for (field, value) in provided {
            if let Some(v) = value {
                if !self.accepts(field, FieldInput::Json(&v)) {
                    return Err(DomainError::field_invalid(field.as_str()));
                }
            }
        }
        Ok(())
    }
}
