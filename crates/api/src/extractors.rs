//! Request extractors and field validators.

use std::borrow::Cow;

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use validator::{Validate, ValidationError, ValidationErrors};

use forecourt_shared::{
    AppError, FieldErrors,
    types::{AmountError, non_negative_amount, positive_amount},
};

use crate::error::ApiError;

/// JSON body that is deserialized and then checked with [`Validate`].
///
/// Both malformed bodies and rule violations become 422 responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation("body", rejection.body_text()))?;
        value.validate().map_err(validation_error)?;
        Ok(Self(value))
    }
}

/// Flattens `validator` output into the `{field: [messages]}` shape.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut fields = FieldErrors::new();
    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map_or_else(|| format!("The {field} field is invalid"), ToString::to_string)
            })
            .collect();
        fields.insert(field.to_string(), messages);
    }

    AppError::Validation {
        message: "The given data was invalid".to_string(),
        fields,
    }
}

fn amount_error(err: AmountError) -> ValidationError {
    ValidationError::new("amount").with_message(Cow::Owned(format!("The value {err}")))
}

/// Money greater than zero with cent precision.
pub fn positive_money(amount: &Decimal) -> Result<(), ValidationError> {
    positive_amount(*amount).map(|_| ()).map_err(amount_error)
}

/// Money of zero or more with cent precision.
pub fn non_negative_money(amount: &Decimal) -> Result<(), ValidationError> {
    non_negative_amount(*amount).map(|_| ()).map_err(amount_error)
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
