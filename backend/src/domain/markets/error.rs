//! Failures raised while validating, reconciling or persisting markets.

use serde_json::json;
use thiserror::Error;

use super::model::MarketId;
use super::taxonomy::{Region, SubRegion};
use super::validation::FieldError;
use crate::domain::Error;
use crate::domain::ports::MarketRepositoryError;

/// Which uniqueness rule a request broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UniquenessConflict {
    #[error("market name '{0}' is already in use")]
    MarketName(String),
    #[error("market code '{0}' is already in use")]
    MarketCode(String),
    #[error("subgroup name '{0}' is requested more than once")]
    DuplicateRequestedSubGroupName(String),
    #[error("subgroup code '{0}' is requested more than once")]
    DuplicateRequestedSubGroupCode(String),
    #[error("subgroup name '{0}' is already used in this market")]
    SubGroupNameTaken(String),
    #[error("subgroup code '{0}' is already used in this market")]
    SubGroupCodeTaken(String),
}

impl UniquenessConflict {
    /// Request field the conflict is reported against.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MarketName(_) => "name",
            Self::MarketCode(_) => "code",
            Self::DuplicateRequestedSubGroupName(_) | Self::SubGroupNameTaken(_) => {
                "subGroupName"
            }
            Self::DuplicateRequestedSubGroupCode(_) | Self::SubGroupCodeTaken(_) => {
                "subGroupCode"
            }
        }
    }

    /// Stable machine-readable kind for error details.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MarketName(_) => "marketName",
            Self::MarketCode(_) => "marketCode",
            Self::DuplicateRequestedSubGroupName(_) => "duplicateRequestedSubGroupName",
            Self::DuplicateRequestedSubGroupCode(_) => "duplicateRequestedSubGroupCode",
            Self::SubGroupNameTaken(_) => "subGroupNameTaken",
            Self::SubGroupCodeTaken(_) => "subGroupCodeTaken",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::MarketName(value)
            | Self::MarketCode(value)
            | Self::DuplicateRequestedSubGroupName(value)
            | Self::DuplicateRequestedSubGroupCode(value)
            | Self::SubGroupNameTaken(value)
            | Self::SubGroupCodeTaken(value) => value,
        }
    }
}

/// Error type for every market use-case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    #[error("request failed validation ({} field error(s))", .0.len())]
    FieldValidation(Vec<FieldError>),
    #[error(transparent)]
    UniquenessConflict(UniquenessConflict),
    #[error("sub-region {sub_region} does not belong to region {region}")]
    TaxonomyMismatch { region: Region, sub_region: SubRegion },
    #[error("market {0} not found")]
    NotFound(MarketId),
    #[error("write rejected by the store: {0}")]
    WriteConflict(String),
    #[error("market {0} still owns subgroups")]
    MarketNotEmpty(MarketId),
    #[error("request was cancelled")]
    Cancelled,
    #[error("market store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("market store failure: {0}")]
    Store(String),
}

impl MarketError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldValidation(vec![FieldError::new(field, message)])
    }
}

impl From<UniquenessConflict> for MarketError {
    fn from(value: UniquenessConflict) -> Self {
        Self::UniquenessConflict(value)
    }
}

impl From<MarketRepositoryError> for MarketError {
    fn from(value: MarketRepositoryError) -> Self {
        match value {
            MarketRepositoryError::Connection { message } => Self::StoreUnavailable(message),
            MarketRepositoryError::Conflict { message } => Self::WriteConflict(message),
            MarketRepositoryError::Query { message } => Self::Store(message),
        }
    }
}

impl From<MarketError> for Error {
    fn from(value: MarketError) -> Self {
        let message = value.to_string();
        match value {
            MarketError::FieldValidation(errors) => Error::invalid_request(message)
                .with_details(json!({ "fieldErrors": errors })),
            MarketError::UniquenessConflict(conflict) => Error::conflict(message).with_details(
                json!({
                    "conflict": conflict.kind(),
                    "field": conflict.field(),
                    "value": conflict.value(),
                }),
            ),
            MarketError::TaxonomyMismatch { region, sub_region } => {
                Error::invalid_request(message).with_details(json!({
                    "fieldErrors": [FieldError::new("subRegion", format!(
                        "sub-region {sub_region} is not valid for region {region}"
                    ))],
                }))
            }
            MarketError::NotFound(_) => Error::not_found(message),
            MarketError::WriteConflict(_) => {
                Error::conflict("market was modified concurrently; retry the request")
            }
            MarketError::MarketNotEmpty(_) => Error::conflict(message),
            MarketError::Cancelled => Error::service_unavailable(message),
            MarketError::StoreUnavailable(_) => {
                Error::service_unavailable("market store unavailable")
            }
            MarketError::Store(_) => Error::internal(message),
        }
    }
}
