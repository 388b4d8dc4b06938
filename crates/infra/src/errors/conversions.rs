//! Conversions from external infrastructure errors into domain errors.

use allsee_domain::AllSeeError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AllSeeError);

impl From<InfraError> for AllSeeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AllSeeError> for InfraError {
    fn from(value: AllSeeError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → AllSeeError */
/* -------------------------------------------------------------------------- */

/// Client construction only; request failures map to `NetworkError` in the
/// transport instead.
impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(AllSeeError::Config(format!("failed to build HTTP client: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
