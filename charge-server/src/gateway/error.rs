//! Gateway error types.

use crate::ocm::OcmError;

/// Hard failures of the nearby-stations query.
///
/// Upstream trouble is deliberately absent: the gateway soft-fails it into
/// an empty [`NearbyOutcome`](super::NearbyOutcome).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// `lat` or `lng` was not supplied.
    #[error("lat and lng query parameters are required")]
    MissingCoordinates,

    /// A parameter was supplied but is not usable.
    #[error("invalid {name}: {value:?}")]
    InvalidParameter { name: &'static str, value: String },

    /// The upstream API key is missing. A deployment defect, not transient.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl GatewayError {
    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GatewayError::MissingCoordinates | GatewayError::InvalidParameter { .. }
        )
    }
}

/// Failure of a regional snapshot fetch. Never soft-failed.
#[derive(Debug, thiserror::Error)]
#[error("regional snapshot unavailable: {source}")]
pub struct RegionalError {
    #[from]
    source: OcmError,
}

impl RegionalError {
    /// The underlying upstream error.
    pub fn upstream(&self) -> &OcmError {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            GatewayError::MissingCoordinates.to_string(),
            "lat and lng query parameters are required"
        );

        let err = GatewayError::InvalidParameter {
            name: "lat",
            value: "north".into(),
        };
        assert_eq!(err.to_string(), "invalid lat: \"north\"");

        let err = RegionalError::from(OcmError::RateLimited);
        assert_eq!(
            err.to_string(),
            "regional snapshot unavailable: rate limited by Open Charge Map"
        );
        assert!(matches!(err.upstream(), OcmError::RateLimited));
    }

    #[test]
    fn client_errors() {
        assert!(GatewayError::MissingCoordinates.is_client_error());
        assert!(
            GatewayError::InvalidParameter {
                name: "maxresults",
                value: "0".into()
            }
            .is_client_error()
        );
        assert!(!GatewayError::NotConfigured("x".into()).is_client_error());
    }
}
