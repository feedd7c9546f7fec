use thiserror::Error;

/// Low-level reasons a provider call did not produce a body.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured for the geolocation provider")]
    MissingApiKey,
    #[error("invalid provider URL: {0}")]
    InvalidUrl(String),
    #[error("request to provider failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("provider responded with HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("could not decode provider response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("lookup task ended abnormally: {0}")]
    TaskFailed(String),
}

/// User-visible lookup failures. The `Display` text is shown verbatim in the results panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupFailure {
    #[error("Failed to fetch initial location data")]
    InitialLookupFailed,
    #[error("Failed to fetch location data")]
    SubmitLookupFailed,
    #[error("No location data found for this IP")]
    NoLocationData,
}
