//! Error taxonomy for the migration pipeline.
//!
//! Read-side failures (`SourceUnavailable` / `TargetUnavailable`) are fatal to
//! the category being migrated but not to the run; everything else is caught
//! at the entry level, logged, and counted.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    /// The legacy store could not be listed after retries.
    #[error("legacy store unavailable")]
    SourceUnavailable(#[source] Box<MigrateError>),

    /// A target listing page could not be fetched after retries. Entries
    /// accumulated from earlier pages are discarded; partial listings are
    /// never treated as complete.
    #[error("target store unavailable (page {page})")]
    TargetUnavailable {
        page: u32,
        #[source]
        source: Box<MigrateError>,
    },

    /// Single-attempt download of a legacy media URL failed. Not retried:
    /// the legacy store is static, so a failure here is unlikely to be
    /// transient.
    #[error("download failed for {url}: {detail}")]
    DownloadFailed { url: String, detail: String },

    /// All attempts of a retried call failed. `body` holds the first 200
    /// characters of the last response body (or the transport error text
    /// when no response was received).
    #[error("{endpoint}: retries exhausted after {attempts} attempts (status {status:?}): {body}")]
    ExhaustedRetries {
        endpoint: String,
        attempts: u32,
        status: Option<u16>,
        body: String,
    },

    /// The final attempt returned a successful status but a body that could
    /// not be parsed as the expected JSON shape.
    #[error("{endpoint}: malformed response after {attempts} attempts: {body}")]
    MalformedResponse {
        endpoint: String,
        attempts: u32,
        body: String,
    },

    /// The target store rejected an entry update.
    #[error("update failed for {category}/{document_id}: HTTP {status}: {body}")]
    UpdateFailed {
        category: String,
        document_id: String,
        status: u16,
        body: String,
    },

    /// Required configuration was missing at startup. Fatal before any
    /// network endpoint is contacted.
    #[error("{0} is required. Set it as an environment variable.")]
    StartupConfigMissing(&'static str),
}
