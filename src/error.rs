/// A tool invocation that never produced a result.
///
/// Distinct from a tool that ran and returned a failure payload; those
/// come back as ordinary results.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("tool host refused the call: {message} (code {code})")]
    Protocol { code: i64, message: String },
}
