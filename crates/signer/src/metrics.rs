use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::EnclaveSigner`].
#[derive(Metrics, Clone)]
#[metrics(scope = "signer")]
pub struct SignerMetrics {
    /// The signing duration.
    pub signing_duration: Histogram,
}

/// The metrics for the [`super::SignatureValidator`].
#[derive(Metrics, Clone)]
#[metrics(scope = "signer.validator")]
pub struct ValidatorMetrics {
    /// The signatures rejected by the validator.
    pub rejected_signatures: Counter,
}
