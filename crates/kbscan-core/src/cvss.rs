//! CVSS scoring seam
//!
//! Checks carry the raw CVSS vector from the knowledge base. Turning it into
//! a numeric base score is the job of an external scoring component plugged
//! in through [`CvssScorer`].

use crate::error::Result;

/// Interface for CVSS base score computation (implemented outside this crate)
pub trait CvssScorer: Send + Sync {
    /// Compute the base score for a CVSS vector string.
    ///
    /// Implementations return [`crate::Error::CvssScoring`] for malformed vectors.
    fn score(&self, vector: &str) -> Result<f64>;
}

impl<F> CvssScorer for F
where
    F: Fn(&str) -> Result<f64> + Send + Sync,
{
    fn score(&self, vector: &str) -> Result<f64> {
        self(vector)
    }
}
