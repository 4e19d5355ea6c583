//! Concurrent per-frame analysis with ordered join semantics.
//!
//! One request is issued per sampled frame, all in flight at once; the
//! caller blocks until every request resolves. Results come back indexed
//! exactly like the input payloads, regardless of completion order, because
//! interpolation pairs detection sets with sampled-frame positions.
//!
//! A single request failure fails the whole batch — there is no partial
//! fan-out recovery. Whether to retry the batch is the caller's decision.

use crate::{analyzer::VisionAnalyzer, error::SidelineError};

/// Default cap on how many sampled frames are analyzed per run.
///
/// Bounds cost and rate-limit exposure towards the backend; sampled frames
/// beyond the cap are skipped, not queued.
pub const DEFAULT_ANALYSIS_CAP: usize = 10;

/// Fan out one analysis request per payload, capped at `cap` requests.
///
/// Returns the raw text responses in payload order.
///
/// # Errors
///
/// Propagates the first [`SidelineError::Analysis`] from any request,
/// failing the entire batch.
pub async fn analyze_frames<A>(
    analyzer: &A,
    payloads: &[Vec<u8>],
    cap: usize,
) -> Result<Vec<String>, SidelineError>
where
    A: VisionAnalyzer + ?Sized,
{
    if payloads.len() > cap {
        log::info!(
            "Analyzing first {cap} of {} sampled frames (analysis cap)",
            payloads.len()
        );
    }

    let requests = payloads
        .iter()
        .take(cap)
        .map(|payload| analyzer.analyze_frame(payload));

    // try_join_all polls every request concurrently and preserves input
    // order in the output.
    let responses = futures::future::try_join_all(requests).await?;

    log::debug!("Analysis batch complete: {} responses", responses.len());
    Ok(responses)
}
