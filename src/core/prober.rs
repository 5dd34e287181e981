use crate::domain::model::{ReadinessCheckResult, ReadinessOutcome};
use crate::domain::ports::ModelRuntime;
use crate::utils::cancel::CancelToken;
use std::time::{Duration, Instant};

/// Polls the runtime's readiness endpoint at a fixed interval until it
/// answers or the overall budget runs out. The target is a local process
/// expected to come up quickly, so plain polling beats backoff here.
#[derive(Debug, Clone)]
pub struct ReadinessProber {
    poll_interval: Duration,
    attempt_timeout: Duration,
    max_wait: Duration,
}

impl ReadinessProber {
    pub fn new(poll_interval: Duration, attempt_timeout: Duration, max_wait: Duration) -> Self {
        Self {
            poll_interval,
            attempt_timeout,
            max_wait,
        }
    }

    pub async fn wait_until_ready<M: ModelRuntime>(
        &self,
        runtime: &M,
        cancel: &CancelToken,
    ) -> ReadinessCheckResult {
        let start = Instant::now();
        let mut attempts = 0u32;

        loop {
            if cancel.is_cancelled() {
                tracing::warn!("readiness wait cancelled after {} attempts", attempts);
                return timed_out(attempts, start.elapsed());
            }

            let remaining = match self.max_wait.checked_sub(start.elapsed()) {
                Some(r) if !r.is_zero() => r,
                _ => return timed_out(attempts, start.elapsed()),
            };

            attempts += 1;
            // Each attempt gets its own timeout, clamped so a hung probe
            // cannot overrun the overall budget.
            let budget = self.attempt_timeout.min(remaining);
            match tokio::time::timeout(budget, runtime.probe()).await {
                Ok(Ok(())) => {
                    let elapsed = start.elapsed();
                    tracing::info!("runtime ready after {} attempts ({:?})", attempts, elapsed);
                    return ReadinessCheckResult {
                        attempts,
                        elapsed,
                        outcome: ReadinessOutcome::Ready,
                    };
                }
                Ok(Err(e)) => {
                    tracing::debug!("probe attempt {} failed: {}", attempts, e);
                }
                Err(_) => {
                    tracing::debug!("probe attempt {} timed out after {:?}", attempts, budget);
                }
            }

            let elapsed = start.elapsed();
            if elapsed >= self.max_wait {
                return timed_out(attempts, elapsed);
            }
            let nap = self.poll_interval.min(self.max_wait - elapsed);
            tokio::time::sleep(nap).await;
        }
    }
}

fn timed_out(attempts: u32, elapsed: Duration) -> ReadinessCheckResult {
    ReadinessCheckResult {
        attempts,
        elapsed,
        outcome: ReadinessOutcome::TimedOut,
    }
}
