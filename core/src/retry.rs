// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Retry policy and the retrying call wrappers.
//!
//! A call runs until it succeeds, until the classifier rejects its error, or
//! until `max_tries` attempts have been made. Between attempts it sleeps for
//! `min(period * attempt^2, max_period)` where `attempt` starts at 1 for the
//! first retry. On exhaustion the error of the last attempt is returned as is.

use std::error::Error as StdError;
use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use backon::BackoffBuilder;
use log::warn;

use crate::Context;
use crate::Error;
use crate::Result;

/// Env to override [`RetryPolicy::period`] in milliseconds.
pub const CLOUDSIGN_RETRY_PERIOD_MS: &str = "CLOUDSIGN_RETRY_PERIOD_MS";
/// Env to override [`RetryPolicy::max_period`] in milliseconds.
pub const CLOUDSIGN_RETRY_MAX_PERIOD_MS: &str = "CLOUDSIGN_RETRY_MAX_PERIOD_MS";
/// Env to override [`RetryPolicy::max_tries`].
pub const CLOUDSIGN_RETRY_MAX_TRIES: &str = "CLOUDSIGN_RETRY_MAX_TRIES";

/// Backoff settings of a retrying call.
///
/// Invariants: `max_tries > 1`, `period > 0` and `max_period >= period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    period: Duration,
    max_period: Duration,
    max_tries: u32,
}

impl Default for RetryPolicy {
    /// 50ms period, capped at 500ms, 5 tries.
    fn default() -> Self {
        Self {
            period: Duration::from_millis(50),
            max_period: Duration::from_millis(500),
            max_tries: 5,
        }
    }
}

impl RetryPolicy {
    /// Create a new policy, returns `ConfigInvalid` if an invariant is violated.
    pub fn new(period: Duration, max_period: Duration, max_tries: u32) -> Result<Self> {
        if max_tries <= 1 {
            return Err(Error::config_invalid(format!(
                "retry max_tries must be greater than 1, got {max_tries}"
            )));
        }
        if period.is_zero() {
            return Err(Error::config_invalid("retry period must be positive"));
        }
        if max_period < period {
            return Err(Error::config_invalid(format!(
                "retry max_period {max_period:?} must not be shorter than period {period:?}"
            )));
        }

        Ok(Self {
            period,
            max_period,
            max_tries,
        })
    }

    /// Base delay of the first retry.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Upper bound of a single delay.
    pub fn max_period(&self) -> Duration {
        self.max_period
    }

    /// Total number of attempts, the first one included.
    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /// Override fields from the environment.
    ///
    /// Unset variables keep the current value, the result is validated again.
    pub fn from_env(self, ctx: &Context) -> Result<Self> {
        let read = |key: &str| -> Result<Option<u64>> {
            let Some(v) = ctx.env_var(key) else {
                return Ok(None);
            };
            v.trim().parse::<u64>().map(Some).map_err(|e| {
                Error::config_invalid(format!("{key} must be an integer, got {v:?}"))
                    .with_source(e)
            })
        };

        let period = read(CLOUDSIGN_RETRY_PERIOD_MS)?
            .map(Duration::from_millis)
            .unwrap_or(self.period);
        let max_period = read(CLOUDSIGN_RETRY_MAX_PERIOD_MS)?
            .map(Duration::from_millis)
            .unwrap_or(self.max_period);
        let max_tries = match read(CLOUDSIGN_RETRY_MAX_TRIES)? {
            Some(v) => u32::try_from(v).map_err(|e| {
                Error::config_invalid(format!("{CLOUDSIGN_RETRY_MAX_TRIES} is out of range"))
                    .with_source(e)
            })?,
            None => self.max_tries,
        };

        Self::new(period, max_period, max_tries)
    }

    /// Delay before retry number `attempt`, counted from 1.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.period
            .checked_mul(attempt.saturating_mul(attempt))
            .map_or(self.max_period, |d| d.min(self.max_period))
    }
}

impl BackoffBuilder for RetryPolicy {
    type Backoff = QuadraticBackoff;

    fn build(self) -> Self::Backoff {
        QuadraticBackoff {
            policy: self,
            attempt: 0,
        }
    }
}

/// Delays of one retry sequence, `max_tries - 1` of them.
#[derive(Debug, Clone)]
pub struct QuadraticBackoff {
    policy: RetryPolicy,
    attempt: u32,
}

impl Iterator for QuadraticBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.attempt + 1 >= self.policy.max_tries {
            return None;
        }

        self.attempt += 1;
        Some(self.policy.delay(self.attempt))
    }
}

/// Decides whether a failed attempt is worth retrying.
pub trait RetryClassifier: Send + Sync + 'static {
    /// Return `true` if the error is transient.
    fn is_retryable(&self, err: &(dyn StdError + 'static)) -> bool;
}

impl<F> RetryClassifier for F
where
    F: Fn(&(dyn StdError + 'static)) -> bool + Send + Sync + 'static,
{
    fn is_retryable(&self, err: &(dyn StdError + 'static)) -> bool {
        self(err)
    }
}

/// Retry when an error of type `E` appears anywhere in the `source()` chain.
pub struct RetryOn<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> RetryOn<E> {
    /// Create a new classifier.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for RetryOn<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Debug for RetryOn<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RetryOn<{}>", std::any::type_name::<E>())
    }
}

impl<E: StdError + 'static> RetryClassifier for RetryOn<E> {
    fn is_retryable(&self, err: &(dyn StdError + 'static)) -> bool {
        let mut cur = Some(err);
        while let Some(e) = cur {
            if e.is::<E>() {
                return true;
            }
            cur = e.source();
        }
        false
    }
}

/// Retry when the error is a [`crate::Error`] marked temporary.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryWhenTemporary;

impl RetryClassifier for RetryWhenTemporary {
    fn is_retryable(&self, err: &(dyn StdError + 'static)) -> bool {
        err.downcast_ref::<Error>()
            .map(|e| e.is_temporary())
            .unwrap_or(false)
    }
}

/// Runs calls under a [`RetryPolicy`] and a [`RetryClassifier`].
#[derive(Clone)]
pub struct Retrier {
    policy: RetryPolicy,
    classifier: Arc<dyn RetryClassifier>,
}

impl Debug for Retrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retrier")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for Retrier {
    fn default() -> Self {
        Self::new(RetryPolicy::default(), RetryWhenTemporary)
    }
}

impl Retrier {
    /// Create a new retrier.
    pub fn new(policy: RetryPolicy, classifier: impl RetryClassifier) -> Self {
        Self {
            policy,
            classifier: Arc::new(classifier),
        }
    }

    /// Get the policy of this retrier.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `f` on the current thread, blocking with `std::thread::sleep`
    /// between attempts.
    pub fn call<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnMut() -> std::result::Result<T, E>,
        E: StdError + 'static,
    {
        self.call_with_sleeper(f, std::thread::sleep)
    }

    /// Same as [`Retrier::call`] with a custom sleep function.
    pub fn call_with_sleeper<T, E, F, S>(&self, f: F, sleeper: S) -> std::result::Result<T, E>
    where
        F: FnMut() -> std::result::Result<T, E>,
        E: StdError + 'static,
        S: Fn(Duration) + 'static,
    {
        use backon::BlockingRetryable;

        let classifier = self.classifier.clone();
        f.retry(self.policy)
            .sleep(sleeper)
            .when(move |e: &E| classifier.is_retryable(e))
            .notify(|err: &E, dur: Duration| {
                warn!("retrying in {dur:?} after error: {err}");
            })
            .call()
    }

    /// Run the future returned by `f`, sleeping with `tokio::time::sleep`
    /// between attempts.
    ///
    /// Dropping the returned future cancels the sequence, backoff included.
    pub async fn call_async<T, E, F, Fut>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: StdError + 'static,
    {
        use backon::Retryable;

        let classifier = self.classifier.clone();
        f.retry(self.policy)
            .sleep(tokio::time::sleep)
            .when(move |e: &E| classifier.is_retryable(e))
            .notify(|err: &E, dur: Duration| {
                warn!("retrying in {dur:?} after error: {err}");
            })
            .await
    }
}
