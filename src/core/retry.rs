//! # Retry Classification Module / 重试分类模块
//!
//! This module decides whether a failed tool invocation is worth retrying.
//! A failure is classified against an ordered table of substring patterns;
//! a match makes it transient with the retry count bound to that pattern,
//! anything else is fatal. Delays between retries grow exponentially.
//!
//! 此模块决定失败的工具调用是否值得重试。
//! 失败输出会与一个有序的子串模式表进行匹配；匹配成功即视为瞬态错误，
//! 并使用该模式绑定的重试次数，否则视为致命错误。重试之间的延迟按指数增长。

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retries granted to each of the built-in patterns.
/// 每个内置模式允许的重试次数。
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Output fragments the tool prints for failures that usually clear on their own,
/// paired with a short description of the underlying cause.
///
/// 工具在通常会自行恢复的失败中打印的输出片段，以及对其原因的简短描述。
pub const DEFAULT_RETRYABLE_ERRORS: &[(&str, &str)] = &[
    ("read: connection reset by peer", "Connection to a remote registry was reset."),
    ("transport is closing", "Connection to a plugin or remote API was closed."),
    ("unable to verify signature", "Provider signature download failed on a transient network error."),
    ("unable to verify checksum", "Provider checksum download failed on a transient network error."),
    ("no provider exists with the given name", "Provider registry returned a transient lookup failure."),
    ("registry service is unreachable", "Provider registry is temporarily unreachable."),
    ("Error installing provider", "Provider installation failed, possibly on a network error."),
    ("Failed to query available provider packages", "Provider package listing failed on a network error."),
    ("timeout while waiting for plugin to start", "Plugin took too long to start."),
    ("timed out waiting for server handshake", "Plugin handshake timed out."),
    ("could not query provider registry for", "Provider registry query failed."),
    ("Could not retrieve the list of available versions for provider", "Provider version listing failed."),
    ("Client.Timeout exceeded while awaiting headers", "HTTP client timed out."),
    ("Error acquiring the state lock", "Another process holds the state lock."),
];

/// A single retryable pattern and the number of retries it grants.
/// 单个可重试模式及其允许的重试次数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryableError {
    /// Substring looked up in the combined stdout/stderr of the failed step.
    /// 在失败步骤合并后的 stdout/stderr 中查找的子串。
    pub pattern: String,
    /// Retries allowed after the first failed attempt.
    /// 第一次尝试失败后允许的重试次数。
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// The verdict for one failed invocation.
/// 单次失败调用的判定结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass<'a> {
    /// The output matched `pattern`; up to `retries` retries are allowed.
    Transient { pattern: &'a str, retries: u32 },
    /// No pattern matched.
    Fatal,
}

/// An ordered pattern table. The first matching entry wins.
/// 有序的模式表，第一个匹配的条目生效。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetryableErrors {
    entries: Vec<RetryableError>,
}

impl RetryableErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table, every pattern granted [`DEFAULT_MAX_RETRIES`].
    /// 内置模式表，每个模式允许 [`DEFAULT_MAX_RETRIES`] 次重试。
    pub fn defaults() -> Self {
        let mut table = Self::new();
        for (pattern, _) in DEFAULT_RETRYABLE_ERRORS {
            table.insert(*pattern, DEFAULT_MAX_RETRIES);
        }
        table
    }

    /// Adds a pattern, or updates the retry count of an existing one in place.
    /// Empty patterns are ignored since they would match every failure.
    ///
    /// 添加一个模式；若已存在则就地更新其重试次数。
    /// 空模式会被忽略，因为它会匹配所有失败。
    pub fn insert(&mut self, pattern: impl Into<String>, retries: u32) {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|e| e.pattern == pattern) {
            Some(existing) => existing.retries = retries,
            None => self.entries.push(RetryableError { pattern, retries }),
        }
    }

    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = RetryableError>,
    {
        for entry in entries {
            self.insert(entry.pattern, entry.retries);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RetryableError> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Classifies the output of a failed invocation.
    /// 对失败调用的输出进行分类。
    pub fn classify(&self, output: &str) -> ErrorClass<'_> {
        self.entries
            .iter()
            .find(|entry| output.contains(entry.pattern.as_str()))
            .map(|entry| ErrorClass::Transient {
                pattern: &entry.pattern,
                retries: entry.retries,
            })
            .unwrap_or(ErrorClass::Fatal)
    }
}

/// Exponential backoff between retries of a transient failure.
///
/// 瞬态失败重试之间的指数退避策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2,
        }
    }
}

impl BackoffPolicy {
    pub fn from_millis(initial_delay_ms: u64, max_delay_ms: u64, multiplier: u32) -> Self {
        Self {
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
            multiplier,
        }
    }

    /// A policy that never sleeps.
    pub fn none() -> Self {
        Self::from_millis(0, 0, 1)
    }

    /// Delay before retry number `retry` (1-based), capped at `max_delay`.
    /// 第 `retry` 次重试（从 1 开始）前的延迟，上限为 `max_delay`。
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1);
        let factor = self.multiplier.max(1).checked_pow(exponent);
        factor
            .and_then(|f| self.initial_delay.checked_mul(f))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_builtin_pattern() {
        let table = RetryableErrors::defaults();
        assert_eq!(table.len(), DEFAULT_RETRYABLE_ERRORS.len());
        assert!(table.iter().all(|e| e.retries == DEFAULT_MAX_RETRIES));
    }

    #[test]
    fn classify_matches_substring_anywhere_in_output() {
        let table = RetryableErrors::defaults();
        let output = "Initializing provider plugins...\n\
                      Error: Failed to query available provider packages\n\
                      could not connect to registry.terraform.io";
        assert_eq!(
            table.classify(output),
            ErrorClass::Transient {
                pattern: "Failed to query available provider packages",
                retries: DEFAULT_MAX_RETRIES,
            }
        );
    }

    #[test]
    fn classify_is_case_sensitive_and_fatal_otherwise() {
        let table = RetryableErrors::defaults();
        assert_eq!(table.classify("error acquiring the state lock"), ErrorClass::Fatal);
        assert_eq!(
            table.classify("Error: Unsupported argument on main.tf line 3"),
            ErrorClass::Fatal
        );
        assert_eq!(RetryableErrors::new().classify("anything"), ErrorClass::Fatal);
    }

    #[test]
    fn first_matching_pattern_wins() {
        let mut table = RetryableErrors::new();
        table.insert("lock", 1);
        table.insert("state lock", 9);
        assert_eq!(
            table.classify("Error acquiring the state lock"),
            ErrorClass::Transient { pattern: "lock", retries: 1 }
        );
    }

    #[test]
    fn insert_updates_in_place_and_skips_empty() {
        let mut table = RetryableErrors::new();
        table.insert("a", 1);
        table.insert("b", 2);
        table.insert("a", 5);
        table.insert("", 7);
        let entries: Vec<_> = table.iter().map(|e| (e.pattern.as_str(), e.retries)).collect();
        assert_eq!(entries, vec![("a", 5), ("b", 2)]);
    }

    #[test]
    fn backoff_doubles_until_capped() {
        let policy = BackoffPolicy::from_millis(100, 1_000, 2);
        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_retry(4), Duration::from_millis(800));
        assert_eq!(policy.delay_for_retry(5), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for_retry(60), Duration::from_millis(1_000));
    }

    #[test]
    fn backoff_multiplier_of_zero_behaves_as_constant() {
        let policy = BackoffPolicy::from_millis(50, 1_000, 0);
        assert_eq!(policy.delay_for_retry(3), Duration::from_millis(50));
        assert_eq!(BackoffPolicy::none().delay_for_retry(10), Duration::ZERO);
    }
}
