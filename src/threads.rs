// ABOUTME: Thread identity derivation for two-party company conversations
// ABOUTME: Builds thread-<idA>-<idB> keys and resolves the counterpart from a key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Procura Platform

//! # Thread Identity
//!
//! A thread key encodes the two participants of a conversation as
//! `thread-<idA>-<idB>`, in the order the pair was first observed. Keys are
//! never canonically sorted: once a key exists for a pair, both directions
//! of the conversation reuse it verbatim. Resolution is pure string work
//! over the key and one known participant.

use crate::errors::{AppError, AppResult};
use crate::models::CompanyId;

/// Prefix every thread key carries
const THREAD_PREFIX: &str = "thread-";

/// A validated two-party conversation key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadKey(String);

impl ThreadKey {
    /// Build a key for the pair `(a, b)` in the given order.
    ///
    /// The order is "as first established" by the caller; this function does
    /// not sort the ids.
    #[must_use]
    pub fn derive(a: &CompanyId, b: &CompanyId) -> Self {
        Self(format!("{THREAD_PREFIX}{a}-{b}"))
    }

    /// Parse an incoming key, verifying it decomposes into exactly two
    /// non-empty participant segments.
    ///
    /// # Errors
    ///
    /// Returns `MalformedThreadKey` when the prefix is missing or the
    /// remainder does not split into exactly two non-empty segments.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let (first, second) = decompose(raw)?;
        debug_assert!(!first.is_empty() && !second.is_empty());
        Ok(Self(raw.to_owned()))
    }

    /// The full key string, including the `thread-` prefix
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two participant segments in key order
    ///
    /// # Errors
    ///
    /// Returns `MalformedThreadKey` if the stored key no longer decomposes
    /// (possible for keys that predate validation).
    pub fn participants(&self) -> AppResult<(CompanyId, CompanyId)> {
        let (first, second) = decompose(&self.0)?;
        Ok((CompanyId::new(first), CompanyId::new(second)))
    }

    /// Resolve the other participant given one known participant.
    ///
    /// Matching is string equality on the canonical id form. When `known`
    /// matches neither segment the first segment is returned; that fallback
    /// mirrors the established behavior for ambiguous lookups and is
    /// exercised explicitly in the tests below rather than hidden.
    ///
    /// # Errors
    ///
    /// Returns `MalformedThreadKey` when the key cannot be decomposed.
    pub fn resolve_counterpart(&self, known: &CompanyId) -> AppResult<CompanyId> {
        let (first, second) = decompose(&self.0)?;

        if known.as_str() == first {
            Ok(CompanyId::new(second))
        } else if known.as_str() == second {
            Ok(CompanyId::new(first))
        } else {
            Ok(CompanyId::new(first))
        }
    }
}

impl std::fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a raw key into its two participant segments
fn decompose(raw: &str) -> AppResult<(&str, &str)> {
    let rest = raw.strip_prefix(THREAD_PREFIX).ok_or_else(|| {
        AppError::malformed_thread_key(format!("key '{raw}' is missing the thread prefix"))
    })?;

    let mut segments = rest.split('-').filter(|s| !s.is_empty());
    let first = segments.next();
    let second = segments.next();
    let extra = segments.next();

    match (first, second, extra) {
        (Some(a), Some(b), None) => Ok((a, b)),
        _ => Err(AppError::malformed_thread_key(format!(
            "key '{raw}' must contain exactly two participant ids"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn id(s: &str) -> CompanyId {
        CompanyId::new(s)
    }

    #[test]
    fn derive_then_resolve_returns_the_other_party() {
        let a = id("aaa111");
        let b = id("bbb222");
        let key = ThreadKey::derive(&a, &b);

        assert_eq!(key.as_str(), "thread-aaa111-bbb222");
        assert_eq!(key.resolve_counterpart(&a).unwrap(), b);
        assert_eq!(key.resolve_counterpart(&b).unwrap(), a);
    }

    #[test]
    fn derive_preserves_first_observed_order() {
        let a = id("aaa111");
        let b = id("bbb222");
        // The same pair in the other order produces a different key string;
        // callers are expected to reuse the key they first established.
        assert_ne!(
            ThreadKey::derive(&a, &b).as_str(),
            ThreadKey::derive(&b, &a).as_str()
        );
    }

    #[test]
    fn single_segment_key_is_malformed() {
        let err = ThreadKey::parse("thread-onlyonepart").unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedThreadKey);
    }

    #[test]
    fn missing_prefix_is_malformed() {
        let err = ThreadKey::parse("aaa111-bbb222").unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedThreadKey);
    }

    #[test]
    fn three_segment_key_is_malformed() {
        let err = ThreadKey::parse("thread-a-b-c").unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedThreadKey);
    }

    #[test]
    fn empty_segments_are_malformed() {
        let err = ThreadKey::parse("thread--bbb222").unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedThreadKey);
    }

    #[test]
    fn resolve_on_malformed_key_never_guesses() {
        let key = ThreadKey("thread-onlyonepart".into());
        let err = key.resolve_counterpart(&id("aaa111")).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedThreadKey);
    }

    #[test]
    fn falls_back_to_first_segment_when_participant_unknown() {
        // Established behavior for the ambiguous case: a caller that is not
        // a participant gets the first segment back, not an error.
        let key = ThreadKey::derive(&id("aaa111"), &id("bbb222"));
        let counterpart = key.resolve_counterpart(&id("zzz999")).unwrap();
        assert_eq!(counterpart, id("aaa111"));
    }

    #[test]
    fn participants_returns_segments_in_key_order() {
        let key = ThreadKey::derive(&id("aaa111"), &id("bbb222"));
        let (first, second) = key.participants().unwrap();
        assert_eq!(first, id("aaa111"));
        assert_eq!(second, id("bbb222"));
    }
}
