//! Location normalization
//!
//! Turns whatever the user typed into the name the directory and places
//! services understand. Known Chinese city names map through a static alias
//! table; other non-Latin input is translated by the completion endpoint;
//! plain Latin input passes through untouched.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use tracing::{debug, instrument, warn};

use crate::cache::Cache;
use crate::llm::{CompletionProvider, CompletionRequest};
use crate::models::{LocationQuery, NormalizationSource};

static CITY_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("旧金山", "San Francisco"),
        ("三藩市", "San Francisco"),
        ("洛杉矶", "Los Angeles"),
        ("纽约", "New York"),
        ("西雅图", "Seattle"),
        ("芝加哥", "Chicago"),
        ("波士顿", "Boston"),
        ("休斯顿", "Houston"),
        ("圣地亚哥", "San Diego"),
        ("圣何塞", "San Jose"),
        ("拉斯维加斯", "Las Vegas"),
        ("华盛顿", "Washington"),
        ("费城", "Philadelphia"),
        ("温哥华", "Vancouver"),
        ("多伦多", "Toronto"),
        ("伦敦", "London"),
        ("悉尼", "Sydney"),
        ("墨尔本", "Melbourne"),
    ])
});

fn translation_prompt(raw: &str) -> String {
    format!(
        "Translate the following place name into the English name used by maps and \
         business directories. Reply with the English name only, without punctuation \
         or explanation.\n\n{raw}"
    )
}

/// True when any character falls outside basic Latin
#[must_use]
pub fn needs_translation(input: &str) -> bool {
    input.chars().any(|c| !c.is_ascii())
}

/// Canonical name from the alias table, if the input is listed exactly
#[must_use]
pub fn alias_for(input: &str) -> Option<&'static str> {
    CITY_ALIASES.get(input).copied()
}

/// Normalizes free-text location input
pub struct LocationNormalizer {
    translator: Arc<dyn CompletionProvider>,
    cache: Option<Arc<Cache>>,
}

impl LocationNormalizer {
    pub fn new(translator: Arc<dyn CompletionProvider>, cache: Option<Arc<Cache>>) -> Self {
        Self { translator, cache }
    }

    /// Resolve `raw` to its canonical form. Never fails: a failed translation
    /// falls back to the raw input and records the reason.
    #[instrument(skip(self))]
    pub async fn normalize(&self, raw: &str) -> LocationQuery {
        if let Some(canonical) = alias_for(raw) {
            debug!("Alias table maps '{}' to '{}'", raw, canonical);
            return LocationQuery::new(raw, canonical, NormalizationSource::Alias);
        }

        if !needs_translation(raw) {
            return LocationQuery::passthrough(raw);
        }

        let cache_key = format!("translate:{raw}");
        if let Some(cached) = self.cached(&cache_key).await {
            return LocationQuery::new(raw, cached, NormalizationSource::Translated);
        }

        let request = CompletionRequest::new(translation_prompt(raw)).with_temperature(0.0);
        match self.translator.complete(request).await {
            Ok(reply) if reply.trim().is_empty() => {
                warn!("Translation of '{}' came back empty, using input as-is", raw);
                LocationQuery::new(
                    raw,
                    raw,
                    NormalizationSource::TranslationFailed {
                        reason: "empty translation".to_string(),
                    },
                )
            }
            Ok(reply) => {
                let canonical = reply.trim().to_string();
                debug!("Translated '{}' to '{}'", raw, canonical);
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.put(&cache_key, &canonical).await {
                        warn!("Failed to cache translation: {}", e);
                    }
                }
                LocationQuery::new(raw, canonical, NormalizationSource::Translated)
            }
            Err(e) => {
                warn!("Translation of '{}' failed, using input as-is: {}", raw, e);
                LocationQuery::new(
                    raw,
                    raw,
                    NormalizationSource::TranslationFailed {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }

    async fn cached(&self, key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        match cache.get::<String>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCompletion;
    use std::time::Duration;

    #[tokio::test]
    async fn test_alias_bypasses_translator() {
        let translator = Arc::new(FakeCompletion::replying("should not be used"));
        let normalizer = LocationNormalizer::new(translator.clone(), None);

        let query = normalizer.normalize("旧金山").await;

        assert_eq!(query.canonical, "San Francisco");
        assert_eq!(query.source, NormalizationSource::Alias);
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_every_alias_maps_without_external_call() {
        let translator = Arc::new(FakeCompletion::failing("offline"));
        let normalizer = LocationNormalizer::new(translator.clone(), None);

        for (alias, canonical) in CITY_ALIASES.iter() {
            let query = normalizer.normalize(alias).await;
            assert_eq!(query.canonical, *canonical);
        }
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_latin_input_uses_trimmed_translation() {
        let translator = Arc::new(FakeCompletion::replying("  Chengdu\n"));
        let normalizer = LocationNormalizer::new(translator.clone(), None);

        let query = normalizer.normalize("成都").await;

        assert_eq!(query.canonical, "Chengdu");
        assert_eq!(query.raw, "成都");
        assert_eq!(query.source, NormalizationSource::Translated);
        assert_eq!(translator.calls(), 1);
        assert!(translator.prompts()[0].contains("成都"));
    }

    #[tokio::test]
    async fn test_translation_failure_falls_back_to_input() {
        let translator = Arc::new(FakeCompletion::failing("quota exceeded"));
        let normalizer = LocationNormalizer::new(translator, None);

        let query = normalizer.normalize("成都").await;

        assert_eq!(query.canonical, "成都");
        assert!(matches!(
            query.source,
            NormalizationSource::TranslationFailed { .. }
        ));
        assert!(query.warning().unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_blank_translation_falls_back_to_input() {
        let translator = Arc::new(FakeCompletion::replying("  "));
        let normalizer = LocationNormalizer::new(translator.clone(), None);

        let query = normalizer.normalize("成都").await;

        assert_eq!(query.canonical, "成都");
        assert_eq!(query.raw, "成都");
        assert!(matches!(
            query.source,
            NormalizationSource::TranslationFailed { ref reason } if reason == "empty translation"
        ));
        assert_eq!(translator.calls(), 1);
    }

    #[tokio::test]
    async fn test_latin_input_passes_through() {
        let translator = Arc::new(FakeCompletion::replying("ignored"));
        let normalizer = LocationNormalizer::new(translator.clone(), None);

        for input in ["Austin", "94103", ""] {
            let query = normalizer.normalize(input).await;
            assert_eq!(query.canonical, input);
            assert_eq!(query.source, NormalizationSource::Passthrough);
        }
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_translation_is_cached() {
        let translator = Arc::new(FakeCompletion::replying("Chengdu"));
        let cache = Arc::new(Cache::new(8, Duration::from_secs(60)).unwrap());
        let normalizer = LocationNormalizer::new(translator.clone(), Some(cache));

        normalizer.normalize("成都").await;
        let second = normalizer.normalize("成都").await;

        assert_eq!(second.canonical, "Chengdu");
        assert_eq!(translator.calls(), 1);
    }

    #[test]
    fn test_needs_translation() {
        assert!(needs_translation("東京"));
        assert!(needs_translation("Zürich"));
        assert!(!needs_translation("San Francisco, CA"));
        assert!(!needs_translation(""));
    }
}
