//! Inline course references in discussion text.
//!
//! Discussion bodies embed references with the literal wire format
//! `***[[course:<id>]]***`. A small two-token lexer splits text into plain
//! runs and reference tokens; [`ReferenceResolver`] maps tokens to typed,
//! display-ready segments through an in-memory cache that is populated
//! lazily and never invalidated for the life of the process.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tokio::sync::RwLock;

use crate::api::ApiClient;
use crate::models::CourseRef;

/// The literal token grammar. Ids are lowercase-hex-and-dash, matching what
/// the backend hands out.
const REFERENCE_PATTERN: &str = r"\*\*\*\[\[course:([a-f0-9-]+)\]\]\*\*\*";

fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(REFERENCE_PATTERN).expect("reference pattern compiles"))
}

/// Render the token a body must contain to reference a course inline.
pub fn reference_token(course_id: &str) -> String {
    format!("***[[course:{course_id}]]***")
}

/// A lexed run of discussion text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Plain(&'a str),
    Reference(&'a str),
}

/// Split text into plain runs interleaved with reference tokens, in original
/// order. Plain runs are kept even when empty (token at a boundary, two
/// adjacent tokens), so the output always alternates plain, reference,
/// plain, ..., plain.
pub fn lex(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in reference_regex().captures_iter(text) {
        let all = caps.get(0).expect("match group 0 always present");
        let id = caps.get(1).map(|g| g.as_str()).unwrap_or_default();
        tokens.push(Token::Plain(&text[last..all.start()]));
        tokens.push(Token::Reference(id));
        last = all.end();
    }
    tokens.push(Token::Plain(&text[last..]));
    tokens
}

/// The distinct course ids referenced in `text`, in first-occurrence order.
pub fn scan_ids(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for token in lex(text) {
        if let Token::Reference(id) = token {
            if seen.insert(id) {
                ids.push(id.to_string());
            }
        }
    }
    ids
}

/// A display-ready piece of rendered discussion text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSegment {
    Plain(String),
    Reference(CourseRef),
}

/// Resolves course references against an in-memory cache, fetching misses
/// lazily. Resolution is eventually consistent and best-effort: a first
/// render may show a placeholder that a later render replaces once the
/// background fetch lands. A reference to a course the server no longer
/// knows keeps its placeholder permanently.
#[derive(Clone)]
pub struct ReferenceResolver {
    api: ApiClient,
    cache: Arc<RwLock<HashMap<String, CourseRef>>>,
}

impl ReferenceResolver {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn cached(&self, course_id: &str) -> Option<CourseRef> {
        self.cache.read().await.get(course_id).cloned()
    }

    /// Pre-populate the cache with an already-known course (e.g. one the
    /// user just picked while composing a discussion).
    pub async fn seed(&self, entry: CourseRef) {
        self.insert_if_absent(entry).await;
    }

    // Writes never overwrite: once an id resolves (or permanently falls back
    // to its placeholder), a late or duplicate response cannot clobber it.
    async fn insert_if_absent(&self, entry: CourseRef) {
        let mut cache = self.cache.write().await;
        cache.entry(entry.id.clone()).or_insert(entry);
    }

    async fn fetch_into_cache(&self, course_id: String) {
        let entry = match self.api.get_course(&course_id).await {
            Ok(course) => CourseRef::from(&course),
            Err(e) => {
                tracing::warn!(course_id = %course_id, error = %e, "course reference resolution failed");
                CourseRef::placeholder(&course_id)
            }
        };
        self.insert_if_absent(entry).await;
    }

    /// Scan a batch of bodies up front, collect the de-duplicated set of
    /// referenced ids not already cached, and resolve them concurrently:
    /// one fetch per unique id, however often it repeats.
    pub async fn prefetch<I, S>(&self, bodies: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pending: Vec<String> = Vec::new();
        {
            let cache = self.cache.read().await;
            let mut seen = HashSet::new();
            for body in bodies {
                for id in scan_ids(body.as_ref()) {
                    if !cache.contains_key(&id) && seen.insert(id.clone()) {
                        pending.push(id);
                    }
                }
            }
        }

        if pending.is_empty() {
            return;
        }
        tracing::debug!(count = pending.len(), "prefetching course references");
        futures::future::join_all(
            pending
                .into_iter()
                .map(|id| self.fetch_into_cache(id)),
        )
        .await;
    }

    /// Render text into typed segments. Cached references resolve to their
    /// title/platform; uncached ones render as placeholders and schedule a
    /// fire-and-forget fetch so a later render sees the real title. The
    /// render itself never blocks on resolution.
    pub async fn render(&self, text: &str) -> Vec<TextSegment> {
        let mut segments = Vec::new();
        let mut scheduled: HashSet<&str> = HashSet::new();

        for token in lex(text) {
            match token {
                Token::Plain(run) => segments.push(TextSegment::Plain(run.to_string())),
                Token::Reference(id) => match self.cached(id).await {
                    Some(entry) => segments.push(TextSegment::Reference(entry)),
                    None => {
                        if scheduled.insert(id) {
                            let resolver = self.clone();
                            let id = id.to_string();
                            tokio::spawn(async move { resolver.fetch_into_cache(id).await });
                        }
                        segments.push(TextSegment::Reference(CourseRef::placeholder(id)));
                    }
                },
            }
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::models::CourseSummary;
    use crate::session::Session;

    fn resolver() -> ReferenceResolver {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::load_from(dir.path().join("session.yaml")).unwrap();
        let config = ClientConfig {
            // Nothing listens here; resolution failures fall back to placeholders.
            api_url: "http://127.0.0.1:1".to_string(),
            ..ClientConfig::default()
        };
        ReferenceResolver::new(ApiClient::new(&config, session))
    }

    fn course(id: &str, title: &str, platform: &str) -> CourseSummary {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "platform": platform,
        }))
        .unwrap()
    }

    #[test]
    fn test_lex_interleaves_plain_and_references() {
        let tokens = lex("A ***[[course:abc]]*** B ***[[course:abc]]*** C");
        assert_eq!(
            tokens,
            vec![
                Token::Plain("A "),
                Token::Reference("abc"),
                Token::Plain(" B "),
                Token::Reference("abc"),
                Token::Plain(" C"),
            ]
        );
    }

    #[test]
    fn test_lex_adjacent_tokens_keep_empty_run() {
        let tokens = lex("***[[course:a1]]******[[course:b2]]***");
        assert_eq!(
            tokens,
            vec![
                Token::Plain(""),
                Token::Reference("a1"),
                Token::Plain(""),
                Token::Reference("b2"),
                Token::Plain(""),
            ]
        );
    }

    #[test]
    fn test_lex_malformed_tokens_stay_plain() {
        // Uppercase hex and a missing closing fence are not references.
        let tokens = lex("***[[course:ABC]]*** and ***[[course:abc]]");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0], Token::Plain(_)));
    }

    #[test]
    fn test_scan_ids_deduplicates_in_order() {
        let ids = scan_ids("***[[course:b]]*** x ***[[course:a]]*** y ***[[course:b]]***");
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_render_resolves_from_cache() {
        let resolver = resolver();
        resolver
            .seed(CourseRef::from(&course("abc", "Intro to Rust", "Udemy")))
            .await;

        let segments = resolver
            .render("A ***[[course:abc]]*** B ***[[course:abc]]*** C")
            .await;

        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], TextSegment::Plain("A ".to_string()));
        match &segments[1] {
            TextSegment::Reference(entry) => {
                assert_eq!(entry.title, "Intro to Rust");
                assert_eq!(entry.platform, "Udemy");
            }
            other => panic!("expected a reference, got {other:?}"),
        }
        assert_eq!(segments[1], segments[3]);
        assert_eq!(segments[4], TextSegment::Plain(" C".to_string()));
    }

    #[tokio::test]
    async fn test_render_uncached_uses_placeholder() {
        let resolver = resolver();
        let segments = resolver.render("see ***[[course:0123456789ab]]***").await;

        assert_eq!(segments.len(), 3);
        match &segments[1] {
            TextSegment::Reference(entry) => {
                assert_eq!(entry.title, "Course Reference (ID: 01234567...)");
            }
            other => panic!("expected a reference, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_prefetch_pins_placeholder_on_failure() {
        let resolver = resolver();
        resolver.prefetch(["***[[course:dead]]*** ***[[course:dead]]***"]).await;

        let entry = resolver.cached("dead").await.unwrap();
        assert_eq!(entry.title, "Course Reference (ID: dead...)");

        // A later seed cannot overwrite the pinned entry.
        resolver
            .seed(CourseRef::from(&course("dead", "Too Late", "X")))
            .await;
        assert_eq!(
            resolver.cached("dead").await.unwrap().title,
            "Course Reference (ID: dead...)"
        );
    }

    #[tokio::test]
    async fn test_seed_then_prefetch_skips_cached_ids() {
        let resolver = resolver();
        resolver
            .seed(CourseRef::from(&course("aa", "Cached", "edX")))
            .await;

        resolver.prefetch(["***[[course:aa]]***"]).await;
        assert_eq!(resolver.cached("aa").await.unwrap().title, "Cached");
    }
}
