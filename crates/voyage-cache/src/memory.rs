//! In-process [`CacheStore`] used by tests and by the API when no Redis URL
//! is configured.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::error::CacheResult;
use crate::store::{ttl_secs, CacheStore};

/// Open scans kept before the oldest is forgotten.
const MAX_OPEN_SCANS: usize = 1024;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Scan cursors handed out by `scan_match`, each mapped to the last key it
/// returned. The next step resumes after that key, so deleting keys between
/// steps never shifts the scan.
#[derive(Debug, Default)]
struct ScanCursors {
    last_id: u64,
    resume_after: BTreeMap<u64, String>,
}

impl ScanCursors {
    fn open(&mut self, last_key: String) -> u64 {
        self.last_id += 1;
        self.resume_after.insert(self.last_id, last_key);
        if self.resume_after.len() > MAX_OPEN_SCANS {
            self.resume_after.pop_first();
        }
        self.last_id
    }
}

/// A `HashMap` behind a tokio `RwLock`, with per-key expiry and Redis-style
/// `SCAN MATCH`.
///
/// Expired entries are dropped lazily on access and on scan.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    scans: Mutex<ScanCursors>,
    /// Use sub-second TTLs as given instead of rounding up to whole seconds.
    exact_ttl: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Honors TTLs below one second (Redis would round them up). For tests.
    pub fn with_exact_ttl() -> Self {
        MemoryStore {
            exact_ttl: true,
            ..Self::default()
        }
    }

    /// Live keys, in no particular order.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // expired: drop it
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let ttl = if self.exact_ttl {
            ttl
        } else {
            Duration::from_secs(ttl_secs(ttl))
        };

        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> CacheResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let removed = keys
            .iter()
            .filter_map(|k| entries.remove(k))
            .filter(|e| e.expires_at > now)
            .count();
        Ok(removed as u64)
    }

    /// Keys are returned in sorted order. A cursor that was never handed out
    /// (or was forgotten) ends the scan.
    async fn scan_match(
        &self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> CacheResult<(u64, Vec<String>)> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.expires_at > now);

        let mut scans = self.scans.lock().await;
        let resume_after = if cursor == 0 {
            None
        } else {
            match scans.resume_after.remove(&cursor) {
                Some(key) => Some(key),
                None => return Ok((0, Vec::new())),
            }
        };

        let mut matching: Vec<&String> = entries
            .keys()
            .filter(|k| resume_after.as_deref().map_or(true, |after| k.as_str() > after))
            .filter(|k| glob_match(pattern, k))
            .collect();
        matching.sort();

        let count = count.max(1);
        let batch: Vec<String> = matching.iter().take(count).map(|k| k.to_string()).collect();
        let next = match batch.last() {
            Some(last) if matching.len() > count => scans.open(last.clone()),
            _ => 0,
        };

        Ok((next, batch))
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }
}

// =============================================================================
// Glob Matching
// =============================================================================

/// Redis `MATCH` semantics: `*` any run, `?` one char, `[abc]`, `[a-z]`,
/// `[^a]` classes and `\` escapes.
///
/// ```rust
/// use voyage_cache::memory::glob_match;
///
/// assert!(glob_match("users:*:bookings", "users:42:bookings"));
/// assert!(!glob_match("users:*:bookings", "users:42:reviews"));
/// ```
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    // last `*` seen, and the text position it is currently absorbing up to
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() {
            match p[pi] {
                '*' => {
                    star = Some((pi, ti));
                    pi += 1;
                    continue;
                }
                '?' => {
                    pi += 1;
                    ti += 1;
                    continue;
                }
                '[' => {
                    if let Some((matched, next_pi)) = match_class(&p, pi, t[ti]) {
                        if matched {
                            pi = next_pi;
                            ti += 1;
                            continue;
                        }
                    } else if t[ti] == '[' {
                        // unterminated class: literal '['
                        pi += 1;
                        ti += 1;
                        continue;
                    }
                }
                '\\' if pi + 1 < p.len() => {
                    if p[pi + 1] == t[ti] {
                        pi += 2;
                        ti += 1;
                        continue;
                    }
                }
                c => {
                    if c == t[ti] {
                        pi += 1;
                        ti += 1;
                        continue;
                    }
                }
            }
        }

        match star {
            Some((star_pi, star_ti)) => {
                pi = star_pi + 1;
                ti = star_ti + 1;
                star = Some((star_pi, star_ti + 1));
            }
            None => return false,
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

/// Matches `c` against the class opening at `p[start]`. Returns whether it
/// matched and the index just past `]`, or `None` when the class is not
/// terminated.
fn match_class(p: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negate = matches!(p.get(i), Some('^') | Some('!'));
    if negate {
        i += 1;
    }

    let mut matched = false;
    let mut first = true;
    while i < p.len() {
        let ch = p[i];
        if ch == ']' && !first {
            return Some((matched != negate, i + 1));
        }
        first = false;

        if ch == '\\' && i + 1 < p.len() {
            if p[i + 1] == c {
                matched = true;
            }
            i += 2;
        } else if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' {
            let (lo, hi) = if ch <= p[i + 2] { (ch, p[i + 2]) } else { (p[i + 2], ch) };
            if lo <= c && c <= hi {
                matched = true;
            }
            i += 3;
        } else {
            if ch == c {
                matched = true;
            }
            i += 1;
        }
    }

    None
}
