use serde::Serialize;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

/// Correlation token binding one push channel to one backend task.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

pub fn generate() -> SessionId {
    let mut bytes = [0u8; 16];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => SessionId(
            uuid::Builder::from_random_bytes(bytes)
                .into_uuid()
                .to_string(),
        ),
        Err(e) => {
            tracing::warn!("OS randomness unavailable ({e}), using timestamp session id");
            fallback()
        }
    }
}

// The sequence number keeps ids unique inside this process even when two are
// generated within the same millisecond.
fn fallback() -> SessionId {
    let millis = chrono::Utc::now().timestamp_millis();
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_i64(millis);
    hasher.write_u64(sequence);
    SessionId(format!("{millis}-{:016x}{sequence:x}", hasher.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_uuids() {
        let sid = generate();
        let parsed = uuid::Uuid::parse_str(sid.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4, "{sid}");
    }

    #[test]
    fn ids_never_repeat() {
        let ids: HashSet<_> = (0..1000).map(|_| generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn fallback_ids_never_repeat() {
        let ids: HashSet<_> = (0..1000).map(|_| fallback()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|sid| sid.as_str().contains('-')));
    }
}
