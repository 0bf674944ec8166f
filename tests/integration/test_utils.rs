//! Shared test utilities for integration tests
//!
//! Provides a client wired to an in-memory backend, and serialized access to
//! the environment variables the config loader reads.

use convergent::{Client, ClientConfig, MemoryBackend};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Client plus the backend it talks to, for asserting on calls
pub fn client() -> (Arc<MemoryBackend>, Client) {
    client_over(MemoryBackend::new())
}

pub fn client_over(backend: MemoryBackend) -> (Arc<MemoryBackend>, Client) {
    let backend = Arc::new(backend);
    let client = Client::new(backend.clone(), ClientConfig::default()).unwrap();
    (backend, client)
}

/// Environment variable state to restore after test
struct EnvState {
    vars: Vec<(&'static str, Option<String>)>,
}

impl EnvState {
    fn capture(names: &[&'static str]) -> Self {
        Self {
            vars: names
                .iter()
                .map(|name| (*name, std::env::var(name).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.vars {
            match value {
                Some(orig) => std::env::set_var(name, orig),
                None => std::env::remove_var(name),
            }
        }
    }
}

/// Run `f` with XDG_CONFIG_HOME pointing into `test_dir` and the given
/// extra variables set; everything is restored afterwards.
pub fn with_config_env<F, R>(test_dir: &TempDir, extra: &[(&'static str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    let mut names = vec!["XDG_CONFIG_HOME"];
    names.extend(extra.iter().map(|(name, _)| *name));
    let env_state = EnvState::capture(&names);

    std::env::set_var("XDG_CONFIG_HOME", test_dir.path());
    for (name, value) in extra {
        std::env::set_var(name, value);
    }

    let result = f();

    env_state.restore();

    result
}
