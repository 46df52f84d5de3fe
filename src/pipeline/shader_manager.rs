//! Geometry Shader Manager
//!
//! In-memory map from variant key to generated source. Every entry pairs the
//! key with its text and an xxh3-128 hash of that text, which is what the
//! compilation collaborator consumes.
//!
//! | Method | Use case |
//! |--------|----------|
//! | [`GeometryShaderManager::get_or_generate`] | Lazy generation on first draw |
//! | [`GeometryShaderManager::precompile`]      | Ahead-of-time sweep over every key |
//!
//! All entries are generated under the manager's current [`HostConfig`];
//! swapping in a configuration with different text-relevant bits drops them.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use xxhash_rust::xxh3::xxh3_128;

use super::enumerate::enumerate_geometry_shader_uids;
use super::shader_gen::generate_geometry_shader_code;
use super::uid::GeometryShaderUid;
use crate::settings::HostConfig;

/// A key together with the source generated for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedShader {
    pub uid: GeometryShaderUid,
    /// [`HostConfig::bits`] of the configuration the source was generated under.
    pub host_bits: u32,
    pub source: Arc<str>,
    /// xxh3-128 of `source`.
    pub source_hash: u128,
}

impl GeneratedShader {
    fn generate(uid: GeometryShaderUid, host: &HostConfig) -> Self {
        let code = generate_geometry_shader_code(host.api, host, &uid);
        Self::from_source(uid, host.bits(), code.into_string())
    }

    fn from_source(uid: GeometryShaderUid, host_bits: u32, source: String) -> Self {
        let source_hash = xxh3_128(source.as_bytes());
        Self {
            uid,
            host_bits,
            source: Arc::from(source),
            source_hash,
        }
    }
}

// ─── GeometryShaderManager ────────────────────────────────────────────────────

/// Generated geometry shaders for one host configuration.
#[derive(Debug)]
pub struct GeometryShaderManager {
    host: HostConfig,
    entries: FxHashMap<GeometryShaderUid, GeneratedShader>,
}

impl GeometryShaderManager {
    #[must_use]
    pub fn new(host: HostConfig) -> Self {
        Self {
            host,
            entries: FxHashMap::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn host_config(&self) -> &HostConfig {
        &self.host
    }

    /// Replaces the host configuration.
    ///
    /// Entries survive only if the new configuration emits identical text.
    pub fn set_host_config(&mut self, host: HostConfig) {
        let old_bits = self.host.bits();
        let new_bits = host.bits();
        self.host = host;

        if old_bits != new_bits && !self.entries.is_empty() {
            log::info!(
                "Host configuration changed ({old_bits:#x} -> {new_bits:#x}), dropping {} geometry shaders",
                self.entries.len()
            );
            self.entries.clear();
        }
    }

    /// Returns the shader for `uid`, generating it on first request.
    pub fn get_or_generate(&mut self, uid: GeometryShaderUid) -> &GeneratedShader {
        let host = &self.host;
        self.entries
            .entry(uid)
            .or_insert_with(|| GeneratedShader::generate(uid, host))
    }

    #[must_use]
    pub fn get(&self, uid: &GeometryShaderUid) -> Option<&GeneratedShader> {
        self.entries.get(uid)
    }

    /// Generates every enumerated key that is not cached yet.
    ///
    /// Keys are distributed over `workers` scoped threads through a channel;
    /// results are merged on the calling thread. Returns the number of newly
    /// generated shaders.
    pub fn precompile(&mut self, supports_primitive_restart: bool, workers: usize) -> usize {
        let pending: Vec<GeometryShaderUid> =
            enumerate_geometry_shader_uids(supports_primitive_restart)
                .filter(|uid| !self.entries.contains_key(uid))
                .collect();

        if pending.is_empty() {
            return 0;
        }

        let workers = workers.clamp(1, pending.len());
        let host = self.host;
        let host_bits = host.bits();

        let (job_tx, job_rx) = flume::unbounded::<GeometryShaderUid>();
        let (done_tx, done_rx) = flume::unbounded::<(GeometryShaderUid, String)>();

        for uid in &pending {
            // The receiver outlives this loop.
            let _ = job_tx.send(*uid);
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    for uid in job_rx.iter() {
                        let code = generate_geometry_shader_code(host.api, &host, &uid);
                        if done_tx.send((uid, code.into_string())).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(done_tx);

        let mut generated = 0;
        for (uid, source) in done_rx.try_iter() {
            self.entries
                .insert(uid, GeneratedShader::from_source(uid, host_bits, source));
            generated += 1;
        }

        log::info!(
            "Precompiled {generated} geometry shaders on {workers} workers ({} cached, {} unique sources)",
            self.entries.len(),
            self.unique_source_count()
        );
        generated
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct source texts among the cached entries.
    #[must_use]
    pub fn unique_source_count(&self) -> usize {
        self.entries
            .values()
            .map(|shader| shader.source_hash)
            .collect::<FxHashSet<_>>()
            .len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
