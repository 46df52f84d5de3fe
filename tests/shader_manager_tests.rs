//! Shader Manager & Key Tests
//!
//! Tests for:
//! - Variant enumeration: size, uniqueness, restartability
//! - GeometryShaderUid: byte view, persisted-key decoding
//! - GeometryShaderManager: cache hits, invalidation, parallel precompile
//! - HostConfig: JSON loading

use std::sync::Arc;

use anyhow::Result;
use rustc_hash::FxHashSet;
use xxhash_rust::xxh3::xxh3_128;

use gsgen::errors::GsError;
use gsgen::settings::{ApiType, HostConfig};
use gsgen::{
    GeometryShaderManager, GeometryShaderUid, PrimitiveType, enumerate_geometry_shader_uids,
    generate_geometry_shader_code,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Enumeration
// ============================================================================

#[test]
fn enumerator_yields_27_unique_keys() {
    for restart in [false, true] {
        let uids = enumerate_geometry_shader_uids(restart);
        assert_eq!(uids.len(), 27);

        let bytes: FxHashSet<Vec<u8>> = uids.map(|uid| uid.as_bytes().to_vec()).collect();
        assert_eq!(bytes.len(), 27);
    }
}

#[test]
fn enumerator_is_restartable() {
    let first = enumerate_geometry_shader_uids(false);
    let replay = first.clone();
    assert!(first.eq(replay));
    assert!(enumerate_geometry_shader_uids(true).eq(enumerate_geometry_shader_uids(true)));
}

#[test]
fn enumerated_keys_produce_distinct_text() {
    let host = HostConfig::default();
    let sources: FxHashSet<String> = enumerate_geometry_shader_uids(true)
        .map(|uid| generate_geometry_shader_code(ApiType::OpenGl, &host, &uid).into_string())
        .collect();
    assert_eq!(sources.len(), 27);
}

// ============================================================================
// Key Persistence
// ============================================================================

#[test]
fn persisted_keys_round_trip() -> Result<()> {
    for uid in enumerate_geometry_shader_uids(true) {
        assert_eq!(GeometryShaderUid::from_bytes(uid.as_bytes())?, uid);
    }
    Ok(())
}

#[test]
fn malformed_keys_are_rejected() {
    assert!(matches!(
        GeometryShaderUid::from_bytes(&[]),
        Err(GsError::MalformedUid { .. })
    ));
    assert!(matches!(
        GeometryShaderUid::from_bytes(&[2, 0, 0, 0, 0]),
        Err(GsError::MalformedUid { .. })
    ));
    assert!(matches!(
        GeometryShaderUid::from_bytes(&[2, 0, 0, 7]),
        Err(GsError::MalformedUid { .. })
    ));
    assert!(matches!(
        GeometryShaderUid::from_bytes(&[9, 0, 0, 0]),
        Err(GsError::InvalidPrimitiveType(9))
    ));
    assert!(matches!(
        GeometryShaderUid::from_bytes(&[1, 12, 0, 0]),
        Err(GsError::InvalidTexGenCount(12))
    ));
}

#[test]
fn error_messages_name_the_problem() {
    let err = GeometryShaderUid::try_new(PrimitiveType::Lines, 10).unwrap_err();
    assert_eq!(err.to_string(), "Invalid texture generator count: 10 (max 8)");

    let err = "metal".parse::<ApiType>().unwrap_err();
    assert_eq!(err.to_string(), "Unsupported API: metal");
}

// ============================================================================
// GeometryShaderManager
// ============================================================================

#[test]
fn manager_caches_by_key() {
    init_logger();
    let mut manager = GeometryShaderManager::new(HostConfig::default());
    let uid = GeometryShaderUid::new(PrimitiveType::Points, 3);

    let first = Arc::clone(&manager.get_or_generate(uid).source);
    let again = Arc::clone(&manager.get_or_generate(uid).source);
    assert!(Arc::ptr_eq(&first, &again));

    let shader = manager.get(&uid).unwrap();
    assert_eq!(shader.uid, uid);
    assert_eq!(shader.source_hash, xxh3_128(first.as_bytes()));
}

#[test]
fn parallel_precompile_matches_sequential_generation() {
    init_logger();
    let host = HostConfig {
        api: ApiType::Vulkan,
        stereo: true,
        wireframe: true,
        ..Default::default()
    };
    let mut manager = GeometryShaderManager::new(host);

    assert_eq!(manager.precompile(true, 8), 27);
    assert_eq!(manager.len(), 27);
    assert_eq!(manager.unique_source_count(), 27);

    for uid in enumerate_geometry_shader_uids(true) {
        let expected = generate_geometry_shader_code(host.api, &host, &uid);
        let cached = manager.get(&uid).unwrap();
        assert_eq!(&*cached.source, expected.as_str());
        assert_eq!(cached.host_bits, host.bits());
    }
}

#[test]
fn precompile_adds_only_missing_keys() {
    let mut manager = GeometryShaderManager::new(HostConfig::default());
    assert_eq!(manager.precompile(false, 2), 27);

    // Strips are the only keys the restart sweep adds.
    assert_eq!(manager.precompile(true, 2), 9);
    assert_eq!(manager.len(), 36);
}

#[test]
fn host_change_drops_stale_entries() {
    let mut manager = GeometryShaderManager::new(HostConfig::default());
    manager.precompile(false, 4);
    assert!(!manager.is_empty());

    manager.set_host_config(HostConfig {
        api: ApiType::D3D,
        ..Default::default()
    });
    assert!(manager.is_empty());
    assert_eq!(manager.host_config().api, ApiType::D3D);

    let shader = manager.get_or_generate(GeometryShaderUid::new(PrimitiveType::Lines, 0));
    assert!(shader.source.contains("cbuffer GSBlock"));
    assert!(!shader.source.contains("EmitVertex"));
    let host_bits = shader.host_bits;
    assert_eq!(host_bits, manager.host_config().bits());

    manager.clear();
    assert_eq!(manager.len(), 0);
}

// ============================================================================
// Host Configuration
// ============================================================================

#[test]
fn host_config_loads_from_disk() -> Result<()> {
    let path = std::env::temp_dir().join(format!("gsgen_host_{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{
            "api": "d3d",
            "stereo": true,
            "gs_instancing": true,
            "driver_bugs": "BROKEN_CLIP_DISTANCE"
        }"#,
    )?;

    let host = HostConfig::load(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(host.api, ApiType::D3D);
    assert_eq!(host.layers(), 2);
    assert!(host.gs_instancing);
    assert!(!host.wireframe);
    Ok(())
}

#[test]
fn missing_host_config_is_an_io_error() {
    let result = HostConfig::load("/nonexistent/gsgen/host.json");
    assert!(matches!(result, Err(GsError::IoError(_))));
}

#[test]
fn invalid_host_config_is_a_json_error() {
    assert!(matches!(
        HostConfig::from_json(r#"{ "api": "metal" }"#),
        Err(GsError::JsonError(_))
    ));
}
