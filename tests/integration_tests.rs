//! Integration tests for audiorestore
//!
//! These exercise the reconstruction engine and the file pipeline end to end
//! without an external model.

use audiorestore::audio::{read_wav, write_wav, SampleFormat, Signal};
use audiorestore::config::Config;
use audiorestore::model::IdentityModel;
use audiorestore::pipeline::{restore_file, PipelineConfig};
use audiorestore::reconstruct::{
    ChunkRole, ChunkScheduler, PaddingPolicy, ReconstructionConfig, Reconstructor, TailPadding,
    WindowProfile,
};
use audiorestore::RestoreError;

use tempfile::TempDir;

fn test_signal(channels: usize, len: usize) -> Signal {
    Signal::new(
        100,
        (0..channels)
            .map(|c| {
                (0..len)
                    .map(|i| ((i as f32) * 0.37 + c as f32).sin() * 0.8)
                    .collect()
            })
            .collect(),
    )
    .unwrap()
}

fn assert_close(a: &Signal, b: &Signal, tolerance: f32) {
    assert_eq!(a.num_channels(), b.num_channels());
    assert_eq!(a.len(), b.len());
    for (ca, cb) in a.channels().iter().zip(b.channels()) {
        for (i, (x, y)) in ca.iter().zip(cb).enumerate() {
            assert!((x - y).abs() <= tolerance, "sample {i}: {x} vs {y}");
        }
    }
}

fn config(chunk_len: usize, overlap_factor: usize, fade_len: usize) -> ReconstructionConfig {
    ReconstructionConfig {
        chunk_len,
        overlap_factor,
        fade_len,
        reflect_threshold: None,
    }
}

// ============================================================================
// Scheduling and windowing properties
// ============================================================================

mod window_tests {
    use super::*;

    #[test]
    fn test_every_sample_gets_weight() {
        for (chunk_len, overlap, fade) in [(20, 2, 3), (20, 2, 10), (16, 4, 4), (9, 3, 0), (12, 2, 6)] {
            let cfg = config(chunk_len, overlap, fade);
            let scheduler =
                ChunkScheduler::new(cfg.chunk_len, cfg.step(), cfg.reflect_threshold()).unwrap();
            let window = WindowProfile::new(chunk_len, fade).unwrap();

            for padded_len in 1..120 {
                let mut weight = vec![0.0f32; padded_len];
                for chunk in scheduler.schedule(padded_len) {
                    let mask = window.mask_for(chunk.role);
                    for (w, m) in weight[chunk.spec.start..chunk.spec.start + chunk.valid_len]
                        .iter_mut()
                        .zip(&mask)
                    {
                        *w += m;
                    }
                }
                assert!(
                    weight.iter().all(|&w| w > 0.0),
                    "gap for C={chunk_len} N={overlap} fade={fade} len={padded_len}"
                );
            }
        }
    }

    #[test]
    fn test_boundary_exemptions() {
        let window = WindowProfile::new(20, 3).unwrap();
        let scheduler = ChunkScheduler::new(20, 10, 11).unwrap();
        let chunks = scheduler.schedule(95);

        for chunk in &chunks {
            let mask = window.mask_for(chunk.role);
            match chunk.role {
                ChunkRole::First => {
                    assert_eq!(chunk.spec.start, 0);
                    assert!(mask[..3].iter().all(|&w| w > 0.0));
                }
                ChunkRole::Last => {
                    assert!(chunk.spec.end() >= 95);
                    assert!(mask[17..].iter().all(|&w| w > 0.0));
                }
                ChunkRole::Interior => {
                    assert!(mask[17..].iter().all(|&w| w == 0.0));
                }
            }
        }
        assert_eq!(chunks.first().unwrap().role, ChunkRole::First);
        assert_eq!(chunks.last().unwrap().role, ChunkRole::Last);
    }

    #[test]
    fn test_one_sample_request_zero_pads() {
        let scheduler = ChunkScheduler::new(20, 10, 11).unwrap();
        let chunks = scheduler.schedule(1);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].tail, TailPadding::Zero(19));
    }
}

// ============================================================================
// Padding
// ============================================================================

mod padding_tests {
    use super::*;

    #[test]
    fn test_pad_strip_roundtrip_is_exact() {
        for len in [21, 22, 40, 101] {
            let signal = test_signal(2, len);
            let policy = PaddingPolicy::decide(10, len);
            assert!(policy.is_applied());

            let padded = policy.pad(&signal).unwrap();
            assert_eq!(padded.len(), len + 20);
            assert_eq!(policy.strip(padded).unwrap(), signal);
        }
    }

    #[test]
    fn test_short_signal_is_not_padded() {
        for len in [0, 1, 10, 20] {
            assert!(!PaddingPolicy::decide(10, len).is_applied());
        }
    }
}

// ============================================================================
// Reconstruction
// ============================================================================

mod reconstruction_tests {
    use super::*;

    #[tokio::test]
    async fn test_two_channel_25_sample_identity() {
        let reconstructor = Reconstructor::new(config(20, 2, 3)).unwrap();
        let signal = test_signal(2, 25);

        let (policy, chunks) = reconstructor.plan(signal.len());
        assert!(policy.is_applied());
        assert_eq!(policy.border(), 10);
        assert_eq!(
            chunks.iter().map(|c| c.spec.start).collect::<Vec<_>>(),
            vec![0, 10, 20, 30, 40]
        );

        let out = reconstructor.reconstruct(&signal, &IdentityModel).await.unwrap();
        assert_eq!(out.len(), 25);
        assert_close(&out, &signal, 1e-6);
    }

    #[tokio::test]
    async fn test_short_signal_keeps_length() {
        let reconstructor = Reconstructor::new(config(20, 2, 3)).unwrap();
        for len in [1, 7, 15, 20] {
            let signal = test_signal(1, len);
            let out = reconstructor.reconstruct(&signal, &IdentityModel).await.unwrap();
            assert_eq!(out.len(), len);
            assert_close(&out, &signal, 1e-6);
        }
    }

    #[tokio::test]
    async fn test_identity_across_configurations() {
        for (chunk_len, overlap, fade) in [(20, 2, 3), (32, 4, 8), (15, 3, 5), (10, 2, 0)] {
            let reconstructor = Reconstructor::new(config(chunk_len, overlap, fade))
                .unwrap()
                .with_concurrency(3);
            let signal = test_signal(2, 203);
            let out = reconstructor.reconstruct(&signal, &IdentityModel).await.unwrap();
            assert_close(&out, &signal, 1e-5);
        }
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        assert!(matches!(
            Reconstructor::new(config(20, 0, 3)),
            Err(RestoreError::Config(_))
        ));
        assert!(matches!(
            Reconstructor::new(config(4, 2, 5)),
            Err(RestoreError::Config(_))
        ));
        assert!(matches!(
            Reconstructor::new(config(20, 1, 3)),
            Err(RestoreError::Config(_))
        ));
        assert!(matches!(
            Reconstructor::new(config(1, 2, 0)),
            Err(RestoreError::Config(_))
        ));
    }

    #[test]
    fn test_blocking_reconstruction() {
        let reconstructor = Reconstructor::new(config(20, 2, 3)).unwrap();
        let signal = test_signal(1, 64);
        let out = tokio_test::block_on(reconstructor.reconstruct(&signal, &IdentityModel)).unwrap();
        assert_close(&out, &signal, 1e-6);
    }
}

// ============================================================================
// File pipeline
// ============================================================================

mod pipeline_tests {
    use super::*;

    fn pipeline_config() -> Config {
        Config {
            chunk_duration_seconds: 0.2,
            overlap_factor: 2,
            fade_duration_seconds: 0.03,
            sample_rate: 100,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_restore_wav_with_identity_model() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out").join("restored.wav");
        let signal = test_signal(2, 137);
        write_wav(&input, &signal, SampleFormat::F32).unwrap();

        let pipeline = PipelineConfig {
            show_progress: false,
            ..Default::default()
        };
        let result = restore_file(&input, &output, &pipeline_config(), &IdentityModel, pipeline)
            .await
            .unwrap();

        assert_eq!(result.output_path, output);
        assert_eq!(result.stats.channels, 2);
        assert_eq!(result.stats.sample_rate, 100);
        assert!(result.stats.edge_padded);
        assert_eq!(result.stats.model, "identity");

        let restored = read_wav(&output).unwrap();
        assert_close(&restored, &signal, 1e-6);
    }

    #[tokio::test]
    async fn test_restore_missing_input() {
        let dir = TempDir::new().unwrap();
        let result = restore_file(
            &dir.path().join("missing.wav"),
            &dir.path().join("out.wav"),
            &pipeline_config(),
            &IdentityModel,
            PipelineConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(RestoreError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_stats_json_written() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        write_wav(&input, &test_signal(1, 50), SampleFormat::F32).unwrap();

        let pipeline = PipelineConfig {
            show_progress: false,
            ..Default::default()
        };
        let result = restore_file(&input, &output, &pipeline_config(), &IdentityModel, pipeline)
            .await
            .unwrap();

        let stats_path = dir.path().join("stats.json");
        result.stats.write_json(&stats_path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&stats_path).unwrap()).unwrap();
        assert_eq!(json["chunks_processed"], result.stats.chunks_processed);
        assert_eq!(json["channels"], 1);
    }
}
