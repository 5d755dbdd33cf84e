//! Hardware-tier detection and presets. Reproduces the VRAM threshold table
//! and per-tier (batch_size, max_concurrent, default_model) triples of the
//! Python original's GPU detector, including its `nvidia-smi` probe command
//! and 5 s timeout.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    UltraHigh,
    High,
    UpperMid,
    Mid,
    Low,
    Cpu,
}

#[derive(Debug, Clone)]
pub struct TierPreset {
    pub batch_size: usize,
    pub max_concurrent: usize,
    pub default_model: &'static str,
}

/// Descending VRAM thresholds in GB, checked in order; the first whose
/// threshold the detected VRAM meets or exceeds wins.
const THRESHOLDS: &[(Tier, f64)] = &[
    (Tier::UltraHigh, 40.0),
    (Tier::High, 20.0),
    (Tier::UpperMid, 14.0),
    (Tier::Mid, 10.0),
    (Tier::Low, 5.0),
    (Tier::Cpu, 0.0),
];

pub fn preset_for(tier: Tier) -> TierPreset {
    match tier {
        Tier::UltraHigh => TierPreset { batch_size: 32, max_concurrent: 16, default_model: "qwen2.5:14b" },
        Tier::High => TierPreset { batch_size: 16, max_concurrent: 8, default_model: "qwen2.5:14b" },
        Tier::UpperMid => TierPreset { batch_size: 12, max_concurrent: 6, default_model: "qwen2.5:7b" },
        Tier::Mid => TierPreset { batch_size: 8, max_concurrent: 4, default_model: "qwen2.5:7b" },
        Tier::Low => TierPreset { batch_size: 4, max_concurrent: 2, default_model: "qwen2.5:3b" },
        Tier::Cpu => TierPreset { batch_size: 2, max_concurrent: 1, default_model: "qwen2.5:3b" },
    }
}

pub fn tier_for_vram(vram_gb: Option<f64>) -> Tier {
    match vram_gb {
        None => Tier::Cpu,
        Some(gb) => THRESHOLDS
            .iter()
            .find(|(_, threshold)| gb >= *threshold)
            .map(|(tier, _)| *tier)
            .unwrap_or(Tier::Cpu),
    }
}

/// Shells out to `nvidia-smi --query-gpu=memory.total --format=csv,noheader,nounits`
/// with a 5 s timeout, mirroring the Python original. Returns `None` if the
/// command is unavailable, times out, or the output cannot be parsed — in
/// which case the caller falls back to the `cpu` tier.
pub fn detect_vram_gb() -> Option<f64> {
    let handle = duct::cmd!(
        "nvidia-smi",
        "--query-gpu=memory.total",
        "--format=csv,noheader,nounits"
    )
    .stdout_capture()
    .stderr_null()
    .unchecked()
    .start()
    .ok()?;

    let start = std::time::Instant::now();
    loop {
        if let Ok(Some(output)) = handle.try_wait() {
            if !output.status.success() {
                return None;
            }
            let text = String::from_utf8_lossy(&output.stdout);
            let first_line = text.lines().next()?;
            let vram_mb: f64 = first_line.trim().parse().ok()?;
            return Some(vram_mb / 1024.0);
        }
        if start.elapsed() >= Duration::from_secs(5) {
            let _ = handle.kill();
            return None;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

pub fn auto_configure() -> TierPreset {
    let vram = detect_vram_gb();
    preset_for(tier_for_vram(vram))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds_match_descending_table() {
        assert_eq!(tier_for_vram(Some(48.0)), Tier::UltraHigh);
        assert_eq!(tier_for_vram(Some(24.0)), Tier::High);
        assert_eq!(tier_for_vram(Some(16.0)), Tier::UpperMid);
        assert_eq!(tier_for_vram(Some(12.0)), Tier::Mid);
        assert_eq!(tier_for_vram(Some(6.0)), Tier::Low);
        assert_eq!(tier_for_vram(Some(2.0)), Tier::Cpu);
        assert_eq!(tier_for_vram(None), Tier::Cpu);
    }

    #[test]
    fn presets_match_original_defaults() {
        let p = preset_for(Tier::High);
        assert_eq!(p.batch_size, 16);
        assert_eq!(p.max_concurrent, 8);
        assert_eq!(p.default_model, "qwen2.5:14b");
    }
}
