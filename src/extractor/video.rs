use std::path::Path;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Metadata only via an external probe — container, duration, bitrate,
/// resolution (with a 480p/720p/1080p/4K label), video codec, frame rate,
/// audio codec, audio channels, common tags. Arguments are passed directly
/// to the subprocess, never through a shell, mirroring how this crate
/// invokes `nvidia-smi` in the hardware-tier detector.
pub async fn extract(path: &Path) -> Option<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || run_ffprobe(&path)).await.ok().flatten()
}

fn run_ffprobe(path: &Path) -> Option<String> {
    let handle = duct::cmd!(
        "ffprobe",
        "-v",
        "quiet",
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
        path
    )
    .stdout_capture()
    .stderr_null()
    .unchecked()
    .start()
    .ok()?;

    let start = std::time::Instant::now();
    loop {
        if let Ok(Some(output)) = handle.try_wait() {
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            return parse_ffprobe_json(&stdout);
        }
        if start.elapsed() >= PROBE_TIMEOUT {
            let _ = handle.kill();
            return None;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}

fn resolution_label(width: u64, height: u64) -> &'static str {
    let pixels = width.max(height);
    if pixels >= 3840 {
        "4K"
    } else if pixels >= 1920 {
        "1080p"
    } else if pixels >= 1280 {
        "720p"
    } else {
        "480p"
    }
}

fn parse_ffprobe_json(raw: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(raw).ok()?;

    let format = json.get("format")?;
    let container = format.get("format_name").and_then(|v| v.as_str()).unwrap_or("unknown");
    let duration: f64 = format
        .get("duration")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);
    let bitrate: u64 = format
        .get("bit_rate")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    let streams = json.get("streams").and_then(|v| v.as_array());
    let video_stream = streams
        .and_then(|s| s.iter().find(|st| st.get("codec_type").and_then(|v| v.as_str()) == Some("video")));
    let audio_stream = streams
        .and_then(|s| s.iter().find(|st| st.get("codec_type").and_then(|v| v.as_str()) == Some("audio")));

    let mut out = String::new();
    out.push_str(&format!("container: {}\n", container));
    out.push_str(&format!("duration_s: {:.1}\n", duration));
    out.push_str(&format!("bitrate_bps: {}\n", bitrate));

    if let Some(v) = video_stream {
        let width = v.get("width").and_then(|v| v.as_u64()).unwrap_or(0);
        let height = v.get("height").and_then(|v| v.as_u64()).unwrap_or(0);
        out.push_str(&format!(
            "resolution: {}x{} ({})\n",
            width,
            height,
            resolution_label(width, height)
        ));
        if let Some(codec) = v.get("codec_name").and_then(|v| v.as_str()) {
            out.push_str(&format!("video_codec: {}\n", codec));
        }
        if let Some(fr) = v.get("r_frame_rate").and_then(|v| v.as_str()) {
            out.push_str(&format!("frame_rate: {}\n", fr));
        }
    }

    if let Some(a) = audio_stream {
        if let Some(codec) = a.get("codec_name").and_then(|v| v.as_str()) {
            out.push_str(&format!("audio_codec: {}\n", codec));
        }
        if let Some(ch) = a.get("channels").and_then(|v| v.as_u64()) {
            out.push_str(&format!("audio_channels: {}\n", ch));
        }
    }

    if let Some(tags) = format.get("tags").and_then(|v| v.as_object()) {
        for (k, v) in tags.iter().take(10) {
            if let Some(s) = v.as_str() {
                out.push_str(&format!("tag.{}: {}\n", k, s));
            }
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_label_buckets_correctly() {
        assert_eq!(resolution_label(3840, 2160), "4K");
        assert_eq!(resolution_label(1920, 1080), "1080p");
        assert_eq!(resolution_label(1280, 720), "720p");
        assert_eq!(resolution_label(640, 480), "480p");
    }
}
