use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;
use std::path::Path;

/// Metadata only — duration, bitrate, sample rate, channels,
/// title/artist/album/year/genre.
pub async fn extract(path: &Path) -> Option<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let tagged = lofty::read_from_path(&path).ok()?;
        let properties = tagged.properties();

        let mut out = String::new();
        out.push_str(&format!("duration_s: {}\n", properties.duration().as_secs()));
        if let Some(br) = properties.audio_bitrate() {
            out.push_str(&format!("bitrate_kbps: {}\n", br));
        }
        if let Some(sr) = properties.sample_rate() {
            out.push_str(&format!("sample_rate_hz: {}\n", sr));
        }
        if let Some(ch) = properties.channels() {
            out.push_str(&format!("channels: {}\n", ch));
        }

        if let Some(tag) = tagged.primary_tag() {
            if let Some(v) = tag.title() {
                out.push_str(&format!("title: {}\n", v));
            }
            if let Some(v) = tag.artist() {
                out.push_str(&format!("artist: {}\n", v));
            }
            if let Some(v) = tag.album() {
                out.push_str(&format!("album: {}\n", v));
            }
            if let Some(v) = tag.year() {
                out.push_str(&format!("year: {}\n", v));
            }
            if let Some(v) = tag.genre() {
                out.push_str(&format!("genre: {}\n", v));
            }
        }

        Some(out)
    })
    .await
    .ok()
    .flatten()
}
