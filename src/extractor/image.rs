use std::path::Path;

const MAX_EXIF_TAGS: usize = 10;

/// Metadata only — format, pixel dimensions, colour mode, and up to ten EXIF
/// tags. Never decodes the full image into a content excerpt.
pub async fn extract(path: &Path) -> Option<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let reader = image::io::Reader::open(&path).ok()?.with_guessed_format().ok()?;
        let format = reader.format().map(|f| format!("{:?}", f)).unwrap_or_else(|| "unknown".to_string());
        let dims = reader.into_dimensions().ok();

        let mut out = format!("format: {}\n", format);
        if let Some((w, h)) = dims {
            out.push_str(&format!("dimensions: {}x{}\n", w, h));
        }

        if let Ok(img) = image::open(&path) {
            out.push_str(&format!("color_mode: {:?}\n", img.color()));
        }

        if let Some(exif) = read_exif(&path) {
            out.push_str("exif:\n");
            out.push_str(&exif);
        }

        Some(out)
    })
    .await
    .ok()
    .flatten()
}

fn read_exif(path: &Path) -> Option<String> {
    let file = std::fs::File::open(path).ok()?;
    let mut bufreader = std::io::BufReader::new(file);
    let exif_reader = exif::Reader::new();
    let exif_data = exif_reader.read_from_container(&mut bufreader).ok()?;

    let mut out = String::new();
    for field in exif_data.fields().take(MAX_EXIF_TAGS) {
        out.push_str(&format!(
            "  {}: {}\n",
            field.tag,
            field.display_value().with_unit(&exif_data)
        ));
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
