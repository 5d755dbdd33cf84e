use std::path::Path;

/// Raw read with UTF-8 decode, falling back to Latin-1 byte-widening to
/// guarantee success — every byte sequence is some valid string under that
/// fallback.
pub async fn extract(path: &Path) -> Option<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path).ok()?;
        match String::from_utf8(bytes.clone()) {
            Ok(s) => Some(s),
            Err(_) => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    })
    .await
    .ok()
    .flatten()
}
