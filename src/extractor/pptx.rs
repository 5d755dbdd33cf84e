use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;

/// Per-slide concatenation of shape text with slide markers. A .pptx is a
/// zip archive; slide text lives in `<a:t>` elements inside
/// `ppt/slides/slideN.xml`.
pub async fn extract(path: &Path) -> Option<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&path).ok()?;
        let mut archive = zip::ZipArchive::new(file).ok()?;

        let mut slide_names: Vec<String> = (0..archive.len())
            .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .collect();
        slide_names.sort_by_key(|n| slide_number(n));

        let mut out = String::new();
        for (i, name) in slide_names.iter().enumerate() {
            let mut entry = archive.by_name(name).ok()?;
            let mut xml = String::new();
            entry.read_to_string(&mut xml).ok()?;
            let text = shape_text(&xml);
            if !text.trim().is_empty() {
                out.push_str(&format!("--- slide {} ---\n", i + 1));
                out.push_str(text.trim());
                out.push('\n');
            }
        }

        if out.trim().is_empty() {
            None
        } else {
            Some(out)
        }
    })
    .await
    .ok()
    .flatten()
}

fn slide_number(name: &str) -> u32 {
    name.trim_start_matches("ppt/slides/slide")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(0)
}

fn shape_text(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut out = String::new();
    let mut in_text = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"t" => {
                in_text = false;
                out.push(' ');
            }
            Ok(Event::Text(t)) if in_text => {
                if let Ok(s) = t.unescape() {
                    out.push_str(&s);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    out
}
