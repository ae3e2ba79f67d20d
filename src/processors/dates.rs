// psdate/src/processors/dates.rs
//
// Resolves the output base name for a source file: the image's creation
// date, taken from embedded XMP metadata when possible, from filesystem
// timestamps when not, and from the wall clock as the last resort. This
// resolver never fails; it always produces a usable filename stem.
use crate::core::LogTrail;
use crate::utils::base_name;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::path::Path;

const XMP_NS_PHOTOSHOP: &str = "http://ns.adobe.com/photoshop/1.0/";
const XMP_NS_DC: &str = "http://purl.org/dc/elements/1.1/";
const XMP_NS_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

const STEM_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Derives a sortable, filesystem-safe `YYYY-MM-DD_HHMMSS` stem for the
/// given source file. Each fallback tier logs why the previous one was
/// skipped; the wall-clock tier additionally tags the stem with
/// `_fallback` so such names stand out in the output directory.
pub fn resolve_date_stem(path: &Path, trail: &mut LogTrail) -> String {
    let name = base_name(path);

    match xmp_creation_date(path, trail) {
        Some(date) => {
            trail.info(format!("Extracted XMP creation date for {}", name));
            return date.format(STEM_FORMAT).to_string();
        }
        None => {
            trail.info(format!("Falling back to file system timestamp for {}", name));
        }
    }

    match filesystem_timestamp(path) {
        Ok(date) => date.format(STEM_FORMAT).to_string(),
        Err(e) => {
            trail.warn(format!(
                "Could not get file system timestamp for {}: {}",
                name, e
            ));
            format!(
                "{}_fallback",
                Local::now().naive_local().format(STEM_FORMAT)
            )
        }
    }
}

fn xmp_creation_date(path: &Path, trail: &mut LogTrail) -> Option<NaiveDateTime> {
    let name = base_name(path);

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            trail.info(format!("Could not read {} for metadata: {}", name, e));
            return None;
        }
    };

    let packet = match extract_xmp_packet(&bytes) {
        Some(packet) => packet,
        None => {
            trail.info(format!("No XMP metadata found in {}", name));
            return None;
        }
    };

    let xml = match std::str::from_utf8(packet) {
        Ok(xml) => xml,
        Err(_) => {
            trail.info(format!("XMP packet in {} is not valid UTF-8", name));
            return None;
        }
    };

    match parse_xmp_creation_date(xml) {
        Ok(Some(date)) => Some(date),
        Ok(None) => {
            trail.info(format!(
                "XMP metadata found for {}, but no recognized creation date tag",
                name
            ));
            None
        }
        Err(e) => {
            trail.info(format!("XMP parsing error for {}: {}", name, e));
            None
        }
    }
}

/// Searches an XMP document for a creation date.
///
/// `photoshop:DateCreated` wins over `dc:date`; the element serialization
/// wins over the attribute one. For `dc:date` only the first occurrence in
/// document order is consulted, even when several values are present.
fn parse_xmp_creation_date(
    xml: &str,
) -> std::result::Result<Option<NaiveDateTime>, roxmltree::Error> {
    let doc = roxmltree::Document::parse(xml)?;

    if let Some(node) = doc
        .descendants()
        .find(|n| n.has_tag_name((XMP_NS_PHOTOSHOP, "DateCreated")))
    {
        if let Some(date) = direct_text(&node).and_then(parse_date_text) {
            return Ok(Some(date));
        }
    }

    // XMP also allows simple properties in attribute form on rdf:Description.
    if let Some(value) = doc
        .descendants()
        .find_map(|n| n.attribute((XMP_NS_PHOTOSHOP, "DateCreated")))
    {
        if let Some(date) = parse_date_text(value) {
            return Ok(Some(date));
        }
    }

    if let Some(node) = doc
        .descendants()
        .find(|n| n.has_tag_name((XMP_NS_DC, "date")))
    {
        // dc:date is often an rdf:Seq; take the first rdf:li in that case.
        let text = direct_text(&node).or_else(|| {
            node.descendants()
                .find(|n| n.has_tag_name((XMP_NS_RDF, "li")))
                .and_then(|li| direct_text(&li))
        });
        return Ok(text.and_then(parse_date_text));
    }

    Ok(None)
}

fn direct_text<'a>(node: &roxmltree::Node<'a, '_>) -> Option<&'a str> {
    node.text().map(str::trim).filter(|t| !t.is_empty())
}

/// Accepts the date shapes XMP tools actually write: RFC 3339 with an
/// offset, a naive `YYYY-MM-DDTHH:MM:SS` with optional fraction, or a bare
/// date (interpreted as midnight).
fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.naive_local());
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(date);
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }

    None
}

/// Locates the XMP packet inside the raw file bytes.
///
/// Packet scanning per the XMP standard: look for the `<?xpacket begin`
/// processing instruction and the matching `<?xpacket end` one. Falls back
/// to a bare `<x:xmpmeta>` element for packets written without the wrapper.
fn extract_xmp_packet(bytes: &[u8]) -> Option<&[u8]> {
    if let Some(start) = find_bytes(bytes, b"<?xpacket begin", 0) {
        let end_marker = find_bytes(bytes, b"<?xpacket end", start)?;
        let close = find_bytes(bytes, b"?>", end_marker)?;
        return Some(&bytes[start..close + 2]);
    }

    let start = find_bytes(bytes, b"<x:xmpmeta", 0)?;
    let end_marker = find_bytes(bytes, b"</x:xmpmeta>", start)?;
    Some(&bytes[start..end_marker + b"</x:xmpmeta>".len()])
}

fn find_bytes(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}

fn filesystem_timestamp(path: &Path) -> std::io::Result<NaiveDateTime> {
    let metadata = std::fs::metadata(path)?;
    // Creation time where the platform records one, modification time
    // elsewhere (Linux filesystems commonly refuse `created()`).
    let time = metadata.created().or_else(|_| metadata.modified())?;
    Ok(DateTime::<Local>::from(time).naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn wrap(description_body: &str) -> String {
        format!(
            r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:photoshop="http://ns.adobe.com/photoshop/1.0/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
      {}
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#,
            description_body
        )
    }

    #[test]
    fn date_created_element_wins_over_dc_date() {
        let xml = wrap(
            "<photoshop:DateCreated>2021-05-04T10:15:00</photoshop:DateCreated>\
             <dc:date>1999-01-01T00:00:00</dc:date>",
        );
        let date = parse_xmp_creation_date(&xml).unwrap().unwrap();
        assert_eq!(date.format("%Y-%m-%d_%H%M%S").to_string(), "2021-05-04_101500");
    }

    #[test]
    fn date_created_attribute_form_is_recognized() {
        let xml = r#"<?xpacket begin="" id="x"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:photoshop="http://ns.adobe.com/photoshop/1.0/"
        photoshop:DateCreated="2020-12-31T23:59:58"/>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;
        let date = parse_xmp_creation_date(xml).unwrap().unwrap();
        assert_eq!(date.format("%Y-%m-%d_%H%M%S").to_string(), "2020-12-31_235958");
    }

    #[test]
    fn first_dc_date_is_used_without_sorting() {
        let xml = wrap(
            "<dc:date>2022-06-07T08:09:10</dc:date>\
             <dc:date>2001-01-01T00:00:00</dc:date>",
        );
        let date = parse_xmp_creation_date(&xml).unwrap().unwrap();
        assert_eq!(date.format("%Y-%m-%d_%H%M%S").to_string(), "2022-06-07_080910");
    }

    #[test]
    fn dc_date_sequence_takes_first_list_item() {
        let xml = wrap(
            "<dc:date><rdf:Seq>\
               <rdf:li>2019-03-02T01:02:03</rdf:li>\
               <rdf:li>2018-01-01T00:00:00</rdf:li>\
             </rdf:Seq></dc:date>",
        );
        let date = parse_xmp_creation_date(&xml).unwrap().unwrap();
        assert_eq!(date.format("%Y-%m-%d_%H%M%S").to_string(), "2019-03-02_010203");
    }

    #[test]
    fn unparsable_first_dc_date_yields_none() {
        let xml = wrap("<dc:date>not a date</dc:date><dc:date>2022-06-07T08:09:10</dc:date>");
        assert!(parse_xmp_creation_date(&xml).unwrap().is_none());
    }

    #[test]
    fn undated_xmp_yields_none() {
        let xml = wrap("<dc:title>untitled</dc:title>");
        assert!(parse_xmp_creation_date(&xml).unwrap().is_none());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_xmp_creation_date("<unclosed").is_err());
    }

    #[test]
    fn date_only_value_means_midnight() {
        let xml = wrap("<photoshop:DateCreated>2021-05-04</photoshop:DateCreated>");
        let date = parse_xmp_creation_date(&xml).unwrap().unwrap();
        assert_eq!(date.format("%Y-%m-%d_%H%M%S").to_string(), "2021-05-04_000000");
    }

    #[test]
    fn rfc3339_offset_is_accepted() {
        let xml = wrap("<photoshop:DateCreated>2021-05-04T10:15:00+02:00</photoshop:DateCreated>");
        let date = parse_xmp_creation_date(&xml).unwrap().unwrap();
        assert_eq!(date.format("%Y-%m-%d_%H%M%S").to_string(), "2021-05-04_101500");
    }

    #[test]
    fn packet_scanner_finds_wrapped_packet() {
        let xml = wrap("<photoshop:DateCreated>2021-05-04T10:15:00</photoshop:DateCreated>");
        let mut bytes = vec![0u8; 64];
        bytes.extend_from_slice(xml.as_bytes());
        bytes.extend_from_slice(&[0u8; 64]);

        let packet = extract_xmp_packet(&bytes).unwrap();
        assert!(packet.starts_with(b"<?xpacket begin"));
        assert!(packet.ends_with(b"?>"));
    }

    #[test]
    fn packet_scanner_returns_none_without_markers() {
        assert!(extract_xmp_packet(b"no metadata here").is_none());
    }

    #[test]
    fn filesystem_fallback_produces_parseable_stem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.psd");
        std::fs::write(&path, b"not xmp at all").unwrap();

        let mut trail = LogTrail::new();
        let stem = resolve_date_stem(&path, &mut trail);

        assert!(NaiveDateTime::parse_from_str(&stem, "%Y-%m-%d_%H%M%S").is_ok());
        assert!(!stem.ends_with("_fallback"));
        assert!(trail
            .lines()
            .iter()
            .any(|l| l.contains("Falling back to file system timestamp")));
    }

    #[test]
    fn missing_file_uses_wall_clock_with_fallback_suffix() {
        let mut trail = LogTrail::new();
        let stem = resolve_date_stem(Path::new("does-not-exist.psd"), &mut trail);

        assert!(stem.ends_with("_fallback"));
        let bare = stem.trim_end_matches("_fallback");
        assert!(NaiveDateTime::parse_from_str(bare, "%Y-%m-%d_%H%M%S").is_ok());
    }
}
