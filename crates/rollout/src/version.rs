use std::cmp::Ordering;

/// Compares two dotted version strings segment by segment.
///
/// Segments are parsed as non-negative integers; anything that does not
/// parse counts as 0, and missing trailing segments count as 0, so
/// `"1.2"` equals `"1.2.0"`. Total and deterministic for any input.
pub fn compare(a: &str, b: &str) -> Ordering {
    let pa: Vec<u64> = a.split('.').map(parse_segment).collect();
    let pb: Vec<u64> = b.split('.').map(parse_segment).collect();

    for i in 0..pa.len().max(pb.len()) {
        let aa = pa.get(i).copied().unwrap_or(0);
        let bb = pb.get(i).copied().unwrap_or(0);
        match aa.cmp(&bb) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

fn parse_segment(segment: &str) -> u64 {
    segment.trim().parse::<u64>().unwrap_or(0)
}
