/// Format a byte count for display: "512 B", "3.4 KB", "1.2 MB"
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    let value = bytes as f64;
    if value < KB {
        format!("{} B", bytes)
    } else if value < MB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{:.1} MB", value / MB)
    }
}

/// Sort key for a performance time within one festival day.
///
/// Programs run past midnight: times before 10:00 belong to the night
/// block and sort after the evening slots of the same day. Empty or
/// unparseable times sort first.
pub fn time_sort_key(time: &str) -> (u8, u32) {
    let mut parts = time.splitn(2, ':');
    let (Some(hours), Some(minutes)) = (parts.next(), parts.next()) else {
        return (0, 0);
    };
    let (Ok(hours), Ok(minutes)) = (hours.trim().parse::<u32>(), minutes.trim().parse::<u32>())
    else {
        return (0, 0);
    };
    let after_midnight = u8::from(hours < 10);
    (after_midnight, hours * 60 + minutes)
}
