/// `mm:ss`, minutes growing past two digits for very long sessions
pub fn format_time(total_secs: u64) -> String {
    let minutes = total_secs / 60;
    let secs = total_secs % 60;
    format!("{minutes:02}:{secs:02}")
}

/// Minutes typed into the limit field. Empty means no limit; zero is a
/// limit that is already reached.
pub fn parse_minutes(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok()
}
