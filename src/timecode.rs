/// Format whole seconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_hhmmss(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hrs, mins, secs)
}
