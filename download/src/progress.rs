use playsync_model::sink::DownloadProgress;

/// Parses a `[download]` progress line as printed by `yt-dlp --newline`.
///
/// ```text
/// [download]  42.3% of ~  3.45MiB at  1.23MiB/s ETA 00:02
/// ```
pub fn parse_line(line: &str) -> Option<DownloadProgress> {
    let rest = line.trim().strip_prefix("[download]")?;
    let mut tokens = rest.split_whitespace().peekable();
    let percent = tokens.next()?.strip_suffix('%')?.parse::<f32>().ok()?;

    let mut total = None;
    let mut speed = None;
    while let Some(token) = tokens.next() {
        match token {
            "of" => {
                if tokens.peek() == Some(&"~") {
                    tokens.next();
                }
                total = tokens.next().map(str::to_string);
            }
            "at" => {
                speed = tokens
                    .next()
                    .filter(|s| !s.starts_with("Unknown"))
                    .map(str::to_string);
            }
            _ => {}
        }
    }
    Some(DownloadProgress {
        percent,
        total,
        speed,
    })
}
