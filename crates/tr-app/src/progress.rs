//! Parsing the simulation binary's line-oriented progress stream.
//!
//! A progress line looks like `L:1/2 I:15/5.0E+06 M:04/5.0E+06/145 P:Z0 ...`;
//! the leading `L:` token carries the loop index. A line starting with
//! `finish` marks the terminal state.

/// One observation extracted from a progress line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// `L:<done>/<total>` loop-index token.
    Loop { done: usize, total: usize },
    /// Terminal token; carries the full line as the completion message.
    Finished(String),
}

/// Extract a progress observation from one stream line, if it carries one.
pub fn parse_progress_line(line: &str) -> Option<ProgressUpdate> {
    let first = line.split_whitespace().next()?;
    if let Some(rest) = first
        .strip_prefix("L:")
        .or_else(|| first.strip_prefix("l:"))
    {
        let (done, total) = rest.split_once('/')?;
        return Some(ProgressUpdate::Loop {
            done: done.parse().ok()?,
            total: total.parse().ok()?,
        });
    }
    if first.to_lowercase().starts_with("finish") {
        return Some(ProgressUpdate::Finished(line.trim().to_string()));
    }
    None
}
