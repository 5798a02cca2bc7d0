//! Console progress bars.

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a progress bar with the given length and label.
///
/// Returns a hidden bar when `visible` is false so callers can tick it
/// unconditionally.
pub fn create_progress_bar(len: u64, label: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_bar_still_counts() {
        let pb = create_progress_bar(3, "test", false);
        pb.inc(2);
        assert_eq!(pb.position(), 2);
        assert!(pb.is_hidden());
    }

    #[test]
    fn visible_bar_has_requested_length() {
        let pb = create_progress_bar(5, "train", true);
        assert_eq!(pb.length(), Some(5));
        pb.finish_and_clear();
    }
}
