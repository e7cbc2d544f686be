use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

const BAR_TEMPLATE: &str = "{prefix:>8.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}";

const BAR_CHARS: &str = "█▓▒░  ";

static BAR_STYLE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .ok()
        .map(|style| style.progress_chars(BAR_CHARS))
});

/// Byte progress of one object download, drawn on stderr.
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    pub fn new(label: &str, total: u64) -> Self {
        let bar = ProgressBar::new(total);
        let bar = match BAR_STYLE.as_ref() {
            Some(style) => bar.with_style(style.clone()),
            None => bar,
        };
        bar.set_prefix(label.to_string());
        Self { bar }
    }

    pub fn advance(&self, len: usize) { self.bar.inc(len as u64); }

    pub fn resumed(&self, count: u32, max: u32) {
        self.bar.set_message(format!("resumed {count}/{max}"));
    }

    pub fn finish(self) { self.bar.finish_with_message("done"); }

    /// Leave the bar where it stopped after a failed read.
    pub fn abandon(self) { self.bar.abandon_with_message("failed"); }
}
