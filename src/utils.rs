use indicatif::{ProgressBar, ProgressStyle};

pub fn progress_bar(len: u64) -> ProgressBar {
    ProgressBar::new(len).with_style(
        ProgressStyle::with_template("[{elapsed_precise}] {human_pos}/{human_len} {percent}% ({eta})")
            .expect("hardcoded"),
    )
}

pub fn download_bar(len: Option<u64>) -> ProgressBar {
    match len {
        Some(len) => ProgressBar::new(len).with_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}] {bytes}/{total_bytes} {percent}% ({bytes_per_sec})",
            )
            .expect("hardcoded"),
        ),
        None => ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bytes} ({bytes_per_sec})")
                .expect("hardcoded"),
        ),
    }
}
