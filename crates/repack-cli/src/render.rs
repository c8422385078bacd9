use std::io::{self, BufRead, Write};

use anstyle::{AnsiColor, Style};
use indicatif::{ProgressBar, ProgressStyle};
use repack_engine::{FailureContext, ProgressSink, RecoveryChoice};

pub struct TerminalProgress {
    bar: Option<ProgressBar>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self { bar: None }
    }
}

impl ProgressSink for TerminalProgress {
    fn begin_stage(&mut self, stage: &str, total: usize) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        let bar = ProgressBar::new(total.max(1) as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{msg:<10} [{bar:20.cyan/blue}] {pos:>3}/{len:3}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.set_message(stage.to_string());
        self.bar = Some(bar);
    }

    fn advance(&mut self, current: usize) {
        if let Some(bar) = &self.bar {
            bar.set_position(current as u64);
        }
    }

    fn status(&mut self, text: &str) {
        match &self.bar {
            Some(bar) => bar.println(text),
            None => println!("{text}"),
        }
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

fn warning_style() -> Style {
    Style::new().fg_color(Some(AnsiColor::Yellow.into())).bold()
}

fn error_style() -> Style {
    Style::new().fg_color(Some(AnsiColor::Red.into())).bold()
}

pub fn print_warning(text: &str) {
    let style = warning_style();
    eprintln!("{style}warning{style:#}: {text}");
}

pub fn print_error(text: &str) {
    let style = error_style();
    eprintln!("{style}error{style:#}: {text}");
}

pub fn prompt_recovery(failure: &FailureContext<'_>) -> RecoveryChoice {
    let style = error_style();
    let stage = if failure.during_rollback {
        "rollback"
    } else {
        "update"
    };
    eprintln!(
        "{style}{stage} failed{style:#} for {}: {}",
        failure.package_id, failure.error
    );
    loop {
        eprint!("[a]bort, [r]etry, [i]gnore? ");
        let _ = io::stderr().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => return RecoveryChoice::Abort,
            Ok(_) => {}
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "a" | "abort" => return RecoveryChoice::Abort,
            "r" | "retry" => return RecoveryChoice::Retry,
            "i" | "ignore" => return RecoveryChoice::Ignore,
            _ => {}
        }
    }
}
