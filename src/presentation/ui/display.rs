use colored::{Color, Colorize};
use console::{Style, Term};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Display utilities for the CLI interface
pub struct DisplayHelper {
    pub use_color: bool,
    /// Whether spinners are drawn
    pub interactive: bool,
    pub terminal: Term,
}

impl DisplayHelper {
    pub fn new(use_color: bool, interactive: bool) -> Self {
        Self {
            use_color,
            interactive,
            terminal: Term::stdout(),
        }
    }

    /// Detect color and spinner support from the terminal.
    ///
    /// Color is off when `no_color` is set, `NO_COLOR` is present, or stdout
    /// is not a terminal. Spinners are drawn only when both output streams
    /// are terminals.
    pub fn detect(no_color: bool) -> Self {
        let stdout_is_tty = atty::is(atty::Stream::Stdout);
        let use_color = color_allowed(no_color) && stdout_is_tty;
        let interactive = stdout_is_tty && atty::is(atty::Stream::Stderr);
        Self::new(use_color, interactive)
    }

    /// Whether log lines written to stderr may carry ANSI styling
    pub fn stderr_color(no_color: bool) -> bool {
        color_allowed(no_color) && atty::is(atty::Stream::Stderr)
    }

    pub fn success(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "✓".green().bold(), message);
        } else {
            println!("[SUCCESS] {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "✗".red().bold(), message);
        } else {
            eprintln!("[ERROR] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "⚠".yellow().bold(), message);
        } else {
            println!("[WARNING] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "::".blue().bold(), message);
        } else {
            println!("[INFO] {}", message);
        }
    }

    /// Print a debug message (only if verbose is enabled)
    pub fn debug(&self, message: &str, verbose: bool) {
        if verbose {
            if self.use_color {
                println!("{} {}", "->".dimmed(), message.dimmed());
            } else {
                println!("[DEBUG] {}", message);
            }
        }
    }

    pub fn section_header(&self, title: &str) {
        if self.use_color {
            println!("\n{}", title.bold().underline());
        } else {
            println!("\n=== {} ===", title);
        }
    }

    pub fn format_path(&self, path: &str) -> String {
        if self.use_color {
            path.cyan().to_string()
        } else {
            format!("'{}'", path)
        }
    }

    pub fn format_command(&self, command: &str) -> String {
        if self.use_color {
            command.magenta().bold().to_string()
        } else {
            format!("`{}`", command)
        }
    }

    pub fn format_branch(&self, branch: &str) -> String {
        if self.use_color {
            branch.green().to_string()
        } else {
            format!("'{}'", branch)
        }
    }

    /// Create a spinner for a running step; hidden when not interactive
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.interactive {
            return ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈", "✓"])
            .template("{spinner:.green} {msg} [{elapsed}]")
        {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    /// Write captured tool stdout unchanged
    pub fn print_stdout_block(&self, output: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()
    }

    /// Write captured tool stderr unchanged
    pub fn print_stderr_block(&self, output: &str) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        stderr.write_all(output.as_bytes())?;
        stderr.flush()
    }

    pub fn print_status(&self, status: StatusType, message: &str) {
        let (icon, color) = match status {
            StatusType::Success => ("✓", Color::Green),
            StatusType::Error => ("✗", Color::Red),
            StatusType::Warning => ("⚠", Color::Yellow),
            StatusType::Info => ("::", Color::Blue),
        };

        if self.use_color {
            println!("{} {}", icon.color(color).bold(), message);
        } else {
            let label = match status {
                StatusType::Success => "[OK]",
                StatusType::Error => "[ERROR]",
                StatusType::Warning => "[WARN]",
                StatusType::Info => "[INFO]",
            };
            println!("{} {}", label, message);
        }
    }

    pub fn print_indented(&self, message: &str, level: usize) {
        let indent = "  ".repeat(level);
        println!("{}{}", indent, message);
    }

    /// Format a duration in human-readable format
    pub fn format_duration(&self, duration: Duration) -> String {
        let secs = duration.as_secs();
        let millis = duration.subsec_millis();

        if secs >= 60 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs > 0 {
            format!("{}.{}s", secs, millis / 100)
        } else {
            format!("{}ms", millis)
        }
    }

    pub fn print_summary(&self, title: &str, items: &[(String, String)]) {
        if self.use_color {
            let key_style = Style::new().bold();
            println!("\n┌─ {} ─┐", title.bold());
            for (key, value) in items {
                println!("│ {}: {}", key_style.apply_to(key), value);
            }
            println!("└{:─<width$}┘", "", width = title.len() + 4);
        } else {
            println!("\n=== {} ===", title);
            for (key, value) in items {
                println!("{}: {}", key, value);
            }
            println!("{}", "=".repeat(title.len() + 8));
        }
    }
}

/// Status types for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    Success,
    Error,
    Warning,
    Info,
}

fn color_allowed(no_color: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_color_disables_stderr_styling() {
        assert!(!DisplayHelper::stderr_color(true));
    }

    #[test]
    fn test_plain_formatting() {
        let display = DisplayHelper::new(false, false);
        assert_eq!(display.format_path("src"), "'src'");
        assert_eq!(display.format_command("git status"), "`git status`");
        assert_eq!(display.format_branch("main"), "'main'");
    }

    #[test]
    fn test_format_duration() {
        let display = DisplayHelper::new(false, false);
        assert_eq!(display.format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(display.format_duration(Duration::from_millis(2_500)), "2.5s");
        assert_eq!(display.format_duration(Duration::from_secs(61)), "1m 1s");
    }

    #[test]
    fn test_spinner_hidden_when_not_interactive() {
        let display = DisplayHelper::new(true, false);
        assert!(display.create_spinner("Fetching").is_hidden());
    }
}
