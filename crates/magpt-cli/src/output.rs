//! Output formatting and styling

use colored::Colorize;
use magpt_session::{ConnectionStatus, Message, Sender};

/// Output styling configuration
#[derive(Debug, Clone, Copy)]
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl OutputStyle {
    /// Style without escape codes
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        }
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg.red())
        } else {
            format!("✗ {}", msg)
        }
    }

    /// Format warning message
    pub fn warning(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "⚠".yellow(), msg)
        } else {
            format!("⚠ {}", msg)
        }
    }

    /// Format info message
    pub fn info(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "ℹ".blue(), msg)
        } else {
            format!("ℹ {}", msg)
        }
    }

    /// Secondary text (timestamps, metrics)
    pub fn dim(&self, msg: &str) -> String {
        if self.use_colors {
            msg.dimmed().to_string()
        } else {
            msg.to_string()
        }
    }

    /// Format prompt
    pub fn prompt(&self, prompt: &str) -> String {
        if self.use_colors {
            format!("{} ", prompt.magenta().bold())
        } else {
            format!("{} ", prompt)
        }
    }

    /// Format header
    pub fn header(&self, title: &str) -> String {
        if self.use_colors {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// Connection indicator line
    pub fn status(&self, status: &ConnectionStatus) -> String {
        let text = status.status_text();
        let line = if status.is_connected() {
            if self.use_colors {
                format!("{} {}", "●".green(), text)
            } else {
                format!("● {}", text)
            }
        } else if self.use_colors {
            format!("{} {}", "●".red(), text)
        } else {
            format!("○ {}", text)
        };

        if status.show_reconnect() {
            format!("{} {}", line, self.dim("(type /reconnect to retry)"))
        } else {
            line
        }
    }

    /// A thread message with its time and, for replies, the metrics line
    pub fn message(&self, message: &Message) -> String {
        let who = match message.sender {
            Sender::User => "You",
            Sender::Assistant => "Assistant",
        };
        let label = if self.use_colors {
            match message.sender {
                Sender::User => who.cyan().bold().to_string(),
                Sender::Assistant => who.green().bold().to_string(),
            }
        } else {
            who.to_string()
        };

        let mut out = format!(
            "{} {}\n{}",
            label,
            self.dim(&message.time_label()),
            message.text
        );
        if let Some(annotation) = message.annotation() {
            out.push('\n');
            out.push_str(&self.dim(&annotation));
        }
        out
    }
}
