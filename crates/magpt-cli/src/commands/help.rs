//! Help text

use magpt_config::SettingKey;

use crate::output::OutputStyle;

const COMMANDS: [(&str, &str); 8] = [
    ("/settings", "Show current settings"),
    ("/set <setting> <value>", "Change a setting (applied and saved at once)"),
    ("/models", "List the models the server offers"),
    ("/reconnect", "Check the connection now"),
    ("/copy <n>", "Copy message number n to the clipboard"),
    ("/status", "Show connection and model status"),
    ("/help", "Show this help"),
    ("/quit", "Leave magpt"),
];

/// Render the help screen
pub fn render(style: &OutputStyle) -> String {
    let mut out = String::new();
    out.push_str(&style.header("Commands"));
    out.push('\n');
    for (usage, summary) in COMMANDS {
        out.push_str(&format!("  {:<24} {}\n", usage, summary));
    }

    out.push('\n');
    out.push_str(&style.header("Settings"));
    out.push('\n');
    let names: Vec<&str> = SettingKey::ALL.iter().map(SettingKey::name).collect();
    out.push_str(&format!("  {}\n", names.join(", ")));
    out.push_str(&style.dim("  Use `/set model default` to go back to the server's model."));
    out.push('\n');
    out.push_str(&style.dim("  Anything else you type is sent as a message."));
    out
}
