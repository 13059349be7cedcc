//! Help text content for the help modal

/// Keybinding help text.
pub fn get_help_text() -> Vec<String> {
    vec![
        "Form:",
        "  j/k, Up/Down   Move between fields",
        "  Enter / i      Edit the focused amount",
        "  +/-, Right/Left  Step the focused amount",
        "  Space          Include or exclude Round 2",
        "",
        "Editing:",
        "  Enter / Tab    Accept the value",
        "  Esc            Cancel",
        "  Ctrl+u         Clear the value",
        "",
        "Results:",
        "  c / F5         Calculate (and log to configured ledgers)",
        "  y              Copy results to the clipboard",
        "  p              Show the dilution curve",
        "",
        "Other:",
        "  ? / F1         Toggle this help",
        "  q / Esc        Quit",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// What the figures mean.
pub fn get_about_help() -> Vec<String> {
    vec![
        "About",
        "  Ownership: your investment / post-money valuation of Round 1.",
        "  Post-money: pre-money valuation + capital raised in the round.",
        "  Dilution: Round 2 keeps pre-money / post-money of your stake.",
        "  Target valuation: exit value at which your stake returns the fund.",
        "  Pro-rata: Round 2 investment needed to keep Round 1 ownership.",
        "  Round 2 only applies when included and both amounts are above zero.",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}
