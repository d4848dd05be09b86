use colored::Colorize;
use declarative::ApplyResult;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a step indicator
pub fn step(num: usize, total: usize, msg: &str) {
    println!("{} {}", format!("[{num}/{total}]").blue().bold(), msg);
}

/// One-word label for a step outcome
pub fn result_label(result: &ApplyResult) -> &'static str {
    match result {
        ApplyResult::Created => "created",
        ApplyResult::Modified => "modified",
        ApplyResult::Removed => "removed",
        ApplyResult::Failed { .. } => "failed",
        ApplyResult::Skipped { .. } => "skipped",
    }
}

/// Colored symbol for a plan kind, as shown by `diff`
pub fn kind_symbol(kind: &str) -> String {
    match kind {
        "create" | "master-create" => "+".green().to_string(),
        "delete" | "master-delete" | "op-remove" => "-".red().to_string(),
        _ => "~".yellow().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_label() {
        assert_eq!(result_label(&ApplyResult::Created), "created");
        assert_eq!(
            result_label(&ApplyResult::Failed {
                error: "exit status 1".into()
            }),
            "failed"
        );
        assert_eq!(
            result_label(&ApplyResult::Skipped {
                reason: "Dry run".into()
            }),
            "skipped"
        );
    }

    #[test]
    fn test_kind_symbol() {
        colored::control::set_override(false);
        assert_eq!(kind_symbol("create"), "+");
        assert_eq!(kind_symbol("master-delete"), "-");
        assert_eq!(kind_symbol("op-remove"), "-");
        assert_eq!(kind_symbol("update"), "~");
        assert_eq!(kind_symbol("master-update"), "~");
    }
}
