//! Doctor command - verify API keys and configuration.

use crate::cli::Output;
use crate::config::{ApiKeys, Settings, GOOGLE_API_KEY_VAR, GROQ_API_KEY_VAR};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(
    settings: &Settings,
    keys: &ApiKeys,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    Output::header("Fusion Hub Doctor");
    println!();

    let mut checks = Vec::new();

    println!("{}", style("API Keys").bold());
    let key_checks = check_keys(keys);
    for check in &key_checks {
        check.print();
    }
    checks.extend(key_checks);

    println!();

    println!("{}", style("Directories").bold());
    let dir_check = check_temp_dir(settings);
    dir_check.print();
    checks.push(dir_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Fusion Hub.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Fusion Hub is ready to use.");
    }

    Ok(())
}

/// A missing key disables only its own provider, so it is a warning unless
/// neither key is set.
fn check_keys(keys: &ApiKeys) -> Vec<CheckResult> {
    let none_set = keys.google.is_none() && keys.groq.is_none();
    let check = |var: &str, key: &Option<String>, used_by: &str| {
        let hint = format!("export {}=... or add it to a .env file", var);
        let message = format!("not set ({} unavailable)", used_by);
        match key {
            Some(_) => CheckResult::ok(var, &format!("set (used by {})", used_by)),
            None if none_set => CheckResult::error(var, &message, &hint),
            None => CheckResult::warning(var, &message, &hint),
        }
    };

    vec![
        check(GOOGLE_API_KEY_VAR, &keys.google, "Gemini, captions, audio, video"),
        check(GROQ_API_KEY_VAR, &keys.groq, "Llama"),
    ]
}

fn check_temp_dir(settings: &Settings) -> CheckResult {
    let dir = settings.temp_dir();
    match std::fs::create_dir_all(&dir) {
        Ok(()) => CheckResult::ok("Temp directory", &dir.display().to_string()),
        Err(e) => CheckResult::error(
            "Temp directory",
            &format!("{}: {}", dir.display(), e),
            "Set general.temp_dir to a writable directory",
        ),
    }
}

fn check_config_file(explicit: Option<&Path>) -> CheckResult {
    let config_path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(Settings::default_config_path);

    if !config_path.exists() {
        if explicit.is_some() {
            return CheckResult::error(
                "Config file",
                &format!("{} not found", config_path.display()),
                "Check the path passed with -c",
            );
        }
        return CheckResult::warning(
            "Config file",
            "not found (using defaults)",
            &format!("Create {} to override models and prompts", config_path.display()),
        );
    }

    match Settings::load_from(Some(&config_path)) {
        Ok(_) => CheckResult::ok("Config file", &config_path.display().to_string()),
        Err(e) => CheckResult::error(
            "Config file",
            &format!("invalid: {}", e),
            "Fix the TOML syntax or delete the file",
        ),
    }
}
