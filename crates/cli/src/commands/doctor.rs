//! Doctor command - validate configuration and show status

use anyhow::Result;
use linkedin_connector_adapters::linkedin::person_urn;
use serde::Serialize;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    content_hub: CheckResult,
    linkedin: CheckResult,
    trigger: CheckResult,
    dedupe: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, loaded: Result<AppConfig>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        content_hub: CheckResult::error("Not checked"),
        linkedin: CheckResult::error("Not checked"),
        trigger: CheckResult::error("Not checked"),
        dedupe: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match loaded {
        Ok(c) => {
            report.config = if c.general.dry_run {
                CheckResult::warn("Configuration loaded, dry_run is on (nothing will be posted)")
            } else {
                CheckResult::ok("Configuration loaded successfully")
            };
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.content_hub = check_content_hub(config);
        report.linkedin = check_linkedin(config);
        report.trigger = check_trigger(config);
        report.dedupe = check_dedupe(config);
    }

    let checks = [
        &report.config,
        &report.content_hub,
        &report.linkedin,
        &report.trigger,
        &report.dedupe,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn env_status(env_var: &str) -> &'static str {
    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => "set",
        _ => "not set",
    }
}

fn check_content_hub(config: &AppConfig) -> CheckResult {
    let hub = &config.content_hub;

    if hub.host.trim().is_empty() {
        return CheckResult::error("No content hub host configured");
    }
    if !hub.host.starts_with("http://") && !hub.host.starts_with("https://") {
        return CheckResult::error(format!("Content hub host is not a URL: {}", hub.host));
    }
    if hub.client_id.trim().is_empty() || hub.username.trim().is_empty() {
        return CheckResult::error("Content hub client_id and username are required");
    }

    let secret = env_status(&hub.client_secret_env);
    let password = env_status(&hub.password_env);
    let message = format!(
        "Host: {}, client secret: {} ({}), password: {} ({})",
        hub.host, hub.client_secret_env, secret, hub.password_env, password
    );

    if secret == "set" && password == "set" {
        CheckResult::ok(message)
    } else {
        CheckResult::error(message)
    }
}

fn check_linkedin(config: &AppConfig) -> CheckResult {
    let linkedin = &config.linkedin;

    if linkedin.person_id.trim().is_empty() {
        return if config.general.dry_run {
            CheckResult::warn("No person_id configured (required once dry_run is off)")
        } else {
            CheckResult::error("No person_id configured")
        };
    }

    let author = person_urn(&linkedin.person_id);
    let token = env_status(&linkedin.token_env);
    let result = match (token, config.general.dry_run) {
        ("set", _) => CheckResult::ok(format!(
            "Author: {}, token: {} (set)",
            author, linkedin.token_env
        )),
        (_, true) => CheckResult::warn(format!(
            "Author: {}, token: {} (not set, dry run)",
            author, linkedin.token_env
        )),
        _ => CheckResult::error(format!(
            "Author: {}, token: {} (not set)",
            author, linkedin.token_env
        )),
    };

    result.with_details(serde_json::json!({
        "author_urn": author,
        "base_url": linkedin.base_url,
    }))
}

fn check_trigger(config: &AppConfig) -> CheckResult {
    let trigger = &config.trigger;

    if trigger.function_name.trim().is_empty() {
        return CheckResult::error("No function_name configured");
    }
    if trigger.binding.trim().is_empty() {
        return CheckResult::error("No trigger binding configured");
    }

    CheckResult::ok(format!(
        "Route: POST /{}, binding: {}, port: {}",
        trigger.function_name, trigger.binding, trigger.port
    ))
}

fn check_dedupe(config: &AppConfig) -> CheckResult {
    let dedupe = &config.dedupe;

    if !dedupe.enabled {
        return CheckResult::ok("Duplicate detection disabled");
    }

    match dedupe.backend.trim() {
        "sqlite" => CheckResult::ok(format!("SQLite delivery log: {}", dedupe.db_path.display())),
        "memory" => CheckResult::warn("In-memory delivery log does not survive restarts"),
        other => CheckResult::error(format!("Invalid dedupe backend: {}", other)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("linkedin-connector Doctor Report");
    println!("================================");
    println!();

    print_check("Config", &report.config);
    print_check("Content Hub", &report.content_hub);
    print_check("LinkedIn", &report.linkedin);
    print_check("Trigger", &report.trigger);
    print_check("Dedupe", &report.dedupe);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall != "error" {
        println!();
        println!("Ready! Try: linkedin-connector handle --dry-run --file message.json");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
