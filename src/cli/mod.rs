//! CLI command implementations for glycowise.
//!
//! Provides subcommand handlers for:
//! - `glycowise assess`: one risk assessment from command-line metrics
//! - `glycowise chat diet|exercise`: interactive advisory chat
//! - `glycowise catalog diets|exercises|show`: browse the built-in plans
//! - `glycowise stats`: request log summary per gateway operation
//! - `glycowise health`: credential, config and log checks
//! - `glycowise config show|init|set|reset`: configuration management

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::analytics::reporter::{self, Stats};
use crate::assessment::{AssessmentFlow, FlowState, Gender, Metric, NEXT_STEPS, RiskLevel};
use crate::catalog::{Catalog, CatalogQuery, DietPlan, ExercisePlan};
use crate::chat::{ChatPanel, Role};
use crate::config::{self, GlycowiseConfig};
use crate::gateway::{Gateway, Topic};

/// Output format for listing and report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// glycowise assess
// ---------------------------------------------------------------------------

/// Run one assessment with the given overrides on top of the form defaults.
pub fn run_assess(
    gateway: &Gateway,
    values: &[(Metric, f64)],
    gender: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let mut flow = AssessmentFlow::new();
    if let Some(raw) = gender {
        let gender = Gender::parse(raw)
            .with_context(|| format!("unknown gender '{raw}' (expected male, female or other)"))?;
        flow.set_gender(gender);
    }
    for &(metric, value) in values {
        let stored = flow.set(metric, value);
        if stored != value {
            let spec = metric.spec();
            eprintln!(
                "{} {} {} adjusted to {} (range {}–{})",
                "note:".yellow(),
                spec.label,
                value,
                stored,
                spec.min,
                spec.max
            );
        }
    }

    let metrics = *flow.metrics();
    let state = flow.submit(gateway).clone();

    match (&state, format) {
        (FlowState::Succeeded(assessment), OutputFormat::Json) => {
            let value = serde_json::json!({
                "metrics": metrics,
                "prediction": assessment.result.prediction,
                "probability": assessment.result.probability,
                "risk": assessment.result.risk,
                "source": assessment.source,
                "interpretation": assessment.result.interpretation(),
                "next_steps": NEXT_STEPS,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        (FlowState::Succeeded(assessment), _) => {
            let result = &assessment.result;
            let risk = match result.risk {
                RiskLevel::Low => result.risk.as_str().green().bold(),
                RiskLevel::Moderate => result.risk.as_str().yellow().bold(),
                RiskLevel::High => result.risk.as_str().red().bold(),
            };
            println!("{}", "Diabetes Risk Assessment".bold().cyan());
            println!("{}", "=".repeat(50));
            println!("  {} {}", "Prediction: ".bold(), result.prediction);
            println!("  {} {}%", "Probability:".bold(), result.probability_pct());
            println!("  {} {}", "Risk level: ".bold(), risk);
            if assessment.source == crate::assessment::ResultSource::Fallback {
                println!(
                    "  {}",
                    "(model reply was unusable; estimated from glucose only)".dimmed()
                );
            }
            println!();
            println!("{}", "What this means".bold().cyan());
            println!("  {}", result.interpretation());
            println!();
            println!("{}", "Next steps".bold().cyan());
            for step in NEXT_STEPS {
                println!("  {} {}", "·".dimmed(), step);
            }
        }
        (FlowState::Failed(message), _) => bail!("{message}"),
        (FlowState::Editing | FlowState::Submitting, _) => {
            bail!("{}", crate::assessment::GENERIC_ERROR)
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// glycowise chat
// ---------------------------------------------------------------------------

/// Interactive chat on one topic. Reads lines from stdin until EOF or
/// `exit`; a single `message` runs one exchange and returns.
pub fn run_chat(gateway: &Gateway, topic: Topic, message: Option<&str>) -> Result<()> {
    let mut panel = ChatPanel::new(topic);

    if let Some(text) = message {
        match panel.submit(text, gateway) {
            Some(reply) => println!("{}", reply.content),
            None => bail!("message is empty"),
        }
        return Ok(());
    }

    print_message(&panel.transcript()[0].content, Role::Assistant);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", "you>".bold().cyan());
        io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("failed to read from stdin")?;
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }
        if let Some(reply) = panel.submit(&line, gateway) {
            print_message(&reply.content, reply.role);
        }
    }

    Ok(())
}

fn print_message(content: &str, role: Role) {
    match role {
        Role::Assistant => println!("{} {}\n", "assistant>".bold().green(), content),
        Role::User => println!("{} {}", "you>".bold().cyan(), content),
    }
}

// ---------------------------------------------------------------------------
// glycowise catalog
// ---------------------------------------------------------------------------

/// List diet plans matching `query`.
pub fn run_catalog_diets(catalog: &Catalog, query: &CatalogQuery, format: OutputFormat) -> Result<()> {
    let plans = catalog.filter_diets(query);

    match format {
        OutputFormat::Json => {
            let summaries: Vec<_> = plans.iter().map(|plan| plan.summary()).collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        OutputFormat::Csv => {
            println!("id,title,tags,featured");
            for plan in &plans {
                println!("{},{},{},{}", plan.id, csv_field(&plan.title), csv_field(&plan.tags.join("; ")), plan.featured);
            }
        }
        OutputFormat::Table => {
            if plans.is_empty() {
                println!("{}", "No diet plans match your filters.".yellow());
                return Ok(());
            }
            println!("{}", "Diet Plans".bold().cyan());
            println!("  {:<16} {:<28} Tags", "Id", "Title");
            println!("  {}", "-".repeat(70));
            for (i, plan) in plans.iter().enumerate() {
                let star = if plan.featured { "*" } else { " " };
                let line = format!(
                    "{} {:<16} {:<28} {}",
                    star,
                    plan.id,
                    truncate(&plan.title, 28),
                    plan.tags.join(", ")
                );
                if i % 2 == 0 {
                    println!("{line}");
                } else {
                    println!("{}", line.dimmed());
                }
            }
        }
    }
    Ok(())
}

/// List exercise plans matching `query`.
pub fn run_catalog_exercises(
    catalog: &Catalog,
    query: &CatalogQuery,
    format: OutputFormat,
) -> Result<()> {
    let plans = catalog.filter_exercises(query);

    match format {
        OutputFormat::Json => {
            let summaries: Vec<_> = plans.iter().map(|plan| plan.summary()).collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        OutputFormat::Csv => {
            println!("id,title,duration,level,category,featured");
            for plan in &plans {
                println!(
                    "{},{},{},{},{},{}",
                    plan.id,
                    csv_field(&plan.title),
                    plan.duration,
                    plan.level,
                    plan.category,
                    plan.featured
                );
            }
        }
        OutputFormat::Table => {
            if plans.is_empty() {
                println!("{}", "No exercise plans match your filters.".yellow());
                return Ok(());
            }
            println!("{}", "Exercise Plans".bold().cyan());
            println!(
                "  {:<10} {:<28} {:<12} {:<13} Category",
                "Id", "Title", "Duration", "Level"
            );
            println!("  {}", "-".repeat(76));
            for (i, plan) in plans.iter().enumerate() {
                let star = if plan.featured { "*" } else { " " };
                let line = format!(
                    "{} {:<10} {:<28} {:<12} {:<13} {}",
                    star,
                    plan.id,
                    truncate(&plan.title, 28),
                    plan.duration,
                    plan.level.as_str(),
                    plan.category
                );
                if i % 2 == 0 {
                    println!("{line}");
                } else {
                    println!("{}", line.dimmed());
                }
            }
        }
    }
    Ok(())
}

/// Show one plan in full. Diet ids are tried first, then exercise ids.
pub fn run_catalog_show(catalog: &Catalog, id: &str, format: OutputFormat) -> Result<()> {
    if let Some(plan) = catalog.diet(id) {
        if format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(plan)?);
        } else {
            print_diet(plan);
        }
        return Ok(());
    }
    if let Some(plan) = catalog.exercise(id) {
        if format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(plan)?);
        } else {
            print_exercise(plan);
        }
        return Ok(());
    }
    bail!("no diet or exercise plan with id '{id}'")
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}", title.bold().cyan());
    for item in items {
        println!("  {} {}", "·".dimmed(), item);
    }
    println!();
}

fn print_diet(plan: &DietPlan) {
    println!("{}", plan.title.bold());
    println!("{}", plan.tags.join(" · ").dimmed());
    println!();
    println!("{}", textwrap(if plan.long_description.is_empty() {
        &plan.description
    } else {
        &plan.long_description
    }));
    println!();
    print_list("Benefits", &plan.benefits);
    print_list("Foods to eat", &plan.foods_to_eat);
    print_list("Foods to avoid", &plan.foods_to_avoid);

    for day in &plan.meal_plan {
        println!("{}", day.day.bold().cyan());
        for meal in &day.meals {
            println!("  {} {}", format!("{}:", meal.kind).bold(), meal.name);
            println!("    {}", meal.description.dimmed());
            if let Some(n) = meal.nutrition {
                println!(
                    "    {}",
                    format!(
                        "{} kcal · {}g carbs · {}g protein · {}g fat",
                        n.calories, n.carbs, n.protein, n.fat
                    )
                    .dimmed()
                );
            }
        }
        println!();
    }

    print_list("Tips", &plan.tips);
    if !plan.research.is_empty() {
        println!("{}", "Research".bold().cyan());
        println!("{}", textwrap(&plan.research));
    }
}

fn print_exercise(plan: &ExercisePlan) {
    println!("{}", plan.title.bold());
    println!(
        "{}",
        format!("{} · {} · {}", plan.level, plan.category, plan.duration).dimmed()
    );
    println!();
    println!("{}", textwrap(&plan.description));
    println!();
    print_list("Goals", &plan.goals);
    print_list("Equipment", &plan.equipment);

    for day in &plan.schedule {
        println!("{} {}", format!("{}:", day.day).bold().cyan(), day.focus);
        println!(
            "  {}",
            format!(
                "{} · {:?} intensity · {}",
                day.total_duration, day.intensity, day.calories_burn
            )
            .dimmed()
        );
        println!("  {} {}", "Warm-up:".bold(), day.warmup);
        for exercise in &day.exercises {
            let mut detail = Vec::new();
            if let Some(sets) = exercise.sets {
                detail.push(format!("{sets} sets"));
            }
            if let Some(reps) = exercise.reps {
                detail.push(format!("{reps} reps"));
            }
            if let Some(duration) = &exercise.duration {
                detail.push(duration.clone());
            }
            if let Some(rest) = &exercise.rest_between {
                detail.push(format!("rest {rest}"));
            }
            println!("  {} {} {}", "·".dimmed(), exercise.name.bold(), detail.join(", ").dimmed());
            println!("    {}", exercise.description);
        }
        println!("  {} {}", "Cool-down:".bold(), day.cooldown);
        println!();
    }

    print_list("Tips", &plan.tips);
    print_list("Warnings", &plan.warnings);
}

// ---------------------------------------------------------------------------
// glycowise stats
// ---------------------------------------------------------------------------

/// Summarize the request log.
pub fn run_stats(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let cfg = config::load();
    let Some(path) = config::expand_path(&cfg.logging.path) else {
        bail!("could not resolve request log path '{}'", cfg.logging.path);
    };
    let stats = reporter::compute_stats(&path, days);

    if stats.total_requests == 0 {
        println!(
            "{}",
            "No data yet. Use the assessment or chats to see stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&stats)?,
        OutputFormat::Csv => print_stats_csv(&stats),
        OutputFormat::Table => print_stats_table(&stats),
    }

    Ok(())
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "glycowise Request Report".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();
    println!("  {} {}", "Total requests:".bold(), stats.total_requests);
    println!();

    println!(
        "  {:<16} {:>6} {:>6} {:>9} {:>7} {:>9} {:>9}",
        "Operation", "Count", "Ok", "Fallback", "Errors", "Avg ms", "Max ms"
    );
    println!("  {}", "-".repeat(68));

    for (i, op) in stats.operation_stats.iter().enumerate() {
        let line = format!(
            "  {:<16} {:>6} {:>6} {:>9} {:>7} {:>9} {:>9}",
            op.operation.as_str(),
            op.count,
            op.ok,
            op.fallback,
            op.errors,
            op.avg_latency_ms,
            op.max_latency_ms,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_stats_json(stats: &Stats) -> Result<()> {
    let value = serde_json::json!({
        "total_requests": stats.total_requests,
        "operations": stats.operation_stats.iter().map(|op| serde_json::json!({
            "operation": op.operation,
            "count": op.count,
            "ok": op.ok,
            "fallback": op.fallback,
            "errors": op.errors,
            "success_pct": op.success_pct(),
            "avg_latency_ms": op.avg_latency_ms,
            "max_latency_ms": op.max_latency_ms,
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_stats_csv(stats: &Stats) {
    println!("operation,count,ok,fallback,errors,success_pct,avg_latency_ms,max_latency_ms");
    for op in &stats.operation_stats {
        println!(
            "{},{},{},{},{},{:.1},{},{}",
            op.operation.as_str(),
            op.count,
            op.ok,
            op.fallback,
            op.errors,
            op.success_pct(),
            op.avg_latency_ms,
            op.max_latency_ms,
        );
    }
}

// ---------------------------------------------------------------------------
// glycowise health
// ---------------------------------------------------------------------------

/// Check credential, config files, catalog and request log.
pub fn run_health() -> Result<()> {
    println!("{}", "glycowise Health Check".bold().cyan());
    println!("{}", "=".repeat(50));

    let cfg: GlycowiseConfig = config::load();

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.glycowise/config.toml found"
        } else {
            "not found (run `glycowise config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".glycowise.toml found"
        } else {
            "none (optional)"
        },
    );

    let credential_ok = std::env::var(&cfg.gateway.api_key_env)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);
    print_health_item(
        "Credential",
        credential_ok,
        &if credential_ok {
            format!("{} is set", cfg.gateway.api_key_env)
        } else {
            format!("{} is not set", cfg.gateway.api_key_env)
        },
    );
    print_health_item("Endpoint", true, &cfg.gateway.endpoint);
    print_health_item("Model", true, &cfg.gateway.model);

    match Catalog::builtin() {
        Ok(catalog) => print_health_item(
            "Catalog",
            true,
            &format!(
                "{} diet plans, {} exercise plans",
                catalog.diets().len(),
                catalog.exercises().len()
            ),
        ),
        Err(e) => print_health_item("Catalog", false, &format!("{e:#}")),
    }

    let log_path = config::expand_path(&cfg.logging.path);
    let log_exists = log_path.as_ref().is_some_and(|p| p.exists());
    let log_entries = match (&log_path, log_exists) {
        (Some(path), true) => crate::analytics::logger::read_all_entries(path).len(),
        _ => 0,
    };
    print_health_item(
        "Request log",
        cfg.logging.enabled && log_exists,
        &if !cfg.logging.enabled {
            "disabled".to_string()
        } else if log_exists {
            format!("{log_entries} entries")
        } else {
            "no log file yet".to_string()
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// glycowise config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective glycowise Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.glycowise/config.toml", global_exists);
    print_source(".glycowise.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "GLYCOWISE_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.glycowise/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Wrap prose at 78 columns with a two-space indent.
fn textwrap(text: &str) -> String {
    let mut lines = Vec::new();
    let mut line = String::from(" ");
    for word in text.split_whitespace() {
        if line.len() + word.len() + 1 > 78 && line.len() > 1 {
            lines.push(std::mem::replace(&mut line, String::from(" ")));
        }
        line.push(' ');
        line.push_str(word);
    }
    if line.len() > 1 {
        lines.push(line);
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_defaults_to_table() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("xml")), OutputFormat::Table);
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Strength Training Basics", 10), "Strength …");
    }

    #[test]
    fn csv_field_quotes_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn textwrap_keeps_lines_short() {
        let text = "word ".repeat(60);
        for line in textwrap(&text).lines() {
            assert!(line.len() <= 78, "{line}");
            assert!(line.starts_with("  "));
        }
    }
}
