mod commands;
mod logging;
mod progress;
mod prompt;

use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{AuditArgs, Cli, Commands, SetArgs, SetTagsArgs, SetTypesArgs};
use dotenv::dotenv;
use progress::CliReporter;
use prompt::PromptGate;
use realta_core::config::load_configuration;
use realta_core::engine::{AuditResult, SessionEngine};
use realta_core::report::{AuditWriter, TypeReportWriter};
use realta_core::type_map::TypeMapping;
use realta_core::xnat::cache::clear_cache;
use realta_core::xnat::{CachedSource, FieldUpdate, FieldWriter, ScanSource, XnatClient};
use realta_core::{apply_note_plan, AppConfig, AutoConfirm, ConfirmGate, RuleTable, Verdict};
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let outcome = match args.command {
        Some(Commands::Audit(args)) => run_audit(&config, &args),
        Some(Commands::SetTags(args)) => run_set_tags(&config, &args),
        Some(Commands::SetTypes(args)) => run_set_types(&config, &args),
        Some(Commands::Set(args)) => run_set(&config, &args),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        Some(Commands::ClearCache) => run_clear_cache(&config),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run_audit(config: &AppConfig, args: &AuditArgs) -> anyhow::Result<()> {
    let rules = load_rules(config, args.rules.as_deref())?;
    let client = XnatClient::new(config.alias(&args.xnat.xnat)?)?;
    let source = scan_source(&client, config, args.cache);
    let engine = SessionEngine::new(source.as_ref()).with_rules(rules);

    let experiments =
        engine.resolve_sessions(args.session.as_deref(), args.xnat.project.as_deref())?;

    let reporter = CliReporter::new();
    let mut out = AuditWriter::new(io::stdout().lock(), args.hide)?;
    let result = engine.audit(&experiments, &mut out, &reporter)?;
    out.flush()?;

    print_verdict_summary(&result);
    Ok(())
}

fn run_set_tags(config: &AppConfig, args: &SetTagsArgs) -> anyhow::Result<()> {
    let rules = load_rules(config, args.rules.as_deref())?;
    let client = XnatClient::new(config.alias(&args.xnat.xnat)?)?;
    let source = scan_source(&client, config, args.cache);
    let engine = SessionEngine::new(source.as_ref()).with_rules(rules);

    let experiment = engine.resolve_session(&args.session, args.xnat.project.as_deref())?;
    let plan = engine.classify_session(&experiment)?.plan_note_updates()?;
    info!(
        "{} note updates planned for {}, {} scans already tagged",
        format!("{}", plan.updates.len()).cyan(),
        experiment.label,
        plan.already_tagged
    );

    if let Some(path) = &args.output_file {
        let json = serde_json::to_string_pretty(&plan.updates)?;
        fs::write(path, json)
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!("Wrote planned updates to {}", path.display());
    }

    if !args.do_updates {
        for update in &plan.updates {
            info!("would set note for {} to \"{}\"", update.locator, update.note);
        }
        info!("Dry run, pass --do-updates to write");
        return Ok(());
    }

    let gate = confirm_gate(args.confirm);
    let reporter = CliReporter::new();
    let result = apply_note_plan(&plan, &client, gate.as_ref(), &reporter)?;
    info!(
        "{} notes written, {} declined in {}",
        format!("{}", result.written).green(),
        format!("{}", result.declined).yellow(),
        format!("{:.2}s", result.duration.as_secs_f64()).green(),
    );
    Ok(())
}

fn run_set_types(config: &AppConfig, args: &SetTypesArgs) -> anyhow::Result<()> {
    let mapping_path = args.mapping.as_deref().unwrap_or(&config.types_path);
    let mapping = TypeMapping::load(mapping_path)?;

    let client = XnatClient::new(config.alias(&args.xnat.xnat)?)?;
    let source = scan_source(&client, config, args.cache);
    let engine = SessionEngine::new(source.as_ref());
    let experiments =
        engine.resolve_sessions(args.session.as_deref(), args.xnat.project.as_deref())?;

    let gate = confirm_gate(args.confirm);
    let target: (&dyn FieldWriter, &dyn ConfirmGate) = (&client, gate.as_ref());
    let writer = if args.do_updates { Some(target) } else { None };

    let reporter = CliReporter::new();
    let mut out = TypeReportWriter::new(io::stdout().lock())?;
    let result = engine.sync_types(&experiments, &mapping, &mut out, writer, &reporter)?;
    out.flush()?;

    info!(
        "{} type mismatches in {} sessions, {} written, {} declined",
        format!("{}", result.mismatches).red(),
        result.sessions,
        format!("{}", result.written).green(),
        format!("{}", result.declined).yellow(),
    );
    Ok(())
}

fn run_set(config: &AppConfig, args: &SetArgs) -> anyhow::Result<()> {
    let update = FieldUpdate::new(args.field, &args.value)?;

    let client = XnatClient::new(config.alias(&args.xnat.xnat)?)?;
    let engine = SessionEngine::new(&client);
    let experiment = engine.resolve_session(&args.session, args.xnat.project.as_deref())?;
    let target = experiment.locator(&args.scan);

    if !args.do_updates {
        info!(
            "would set {} of {} to \"{}\", pass --do-updates to write",
            update.field(),
            target,
            update.value()
        );
        return Ok(());
    }

    client.set_field(&target, &update)?;
    eprintln!(
        "  {} {} {} = \"{}\"",
        "✓".green(),
        target,
        update.field(),
        update.value()
    );
    Ok(())
}

fn run_clear_cache(config: &AppConfig) -> anyhow::Result<()> {
    let removed = clear_cache(&config.cache_dir)
        .with_context(|| format!("cannot clear {}", config.cache_dir.display()))?;
    println!("{} cached listings removed", removed);
    Ok(())
}

fn load_rules(config: &AppConfig, path: Option<&Path>) -> anyhow::Result<RuleTable> {
    let path = path.unwrap_or(&config.rules_path);
    let rules = RuleTable::load(path)?;
    info!("Loaded {} tag rules from {}", rules.len(), path.display());
    Ok(rules)
}

fn scan_source<'a>(client: &'a XnatClient, config: &AppConfig, cache: bool) -> Box<dyn ScanSource + 'a> {
    if cache {
        Box::new(CachedSource::new(client, config.cache_dir.clone()))
    } else {
        Box::new(client)
    }
}

fn confirm_gate(confirm: bool) -> Box<dyn ConfirmGate> {
    if confirm {
        Box::new(PromptGate)
    } else {
        Box::new(AutoConfirm)
    }
}

fn print_verdict_summary(result: &AuditResult) {
    eprintln!();
    info!(
        "{} sessions audited, {} rows written in {}",
        format!("{}", result.sessions).cyan(),
        result.rows_written,
        format!("{:.2}s", result.duration.as_secs_f64()).green(),
    );
    for (verdict, count) in &result.verdicts {
        let label = match verdict {
            Verdict::Ok => verdict.as_str().green(),
            Verdict::SetTag => verdict.as_str().cyan(),
            Verdict::Ambiguous | Verdict::AmbiguousSubset => verdict.as_str().yellow(),
            Verdict::Mismatch | Verdict::MismatchSubset => verdict.as_str().red(),
            Verdict::NoMatchFound => verdict.as_str().normal(),
        };
        eprintln!("  {:>18} {}", label, count);
    }
}
