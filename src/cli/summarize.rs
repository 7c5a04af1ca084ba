use anyhow::{Context, Result};
use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use super::args::{Args, OutputFormat};
use crate::budget::BpeCounter;
use crate::config::Config;
use crate::emit::{render_markdown, RunReport};
use crate::fetch::create_fetcher;
use crate::llm::create_gateway;
use crate::summarize::{build_context, PreparedContext, Summarizer, SummaryOutcome};
use crate::types::RepoIdentity;

static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "");
static LOCK: Emoji<'_, '_> = Emoji("🔒 ", "");
static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "");

pub async fn run_summarize(args: &Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    let repo = RepoIdentity::parse(&args.repository)?;
    let fetcher = create_fetcher(&repo, &config.github)?;
    let label = repo.to_string();

    if args.context_only {
        let counter = BpeCounter::new(config.budget.tokenizer);
        let pb = spinner(format!("{}Building context for {}...", PACKAGE, label));
        let context = build_context(&repo, fetcher.as_ref(), &config, &counter).await;
        pb.finish_and_clear();
        let context = context?;

        let rendered = match args.format {
            OutputFormat::Json => RunReport::from_context(&label, &context).to_json(),
            OutputFormat::Text | OutputFormat::Markdown => context.package.payload.clone(),
        };
        write_output(args.output.as_deref(), &rendered)?;
        if args.output.is_some() || args.format == OutputFormat::Text {
            print_context_stats(&context);
        }
        return Ok(());
    }

    let gateway = create_gateway(&config.llm)?;
    let summarizer = Summarizer::new(config, fetcher, gateway)?;

    let pb = spinner(format!("{}Summarizing {}...", PACKAGE, label));
    let outcome = summarizer.summarize(&repo).await;
    pb.finish_and_clear();
    let outcome = outcome?;

    match args.format {
        OutputFormat::Json => {
            write_output(args.output.as_deref(), &RunReport::from_outcome(&label, &outcome).to_json())?
        }
        OutputFormat::Markdown => {
            write_output(args.output.as_deref(), &render_markdown(&label, &outcome))?
        }
        OutputFormat::Text => match args.output.as_deref() {
            Some(path) => write_output(Some(path), &render_markdown(&label, &outcome))?,
            None => print_outcome(&label, &outcome),
        },
    }

    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(template);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("cannot write {}", path.display()))?;
            eprintln!("{}Wrote {}", SUCCESS, style(path.display()).green());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn print_context_stats(context: &PreparedContext) {
    let package = &context.package;
    eprintln!(
        "\n{}Context: {} / {} tokens across {} ranked files",
        INFO,
        style(package.total_tokens).cyan(),
        context.plan.total,
        style(context.ranked.len()).green()
    );
    if package.multi_pass {
        eprintln!(
            "  Source content ({} tokens) would need multi-pass summarization",
            style(context.source_tokens).yellow()
        );
    }
    if package.redaction_count() > 0 {
        eprintln!(
            "{}{} secret(s) redacted",
            LOCK,
            style(package.redaction_count()).yellow()
        );
    }
}

fn print_outcome(label: &str, outcome: &SummaryOutcome) {
    let result = &outcome.result;

    println!("\n{}{}\n", SUCCESS, style(label).bold());
    println!("{}", result.summary);

    if !result.technologies.is_empty() {
        println!("\n{}", style("Technologies").cyan().bold());
        for tech in &result.technologies {
            println!("  - {}", tech);
        }
    }
    if !result.structure.is_empty() {
        println!("\n{}", style("Structure").cyan().bold());
        println!("  {}", result.structure);
    }

    let package = &outcome.context.package;
    println!(
        "\n{}",
        style(format!(
            "{} of {} tokens, {}, {} call(s) to {}",
            package.total_tokens,
            outcome.context.plan.total,
            outcome.mode.as_str(),
            outcome.model_calls,
            outcome.model
        ))
        .dim()
    );
    if package.redaction_count() > 0 {
        println!(
            "{}{}",
            LOCK,
            style(format!("{} secret(s) redacted", package.redaction_count())).dim()
        );
    }
    if !package.omitted_files.is_empty() {
        println!(
            "{}",
            style(format!(
                "{} file(s) did not fit the budget",
                package.omitted_files.len()
            ))
            .dim()
        );
    }
}
