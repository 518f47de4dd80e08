//! Resolve command - look up artifacts across repositories

use crate::cli::args::{OutputFormat, ResolveArgs};
use crate::config::Config;
use crate::error::{ReprobeError, ReprobeResult};
use crate::fetch::create_fetcher;
use crate::resolve::{ResolutionOutcome, ResolutionReport, Resolver};
use crate::session::{Session, SessionSummary};
use console::style;
use serde_json::json;
use tracing::debug;

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &Config) -> ReprobeResult<()> {
    let repositories = if args.repositories.is_empty() {
        config.repositories()?
    } else {
        debug!("Using {} repositories from --repo", args.repositories.len());
        args.repositories
    };

    let mut resolver_config = config.resolver.clone();
    if let Some(workers) = args.workers {
        resolver_config.workers = workers;
    }
    if args.no_cache_not_found {
        resolver_config.cache_not_found = false;
    }

    let session = Session::new(repositories, resolver_config.cache_policy())?;
    let resolver = Resolver::new(create_fetcher(&config.fetch), resolver_config);

    let report = resolver.resolve_all(&session, &args.coordinates).await?;
    let summary = session.end();

    match args.format {
        OutputFormat::Table => print_table(&report, &summary),
        OutputFormat::Json => print_json(&report, &summary)?,
        OutputFormat::Plain => print_plain(&report),
    }

    let missing = report.unresolved().len();
    if missing > 0 {
        return Err(ReprobeError::User(format!(
            "{} of {} coordinates unresolved",
            missing,
            report.len()
        )));
    }

    Ok(())
}

fn print_table(report: &ResolutionReport, summary: &SessionSummary) {
    println!(
        "{:<48} {:<12} {:<14} {:<10}",
        style("COORDINATE").bold(),
        style("STATUS").bold(),
        style("REPOSITORY").bold(),
        style("SHA256").bold()
    );
    println!("{}", "-".repeat(86));

    for (coordinate, outcome) in report.iter() {
        match outcome {
            ResolutionOutcome::Found(handle) => println!(
                "{:<48} {:<12} {:<14} {:<10}",
                coordinate.to_string(),
                style("found").green(),
                handle.repository().as_str(),
                &handle.sha256()[..10]
            ),
            ResolutionOutcome::Unresolved => println!(
                "{:<48} {:<12} {:<14} {:<10}",
                coordinate.to_string(),
                style("unresolved").red(),
                "-",
                "-"
            ),
        }
    }

    println!();
    println!(
        "{}/{} resolved, {} fetches, {} cache hits",
        report.resolved_count(),
        report.len(),
        report.fetches(),
        summary.cache.hits
    );
}

fn print_json(report: &ResolutionReport, summary: &SessionSummary) -> ReprobeResult<()> {
    let artifacts: Vec<_> = report
        .iter()
        .map(|(coordinate, outcome)| match outcome {
            ResolutionOutcome::Found(handle) => json!({
                "coordinate": coordinate,
                "status": "found",
                "repository": handle.repository().as_str(),
                "path": coordinate.layout_path(),
                "size": handle.len(),
                "sha256": handle.sha256(),
            }),
            ResolutionOutcome::Unresolved => json!({
                "coordinate": coordinate,
                "status": "unresolved",
            }),
        })
        .collect();

    let output = json!({
        "artifacts": artifacts,
        "fetches": report.fetches(),
        "session": summary,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_plain(report: &ResolutionReport) {
    for (coordinate, outcome) in report.iter() {
        match outcome.handle() {
            Some(handle) => println!("{} {}", coordinate, handle.repository()),
            None => println!("{} -", coordinate),
        }
    }
}
