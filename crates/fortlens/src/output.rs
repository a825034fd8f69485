//! Output formatting for parsed listfiles

use eyre::Result;
use fortlens_api::{ApiEvent, ApiReport, ApiSourcePage};
use owo_colors::OwoColorize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    #[value(alias = "md")]
    Markdown,
}

/// Render a report in the specified format.
///
/// `sources` are only shown by the text and markdown formats, and only when
/// `verbose` is set.
pub fn render_report(
    report: &ApiReport,
    sources: &[ApiSourcePage],
    format: OutputFormat,
    verbose: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report, sources, verbose)),
        OutputFormat::Json => render_json(report),
        OutputFormat::Markdown => Ok(render_markdown(report, sources, verbose)),
    }
}

fn colored_code(event: &ApiEvent) -> String {
    let code = format!("{:>7}", event.code);
    match event.severity.as_str() {
        "error" => code.red().bold().to_string(),
        "overflow" => code.magenta().bold().to_string(),
        "warning" => code.yellow().to_string(),
        _ => code.cyan().to_string(),
    }
}

fn render_text(report: &ApiReport, sources: &[ApiSourcePage], verbose: bool) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("{} {}\n", "##".bold(), "Forcheck Report".cyan().bold()));
    output.push('\n');

    if let Some(run) = &report.run {
        output.push_str(&format!("{}\n", run.version_string.dimmed()));
        let status = format!("exit code {}: {}", run.exit_code, run.exit_meaning);
        if run.completed {
            output.push_str(&format!("{}\n", status));
        } else {
            output.push_str(&format!("{}\n", status.red()));
        }
        if !run.command.is_empty() {
            output.push_str(&format!("  {}\n", run.command.dimmed()));
        }
        output.push('\n');
    }

    let total: usize = report.events.iter().map(|e| e.count).sum();
    output.push_str(&format!(
        "Events: {} ({} distinct codes, {} files)\n",
        total,
        report.events.len(),
        report.files.len()
    ));
    if !report.ignored.is_empty() {
        let ignored: Vec<String> = report.ignored.iter().map(u32::to_string).collect();
        output.push_str(&format!("  Ignored: {}\n", ignored.join(", ").dimmed()));
    }
    output.push('\n');

    for event in &report.events {
        output.push_str(&format!(
            "  {} {:>5}x  {}\n",
            colored_code(event),
            event.count,
            event.message
        ));
    }
    if !report.events.is_empty() {
        output.push('\n');
    }

    if !report.totals.is_empty() {
        output.push_str("Forcheck summary:\n");
        for total in &report.totals {
            output.push_str(&format!("  number of {}: {}\n", total.label, total.count));
        }
        output.push('\n');
    }

    if report.anomaly_detected {
        output.push_str(&format!(
            "{} Anomalies ({}):\n",
            "!".red().bold(),
            report.anomalies.len()
        ));
        for anomaly in &report.anomalies {
            output.push_str(&format!("  {} {}\n", "-".red(), anomaly.description));
        }
        output.push('\n');
    }

    if verbose {
        for page in sources {
            output.push_str(&format!("{}\n", page.file.green()));
            for line in &page.lines {
                for callout in &line.callouts {
                    output.push_str(&format!(
                        "  {:>6}  [{}] {}: {}\n",
                        line.line.to_string().dimmed(),
                        callout.label,
                        callout.culprit,
                        callout.message
                    ));
                }
            }
            output.push('\n');
        }
    }

    output
}

fn render_json(report: &ApiReport) -> Result<String> {
    facet_json::to_string_pretty(report)
        .map_err(|e| eyre::eyre!("JSON serialization failed: {}", e))
}

fn render_markdown(report: &ApiReport, sources: &[ApiSourcePage], verbose: bool) -> String {
    let mut output = String::new();

    output.push_str("# Forcheck Report\n\n");

    if let Some(run) = &report.run {
        output.push_str(&format!(
            "**{}**, exit code {}: {}\n\n",
            run.version_string, run.exit_code, run.exit_meaning
        ));
    }

    if !report.events.is_empty() {
        output.push_str("| Code | Count | Message |\n");
        output.push_str("|------|------:|---------|\n");
        for event in &report.events {
            output.push_str(&format!(
                "| [`{}`]({}) | {} | {} |\n",
                event.code,
                event.link,
                event.count,
                event.message.replace('|', "\\|")
            ));
        }
        output.push('\n');
    }

    if !report.totals.is_empty() {
        output.push_str("## Forcheck Summary\n\n");
        for total in &report.totals {
            output.push_str(&format!("- number of {}: {}\n", total.label, total.count));
        }
        output.push('\n');
    }

    if report.anomaly_detected {
        output.push_str("## Anomalies\n\n");
        for anomaly in &report.anomalies {
            output.push_str(&format!("- `{}`: {}\n", anomaly.kind, anomaly.description));
        }
        output.push('\n');
    }

    if verbose && !sources.is_empty() {
        output.push_str("## Files\n\n");
        for page in sources {
            output.push_str(&format!("### [`{}`]({})\n\n", page.file, page.path));
            for line in &page.lines {
                for callout in &line.callouts {
                    output.push_str(&format!(
                        "- line {}: `[{}]` {}: {}\n",
                        line.line, callout.label, callout.culprit, callout.message
                    ));
                }
            }
            output.push('\n');
        }
    }

    output
}
