use colored::{ColoredString, Colorize};
use safebrowse_core::{DocumentReport, Settings, Tone, WebsiteAnalysisResult, WebsiteReport};

fn toned(text: &str, tone: Tone) -> ColoredString {
    match tone {
        Tone::Positive => text.bright_green().bold(),
        Tone::Warning => text.bright_yellow().bold(),
        Tone::Critical => text.bright_red().bold(),
        Tone::Neutral => text.bold(),
    }
}

pub fn progress(percent: u8) {
    eprintln!("  {} {percent:>3}%", "…".dimmed());
}

pub fn website(url: &str, result: &WebsiteAnalysisResult, settings: &Settings) {
    let report = WebsiteReport::from(result);

    println!();
    println!("{} {}", "🔎".bright_blue(), url.bright_blue().bold());
    println!("{}", toned(report.label, report.tone));
    println!("{}", report.summary);
    println!();

    let width = report
        .details
        .iter()
        .map(|row| row.label.len())
        .max()
        .unwrap_or(0);
    for row in &report.details {
        let label = format!("{:width$}", row.label);
        println!("  {}  {}", label.dimmed(), row.value);
    }

    if !report.warnings.is_empty() {
        println!();
        println!("{}", "Warnings:".bright_yellow());
        for warning in &report.warnings {
            println!("  {} {}", "⚠".bright_yellow(), warning);
        }
    }

    if result.should_block(settings) {
        println!();
        println!("{}", "⛔ Blocked by your high-risk setting".bright_red().bold());
    } else if result.should_notify(settings) {
        println!();
        println!("{}", "🔔 You would be notified about this site".bright_yellow());
    }
}

pub fn document(report: &DocumentReport) {
    println!();
    for line in report.summary.markdown_body.lines() {
        match line.strip_prefix("## ") {
            Some(heading) => println!("{}", heading.bright_blue().bold()),
            None => println!("{line}"),
        }
    }
    println!();
    println!("{}", report.disclaimer.dimmed());
}

pub fn settings(settings: &Settings) {
    let flag = |enabled: bool| {
        if enabled {
            "on".bright_green()
        } else {
            "off".dimmed()
        }
    };

    println!("{}", "Settings".bold());
    println!("  Auto scan            {}", flag(settings.auto_scan));
    println!("  Notifications        {}", flag(settings.show_notifications));
    println!("  Dark mode            {}", flag(settings.dark_mode));
    println!("  Enhanced protection  {}", flag(settings.enhanced_protection));
    println!("  Block high risk      {}", flag(settings.block_high_risk));
    match &settings.openai_api_key {
        Some(key) => println!("  OpenAI API key       {}", key.masked()),
        None => println!("  OpenAI API key       {}", "not set".dimmed()),
    }
}
