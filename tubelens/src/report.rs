//! tubelens-report - Channel analytics report
//!
//! Runs every analyzer over the stored records and prints the result as
//! terminal text, markdown or JSON.

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use clap::Parser;
use tubelens_core::analytics::{
    describe_days, generate_report, Analysis, ChannelReport, ForecastResult, ReportOptions,
};
use tubelens_core::format::{
    format_compact, format_delta, format_hour_24h, format_hour_ampm, format_relative_time,
};
use tubelens_core::{day_name, ChannelStats, Config, Database};

#[derive(Parser, Debug)]
#[command(name = "tubelens-report")]
#[command(about = "Analyze a YouTube channel's publish history")]
#[command(version)]
struct Args {
    /// Forecast horizon in days (default from config)
    #[arg(long)]
    days: Option<u32>,

    /// Weeks of content calendar to plan (default from config)
    #[arg(long)]
    weeks: Option<u32>,

    /// Videos per week in the calendar (default from config)
    #[arg(long)]
    per_week: Option<u32>,

    /// Timezone label for publish times (e.g. "US/Eastern")
    #[arg(long)]
    timezone: Option<String>,

    /// Only analyze videos published on or after this date (YYYY-MM-DD)
    #[arg(long)]
    since: Option<NaiveDate>,

    /// Export format: md or json
    #[arg(long)]
    export: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = tubelens_core::logging::init(&config.logging).ok();

    let db_path = Config::database_path();
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let now = Utc::now();
    let records = match args.since {
        Some(since) => {
            let start = Utc.from_utc_datetime(&since.and_time(chrono::NaiveTime::MIN));
            db.load_records_between(start, now + chrono::Duration::days(1))
        }
        None => db.load_records(),
    }
    .context("failed to load records")?;

    if records.is_empty() {
        println!("No videos in the database. Run tubelens-import first.");
        return Ok(());
    }
    if let (Some(first), Some(last)) = (records.first_published(), records.last_published()) {
        tracing::info!(
            videos = records.len(),
            first = %first.date_naive(),
            last = %last.date_naive(),
            "Loaded records"
        );
    }

    let mut options = ReportOptions::from_config(&config.analytics, now);
    if let Some(days) = args.days {
        options.forecast_days = days;
    }
    if let Some(weeks) = args.weeks {
        options.calendar_weeks = weeks;
    }
    if let Some(per_week) = args.per_week {
        options.videos_per_week = per_week;
    }
    if args.timezone.is_some() {
        options.timezone = args.timezone.clone();
    }

    let report = generate_report(&records, &options);

    let channel_id = config.channel.channel_id.as_deref().unwrap_or("local");
    let channel = db
        .get_channel_stats(channel_id)
        .context("failed to load channel stats")?;

    match args.export.as_deref() {
        Some("json") => print_json(&report)?,
        Some("md") => print_markdown(&report, channel.as_ref()),
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", other),
        None => print_terminal(&report, channel.as_ref()),
    }

    Ok(())
}

// ============================================
// Terminal
// ============================================

fn print_terminal(report: &ChannelReport, channel: Option<&ChannelStats>) {
    let s = &report.summary;

    println!();
    match channel {
        Some(c) => println!(
            "  {} - channel report (stats updated {})",
            c.channel_name,
            format_relative_time(c.fetched_at)
        ),
        None => println!("  Channel report"),
    }
    println!(
        "  {} videos, times in {}",
        report.video_count, report.timezone.timezone_display
    );
    if report.statistically_weak {
        println!("  Warning: few videos; rankings below may be noise");
    }
    println!();

    println!("  Totals");
    println!("    Views:        {}", format_compact(s.total_views as f64));
    println!("    Likes:        {}", format_compact(s.total_likes as f64));
    println!("    Comments:     {}", format_compact(s.total_comments as f64));
    println!("    Watch time:   {:.1}h", s.total_watch_time_hours);
    println!("    Avg views:    {}", format_compact(s.avg_views));
    println!("    Engagement:   {:.2}%", s.avg_engagement_rate);
    let ctr_note = if s.ctr_estimated { " (estimated)" } else { "" };
    println!("    CTR:          {:.2}%{}", s.avg_ctr, ctr_note);
    println!();

    if !report.top_videos.is_empty() {
        println!("  Top videos");
        for (i, v) in report.top_videos.iter().enumerate() {
            println!(
                "    {}. {} ({} views)",
                i + 1,
                v.title,
                format_compact(v.views as f64)
            );
        }
        println!();
    }

    println!("  Best time to post");
    match &report.schedule.best_days {
        Analysis::Ready { value } => {
            println!("    Day:  {}", day_name(value.best_day_for_views));
            println!("          {}", value.recommendation);
        }
        Analysis::Insufficient { reason } => println!("    Day:  n/a ({})", reason),
    }
    match &report.schedule.best_hours {
        Analysis::Ready { value } => {
            println!("    Hour: {}", format_hour_ampm(value.best_hour_for_views));
            println!("          {}", value.recommendation);
        }
        Analysis::Insufficient { reason } => println!("    Hour: n/a ({})", reason),
    }
    println!();

    println!("  Forecast");
    print_forecast_line("Views", &report.forecasts.views_forecast);
    print_forecast_line("Subscribers", &report.forecasts.subscribers_forecast);
    print_forecast_line("Engagement", &report.forecasts.engagement_forecast);
    if let Some(growth) = report.forecasts.growth_trajectory.value() {
        println!(
            "    Trend: {} (views {}, engagement {})",
            growth.trend.as_str(),
            format_delta(growth.views_growth_percentage),
            format_delta(growth.engagement_growth_percentage)
        );
    }
    println!();

    if !report.patterns.title_patterns.is_empty() {
        println!("  Title patterns");
        for p in report.patterns.title_patterns.iter().take(5) {
            println!(
                "    {:<12} {} ({} confidence)",
                p.feature.as_str(),
                format_delta(p.improvement_percentage),
                p.confidence.as_str()
            );
        }
        println!();
    }

    if let Some(consistency) = report.patterns.upload_consistency.value() {
        println!("  Upload consistency");
        println!(
            "    Every {:.1} days (±{:.1}): {}",
            consistency.avg_days_between_uploads,
            consistency.std_days_between_uploads,
            consistency.consistency.as_str()
        );
        println!();
    }

    if let Some(calendar) = report.calendar.value() {
        println!(
            "  Content calendar ({} at {})",
            describe_days(&calendar.posting_days),
            format_hour_ampm(calendar.posting_hour)
        );
        for slot in &calendar.slots {
            println!(
                "    {}  {:<18} {}",
                slot.date_formatted,
                slot.content_type.as_str(),
                slot.title_suggestion
            );
        }
        println!();
    }

    if !report.content_gaps.is_empty() {
        println!("  Gaps");
        for gap in &report.content_gaps {
            println!("    - {}", gap.description);
            println!("      {}", gap.recommendation);
        }
        println!();
    }

    if report.reach_estimated {
        println!("  Note: some impressions were estimated from views");
    }
}

fn print_forecast_line(label: &str, forecast: &Analysis<ForecastResult>) {
    match forecast {
        Analysis::Ready { value } => println!(
            "    {:<12} {} over {} days ({}/day, {} model)",
            label,
            format_compact(value.total),
            value.horizon_days,
            format_compact(value.daily_average),
            value.model.kind.as_str()
        ),
        Analysis::Insufficient { reason } => println!("    {:<12} n/a ({})", label, reason),
    }
}

// ============================================
// Markdown
// ============================================

fn print_markdown(report: &ChannelReport, channel: Option<&ChannelStats>) {
    let s = &report.summary;
    let title = channel
        .map(|c| c.channel_name.as_str())
        .unwrap_or("Channel");

    println!("# {} Report", title);
    println!();
    println!(
        "*{} videos, generated {}. Times in {}.*",
        report.video_count,
        report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        report.timezone.timezone_display
    );
    if report.statistically_weak {
        println!();
        println!("> Few videos analyzed; treat rankings as indicative only.");
    }
    println!();

    println!("## Summary");
    println!();
    println!("| Metric | Value |");
    println!("|--------|-------|");
    println!("| Total views | {} |", s.total_views);
    println!("| Total likes | {} |", s.total_likes);
    println!("| Total comments | {} |", s.total_comments);
    println!("| Avg views | {:.0} |", s.avg_views);
    println!("| Avg engagement | {:.2}% |", s.avg_engagement_rate);
    println!("| Avg CTR | {:.2}% |", s.avg_ctr);
    println!("| Watch time | {:.1}h |", s.total_watch_time_hours);
    println!("| Subscribers gained | {} |", s.total_subscribers);
    println!();

    if !report.top_videos.is_empty() {
        println!("## Top Videos");
        println!();
        println!("| # | Title | Views | Engagement |");
        println!("|---|-------|-------|------------|");
        for (i, v) in report.top_videos.iter().enumerate() {
            println!(
                "| {} | {} | {} | {:.2}% |",
                i + 1,
                v.title,
                v.views,
                v.engagement_rate
            );
        }
        println!();
    }

    if !report.monthly.is_empty() {
        println!("## Monthly");
        println!();
        println!("| Month | Videos | Views | Avg engagement |");
        println!("|-------|--------|-------|----------------|");
        for m in &report.monthly {
            println!(
                "| {} | {} | {} | {:.2}% |",
                m.label, m.video_count, m.total_views, m.avg_engagement
            );
        }
        println!();
    }

    println!("## Best Time to Post");
    println!();
    match &report.schedule.best_days {
        Analysis::Ready { value } => println!("- **Day:** {}", value.recommendation),
        Analysis::Insufficient { reason } => println!("- **Day:** {}", reason),
    }
    match &report.schedule.best_hours {
        Analysis::Ready { value } => println!("- **Hour:** {}", value.recommendation),
        Analysis::Insufficient { reason } => println!("- **Hour:** {}", reason),
    }
    if let Some(frequency) = report.schedule.upload_frequency.value() {
        println!("- **Frequency:** {}", frequency.recommendation);
    }
    if let Some(seasonal) = report.schedule.seasonal_patterns.value() {
        println!("- **Best month:** {}", seasonal.best_month);
    }
    println!();

    println!("## Forecast");
    println!();
    println!("| Metric | Total | Per day | Model |");
    println!("|--------|-------|---------|-------|");
    for (label, forecast) in [
        ("Views", &report.forecasts.views_forecast),
        ("Subscribers", &report.forecasts.subscribers_forecast),
        ("Engagement", &report.forecasts.engagement_forecast),
    ] {
        match forecast {
            Analysis::Ready { value } => println!(
                "| {} | {:.0} | {:.1} | {} |",
                label,
                value.total,
                value.daily_average,
                value.model.kind.as_str()
            ),
            Analysis::Insufficient { reason } => println!("| {} | - | - | {} |", label, reason),
        }
    }
    println!();
    if let Some(growth) = report.forecasts.growth_trajectory.value() {
        println!(
            "**Trend:** {} ({} views). {}",
            growth.trend.as_str(),
            format_delta(growth.views_growth_percentage),
            growth.recommendation
        );
        println!();
    }

    if !report.patterns.title_patterns.is_empty() {
        println!("## Title Patterns");
        println!();
        for p in &report.patterns.title_patterns {
            println!("- {}", p.recommendation);
        }
        println!();
    }

    if !report.patterns.content_themes.is_empty() {
        println!("## Themes");
        println!();
        for theme in &report.patterns.content_themes {
            println!(
                "- **{}** - {} videos, {:.0} avg views ({})",
                theme.theme,
                theme.count,
                theme.avg_views,
                theme.performance.as_str()
            );
        }
        println!();
    }

    if let Some(calendar) = report.calendar.value() {
        println!("## Content Calendar");
        println!();
        println!("| Week | Date | Time | Type | Title idea |");
        println!("|------|------|------|------|------------|");
        for slot in &calendar.slots {
            println!(
                "| {} | {} | {} | {} | {} |",
                slot.week,
                slot.date_formatted,
                format_hour_24h(slot.time_24h),
                slot.content_type.as_str(),
                slot.title_suggestion
            );
        }
        println!();
    }

    println!("---");
    println!("*Generated by tubelens-report*");
}

// ============================================
// JSON
// ============================================

fn print_json(report: &ChannelReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
