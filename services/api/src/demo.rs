use crate::infra::{parse_date, service_over};
use chrono::{Local, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Args;
use dca_desk::config::{TriageConfig, DEFAULT_TREND_MONTHS, MAX_TREND_MONTHS};
use dca_desk::error::AppError;
use dca_desk::workflows::cases::{
    agencies_from_path, Case, CaseFilter, CaseImporter, NewCase, Page,
};
use dca_desk::workflows::portfolio::{
    DemoPortfolio, PortfolioSnapshot, PortfolioSummary, DEFAULT_DEMO_CASES, DEFAULT_DEMO_SEED,
};
use dca_desk::workflows::triage::{PriorityLabel, TriageEngine};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Case export (CSV) to summarise
    #[arg(long)]
    pub(crate) cases: PathBuf,
    /// Agency roster export (CSV)
    #[arg(long)]
    pub(crate) agencies: Option<PathBuf>,
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Months in the recovery trend
    #[arg(long)]
    pub(crate) months: Option<u32>,
    /// Trained model artifact used to fill missing triage columns
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of synthetic cases to generate
    #[arg(long, default_value_t = DEFAULT_DEMO_CASES)]
    pub(crate) cases: usize,
    /// Seed for the synthetic portfolio
    #[arg(long, default_value_t = DEFAULT_DEMO_SEED)]
    pub(crate) seed: u64,
    /// Months in the recovery trend
    #[arg(long)]
    pub(crate) months: Option<u32>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        cases,
        agencies,
        as_of,
        months,
        model,
    } = args;

    let months = trend_months(months)?;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let engine = TriageEngine::from_config(&TriageConfig { model_path: model });

    let imported = CaseImporter::new(&engine, end_of_day(as_of)).cases_from_path(&cases)?;
    let roster = match agencies {
        Some(path) => agencies_from_path(path)?,
        None => Vec::new(),
    };

    println!("Portfolio report for {}", cases.display());
    let snapshot = PortfolioSnapshot::new(imported, roster);
    render_summary(&snapshot.summary(as_of, months), as_of);
    render_top_cases(&snapshot.cases, 5);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        cases,
        seed,
        months,
    } = args;

    let months = trend_months(months)?;
    let now = Utc::now();
    let store = DemoPortfolio::generate(cases, seed, now).into_store()?;
    let engine = Arc::new(TriageEngine::rule_based());
    let service = service_over(store, engine);

    println!("DCA desk demo ({cases} synthetic cases, seed {seed})");

    let intake = NewCase {
        customer_name: "Northwind Traders".to_string(),
        amount: 64_500.0,
        overdue_days: 45,
        customer_segment: Some("premium".to_string()),
        previous_defaults: Some(1),
    };
    let opened = service.create(intake, now).map_err(demo_step)?;
    println!(
        "\nOpened {} for {}: {} priority, {:.0}% expected recovery",
        opened.id,
        opened.customer_name,
        opened.priority,
        opened.recovery_probability.unwrap_or_default() * 100.0
    );

    let allocated = service
        .allocate(&opened.id, "DCA Alpha", now)
        .map_err(demo_step)?;
    let rescored = service.rescore(&allocated.id, now).map_err(demo_step)?;
    println!(
        "Allocated to {} ({}); rescored recovery {:.0}%",
        rescored.assigned_agency.as_deref().unwrap_or("-"),
        rescored.status,
        rescored.recovery_probability.unwrap_or_default() * 100.0
    );

    let sla = service.register_sla(&rescored.id).map_err(demo_step)?;
    println!(
        "SLA deadline {} ({})",
        sla.deadline.format("%Y-%m-%d"),
        if sla.is_breached { "breached" } else { "on track" }
    );

    let high_priority = service
        .list(
            CaseFilter {
                priority: Some(PriorityLabel::High),
                status: None,
            },
            Page::default(),
        )
        .map_err(demo_step)?;
    println!("{} high-priority cases in the queue", high_priority.len());

    let snapshot = service.snapshot().map_err(demo_step)?;
    render_summary(&snapshot.summary(now.date_naive(), months), now.date_naive());
    render_top_cases(&snapshot.cases, 5);
    Ok(())
}

fn trend_months(months: Option<u32>) -> Result<u32, AppError> {
    let months = months.unwrap_or(DEFAULT_TREND_MONTHS);
    if (1..=MAX_TREND_MONTHS).contains(&months) {
        Ok(months)
    } else {
        Err(AppError::InvalidArgument(format!(
            "--months must be between 1 and {MAX_TREND_MONTHS}"
        )))
    }
}

fn end_of_day(date: NaiveDate) -> chrono::DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
    Utc.from_utc_datetime(&date.and_time(time))
}

fn demo_step(err: dca_desk::workflows::cases::CaseServiceError) -> AppError {
    AppError::InvalidArgument(format!("demo step failed: {err}"))
}

pub(crate) fn render_summary(summary: &PortfolioSummary, as_of: NaiveDate) {
    let kpis = &summary.kpis;
    println!("\nPortfolio as of {}", as_of.format("%Y-%m-%d"));
    println!(
        "- {} cases | {:.2} outstanding | {}% average expected recovery | {} days average resolution",
        kpis.total_cases, kpis.total_amount, kpis.avg_recovery_rate, kpis.avg_resolution_days
    );

    println!("Ageing:");
    for bucket in &summary.ageing_buckets {
        println!(
            "  - {:<11} {:>4} cases | {:.2}",
            bucket.label, bucket.count, bucket.amount
        );
    }

    println!(
        "SLA breaches: {} ({} critical) | {:.1}% of portfolio",
        summary.sla_breaches.total, summary.sla_breaches.critical, summary.sla_breaches.percentage
    );

    println!("Recovery trend:");
    for point in &summary.recovery_rate {
        println!("  - {} ({}): {:.1}%", point.month, point.period, point.rate);
    }

    if summary.dca_performance.is_empty() {
        println!("Agency performance: no roster supplied");
    } else {
        println!("Agency performance:");
        for agency in &summary.dca_performance {
            println!(
                "  - {}: {} active | {:.0}% recovered | {} days average",
                agency.name, agency.cases, agency.recovery_rate, agency.avg_days
            );
        }
    }
}

fn render_top_cases(cases: &[Case], limit: usize) {
    let mut ranked: Vec<&Case> = cases
        .iter()
        .filter(|case| !case.status.is_terminal())
        .collect();
    ranked.sort_by(|left, right| {
        left.priority
            .cmp(&right.priority)
            .then_with(|| right.amount.total_cmp(&left.amount))
    });

    if ranked.is_empty() {
        return;
    }
    println!("Top open cases:");
    for case in ranked.into_iter().take(limit) {
        println!(
            "  - {} {} | {} | {:.2} | {} days overdue | {}",
            case.id,
            case.customer_name,
            case.priority,
            case.amount,
            case.overdue_days,
            case.assigned_agency.as_deref().unwrap_or("unassigned")
        );
    }
}
