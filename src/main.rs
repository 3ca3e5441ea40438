use clap::Parser;
use creator_prospector::config::ProspectorConfig;
use creator_prospector::crm::JsonLinesSink;
use creator_prospector::prospect::run_with_config;
use creator_prospector::results::SiteReport;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Keys and endpoints may live in a local env file
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match ProspectorConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => ProspectorConfig::default(),
    };
    config.apply_env();
    args.apply(&mut config);

    let candidates = match args.candidates() {
        Ok(candidates) if !candidates.is_empty() => candidates,
        Ok(_) => {
            ::log::error!("No candidate sites given");
            std::process::exit(2);
        }
        Err(e) => {
            ::log::error!("Failed to read sites file: {}", e);
            std::process::exit(2);
        }
    };

    let mut sink = match JsonLinesSink::open(args.crm_out.as_deref()) {
        Ok(sink) => sink,
        Err(e) => {
            ::log::error!("Failed to open CRM output: {}", e);
            std::process::exit(2);
        }
    };

    ::log::info!(
        "Prospecting {} candidates through WebDriver at {}",
        candidates.len(),
        config.webdriver_url
    );
    let start_time = std::time::Instant::now();

    let reports = match run_with_config(&config, &candidates, &mut sink).await {
        Ok(reports) => reports,
        Err(e) => {
            ::log::error!("Prospecting aborted: {}", e);
            std::process::exit(1);
        }
    };

    for report in &reports {
        summarize(report);
    }

    let delivered = reports.iter().filter(|report| report.delivered).count();
    ::log::info!(
        "Prospecting complete - {} sites, {} delivered in {:.2} seconds",
        reports.len(),
        delivered,
        start_time.elapsed().as_secs_f64()
    );
}

fn summarize(report: &SiteReport) {
    match (&report.skipped, &report.outcome) {
        (Some(reason), _) => ::log::info!("{}: skipped ({})", report.site_url, reason),
        (None, Some(outcome)) => {
            ::log::info!(
                "{}: {:?} after {} visits, {} step failures",
                report.site_url,
                outcome.state,
                outcome.visited.len(),
                outcome.failures.len()
            );
            ::log::debug!("{}: {:?}", report.site_url, outcome.record);
        }
        (None, None) => {}
    }
}
