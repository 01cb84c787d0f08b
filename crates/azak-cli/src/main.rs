//! Command-line driver for the azak daily view quota
//!
//! Keeps one visitor's quota record in a data directory and runs the same
//! admission the stock detail page does.

use anyhow::Context as _;
use azak_quota::clock::format_day;
use azak_quota::{
    AuthStatus, BannerState, Clock, FileStorage, LocalClock, QuotaConfig, StockCode, ViewDecision,
    ViewQuotaTracker,
};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Table, presets::UTF8_FULL};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Exit status when a view is rejected
const EXIT_BLOCKED: u8 = 2;
const EXIT_OK: u8 = 0;

#[derive(Parser, Debug)]
#[command(name = "azak")]
#[command(about = "Daily free stock-view quota for azak", long_about = None)]
struct Cli {
    /// Directory holding the quota record
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Key the quota record is stored under
    #[arg(long, global = true)]
    storage_key: Option<String>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a stock detail page, consuming quota if needed
    View {
        code: String,
        #[arg(long, value_enum, default_value_t = AuthArg::Anonymous)]
        auth: AuthArg,
    },
    /// Report whether a stock may be viewed without recording anything
    Check {
        code: String,
        #[arg(long, value_enum, default_value_t = AuthArg::Anonymous)]
        auth: AuthArg,
    },
    /// Show today's usage
    Status {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AuthArg {
    Anonymous,
    Authenticated,
    /// Auth still loading
    Unknown,
}

impl From<AuthArg> for AuthStatus {
    fn from(arg: AuthArg) -> Self {
        match arg {
            AuthArg::Anonymous => AuthStatus::Anonymous,
            AuthArg::Authenticated => AuthStatus::Authenticated,
            AuthArg::Unknown => AuthStatus::Unknown,
        }
    }
}

impl Cli {
    fn quota_config(&self) -> anyhow::Result<QuotaConfig> {
        let mut builder = QuotaConfig::builder();
        if let Some(dir) = &self.data_dir {
            builder = builder.data_dir(dir.clone());
        }
        if let Some(key) = &self.storage_key {
            builder = builder.storage_key(key.clone());
        }
        builder
            .with_env()
            .build()
            .context("invalid quota configuration")
    }

    fn auth(&self) -> AuthStatus {
        match &self.command {
            Command::View { auth, .. } | Command::Check { auth, .. } => (*auth).into(),
            Command::Status { .. } => AuthStatus::Anonymous,
        }
    }
}

fn run(
    cli: &Cli,
    config: &QuotaConfig,
    clock: impl Clock + 'static,
    out: &mut impl Write,
) -> anyhow::Result<u8> {
    let storage = FileStorage::new(&config.data_dir);
    let mut tracker = ViewQuotaTracker::builder(storage, cli.auth())
        .clock(clock)
        .config(config)
        .build();

    match &cli.command {
        Command::View { code, .. } => {
            let code = StockCode::new(code)?;
            let decision = tracker.enter_stock_detail(&code);
            info!(code = %code, ?decision, "stock detail requested");

            match decision {
                ViewDecision::Granted => writeln!(out, "granted: {code}")?,
                ViewDecision::Pending => writeln!(out, "pending: {code} (auth unresolved)")?,
                ViewDecision::Blocked => writeln!(out, "blocked: {code}")?,
            }
            print_banner(&tracker, out)?;
            if let Some(notice) = tracker.donation_notice() {
                writeln!(out)?;
                writeln!(out, "{notice}")?;
            }

            let status = if decision.is_allowed() {
                EXIT_OK
            } else {
                EXIT_BLOCKED
            };
            Ok(status)
        }
        Command::Check { code, .. } => {
            let code = StockCode::new(code)?;
            let allowed = tracker.can_view(code.as_str());
            let verdict = if allowed { "viewable" } else { "limit reached" };
            writeln!(out, "{code}: {verdict}")?;
            Ok(EXIT_OK)
        }
        Command::Status { json } => {
            if *json {
                let status = serde_json::json!({
                    "date": format_day(tracker.today()),
                    "viewedCount": tracker.viewed_count(),
                    "remainingViews": tracker.remaining_views(),
                    "dailyLimit": tracker.daily_limit(),
                    "isLimitReached": tracker.is_limit_reached(),
                    "viewedStocks": tracker.viewed_codes(),
                });
                writeln!(out, "{}", serde_json::to_string_pretty(&status)?)?;
            } else {
                writeln!(out, "{}", status_table(&tracker))?;
            }
            Ok(EXIT_OK)
        }
    }
}

fn print_banner(tracker: &ViewQuotaTracker, out: &mut impl Write) -> std::io::Result<()> {
    let banner = BannerState::for_tracker(tracker);
    if banner.is_visible() {
        writeln!(out, "{banner}")?;
    }
    Ok(())
}

fn status_table(tracker: &ViewQuotaTracker) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Date", "Viewed", "Remaining", "Limit", "Stocks"]);
    table.add_row(vec![
        tracker.today().to_string(),
        tracker.viewed_count().to_string(),
        tracker.remaining_views().to_string(),
        tracker.daily_limit().to_string(),
        tracker.viewed_codes().join(", "),
    ]);
    table
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut app_config = azak_utils::Config::from_env();
    app_config.json_logs |= cli.json_logs;
    azak_utils::init_tracing(&app_config);

    let config = cli.quota_config()?;
    info!(
        app = %app_config.app_name,
        environment = %app_config.environment,
        data_dir = %config.data_dir.display(),
        "starting azak"
    );

    let mut stdout = std::io::stdout().lock();
    let status = run(&cli, &config, LocalClock, &mut stdout)?;
    Ok(ExitCode::from(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use azak_quota::FixedClock;
    use azak_quota::clock::parse_day;

    fn clock_at(day: &str) -> FixedClock {
        FixedClock::new(parse_day(day).unwrap())
    }

    fn cli(dir: &std::path::Path, args: &[&str]) -> Cli {
        let mut argv = vec!["azak", "--data-dir", dir.to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn config(dir: &std::path::Path) -> QuotaConfig {
        QuotaConfig::builder().data_dir(dir).build().unwrap()
    }

    fn exec(dir: &std::path::Path, clock: &FixedClock, args: &[&str]) -> (u8, String) {
        let cli = cli(dir, args);
        let config = config(dir);
        let mut out = Vec::new();
        let code = run(&cli, &config, clock.clone(), &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_view_until_blocked_across_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let clock = clock_at("2024-01-01");

        for code in ["005930", "000660", "035720"] {
            let (status, out) = exec(dir.path(), &clock, &["view", code]);
            assert_eq!(status, EXIT_OK);
            assert!(out.starts_with("granted"), "{out}");
        }

        let (status, out) = exec(dir.path(), &clock, &["view", "207940"]);
        assert_eq!(status, EXIT_BLOCKED);
        assert!(out.starts_with("blocked"));
        assert!(out.contains("refill tomorrow"));

        let (_, out) = exec(dir.path(), &clock, &["check", "000660"]);
        assert_eq!(out.trim(), "000660: viewable");
        let (_, out) = exec(dir.path(), &clock, &["check", "207940"]);
        assert_eq!(out.trim(), "207940: limit reached");
    }

    #[test]
    fn test_next_day_resets() {
        let dir = tempfile::tempdir().unwrap();
        let clock = clock_at("2024-01-01");

        for code in ["A", "B", "C"] {
            exec(dir.path(), &clock, &["view", code]);
        }

        clock.advance_day();
        let (status, out) = exec(dir.path(), &clock, &["view", "D"]);
        assert_eq!(status, EXIT_OK);
        assert!(out.contains("(1/3)"));
    }

    #[test]
    fn test_authenticated_and_unknown_views_are_not_counted() {
        let dir = tempfile::tempdir().unwrap();
        let clock = clock_at("2024-01-01");

        let signed_in = ["view", "A", "--auth", "authenticated"];
        let (_, out) = exec(dir.path(), &clock, &signed_in);
        assert_eq!(out.trim(), "granted: A");
        let (_, out) = exec(dir.path(), &clock, &["view", "B", "--auth", "unknown"]);
        assert!(out.starts_with("pending"));

        let (_, out) = exec(dir.path(), &clock, &["status", "--json"]);
        let status: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(status["viewedCount"], 0);
        assert_eq!(status["remainingViews"], 3);
        assert_eq!(status["date"], "2024-01-01");
    }

    #[test]
    fn test_status_table_lists_codes() {
        let dir = tempfile::tempdir().unwrap();
        let clock = clock_at("2024-01-01");
        exec(dir.path(), &clock, &["view", "005930"]);

        let (_, out) = exec(dir.path(), &clock, &["status"]);
        assert!(out.contains("005930"));
        assert!(out.contains("Remaining"));
    }

    #[test]
    fn test_invalid_code_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = cli(dir.path(), &["view", "00-59"]);
        let config = config(dir.path());
        let mut out = Vec::new();

        let err = run(&cli, &config, clock_at("2024-01-01"), &mut out).unwrap_err();
        assert!(err.to_string().contains("Invalid stock code"));
    }
}
