use account_reconciler::{
    count_accounts, save_accounts, setup_database, Account, AccountSource, AdServerJsonSource,
    ConsoleResolver, CrmCsvSource, MatchConfig, MergeResolver, ReconcileError,
    ReconciliationEngine,
};
use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;
use std::path::PathBuf;
use tracing::warn;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "account-reconciler")]
#[command(about = "Merge CRM and ad-server account exports into one deduplicated list")]
#[command(version)]
struct Args {
    /// CRM account export (CSV)
    #[arg(long)]
    crm: PathBuf,

    /// Ad-server company pages (JSON)
    #[arg(long = "ad-server")]
    ad_server: PathBuf,

    /// SQLite database receiving the reconciled accounts
    #[arg(long, default_value = "accounts.db", env = "RECONCILE_DB")]
    db: PathBuf,

    /// JSON file overriding match weights and thresholds
    #[arg(long, env = "RECONCILE_CONFIG")]
    config: Option<PathBuf>,

    /// Never prompt; ambiguous pairs stay separate
    #[arg(long)]
    non_interactive: bool,

    /// Reconcile and report, but do not write to the database
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_reconciler=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MatchConfig::from_file(path)?,
        None => MatchConfig::default(),
    };

    // 1. Ingest both sources (failures are reported, the run continues)
    println!("📂 Getting ad-server accounts...");
    let ad_server_accounts = fetch_or_empty(&AdServerJsonSource::new(&args.ad_server));
    println!("✓ {} ad-server accounts found.", ad_server_accounts.len());

    println!("📂 Getting CRM accounts...");
    let crm_accounts = fetch_or_empty(&CrmCsvSource::new(&args.crm));
    println!("✓ {} CRM accounts found.", crm_accounts.len());

    // 2. Reconcile (CRM is the left-biased side)
    let engine = ReconciliationEngine::with_config(config);
    let mut console = ConsoleResolver::stdio();
    let resolver: Option<&mut dyn MergeResolver> = if args.non_interactive {
        None
    } else {
        Some(&mut console)
    };

    let report = engine.reconcile(crm_accounts, ad_server_accounts, resolver);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Total number of distinct accounts found: {}", report.stats.total);
    println!("Number accounts auto-merged: {}", report.stats.auto_merged);
    println!("Number of accounts manually merged: {}", report.stats.manually_merged);

    if args.dry_run {
        println!("\n🔍 Dry run: nothing written");
        return Ok(());
    }

    // 3. Persist (validation failures are reported, then fail the run)
    let mut conn = Connection::open(&args.db)
        .with_context(|| format!("Failed to open database {}", args.db.display()))?;
    setup_database(&conn)?;

    match save_accounts(&mut conn, &report.accounts) {
        Ok(saved) => {
            println!("\n💾 Saved {} accounts", saved);
            println!("✓ Database contains {} accounts", count_accounts(&conn)?);
            Ok(())
        }
        Err(err @ ReconcileError::PersistenceValidationFailure { .. }) => {
            for invalid in err.invalid_accounts() {
                eprintln!("Entry for company \"{}\" has formatting errors.", invalid.account);
                for violation in &invalid.violations {
                    eprintln!("- {}", violation);
                }
            }
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

fn fetch_or_empty(source: &dyn AccountSource) -> Vec<Account> {
    match source.fetch() {
        Ok(accounts) => accounts,
        Err(err) => {
            warn!(source = source.system().code(), error = %err, "ingestion failed");
            eprintln!("❌ Failed to get {} accounts: {}", source.system(), err);
            Vec::new()
        }
    }
}
