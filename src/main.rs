//! Festcache CLI - offline-first festival schedule cache.
//!
//! A thin command-line driver over the sync/cache engine: refresh
//! categories from the published feed, inspect the local snapshot,
//! download audio samples, and manage favorites. The local snapshot keeps
//! serving when the feed is unreachable.

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use festcache::api::{SourceClient, DEFAULT_BASE_URL};
use festcache::config::Config;
use festcache::utils::{format_bytes, time_sort_key};
use festcache::{Category, ScheduleDb};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn usage() {
    eprintln!("usage: festcache <command>");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  sync <category|all>      refresh a category from the feed");
    eprintln!("  list <category>          show the local schedule for a category");
    eprintln!("  pending <category>       show samples not yet downloaded and their size");
    eprintln!("  download <category>      download all pending samples");
    eprintln!("  fav <category> <key>     toggle a record's favorite flag");
    eprintln!("  favs                     show favorites across all categories");
    eprintln!("  status                   per-category record counts and sync age");
    eprintln!();
    eprintln!(
        "categories: {}",
        Category::ALL
            .iter()
            .map(|c| c.store_name())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::load()?;
    let db = ScheduleDb::open(config.data_dir()?).await?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("sync") => {
            let source = SourceClient::new(
                config.source_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            )?;
            match args.get(2).map(String::as_str) {
                Some("all") => sync_all(&db, &source).await,
                Some(name) => sync_one(&db, &source, parse_category(name)?).await,
                None => {
                    usage();
                    Ok(())
                }
            }
        }
        Some("list") => list(&db, parse_category_arg(&args)?).await,
        Some("pending") => pending(&db, parse_category_arg(&args)?).await,
        Some("download") => download(&db, parse_category_arg(&args)?).await,
        Some("fav") => {
            let category = parse_category_arg(&args)?;
            let key = args.get(3).context("missing record key")?;
            toggle_favorite(&db, category, key).await
        }
        Some("favs") => favorites(&db).await,
        Some("status") => status(&db).await,
        _ => {
            usage();
            Ok(())
        }
    }
}

fn parse_category(name: &str) -> Result<Category> {
    name.parse()
        .with_context(|| format!("'{name}' is not a known category"))
}

fn parse_category_arg(args: &[String]) -> Result<Category> {
    let name = args.get(2).context("missing category argument")?;
    parse_category(name)
}

async fn sync_one(db: &ScheduleDb, source: &SourceClient, category: Category) -> Result<()> {
    let rows = source
        .fetch_category_records(category)
        .await
        .with_context(|| format!("failed to fetch {category} from the feed"))?;
    db.reconcile(category, &rows).await?;
    info!(category = category.store_name(), rows = rows.len(), "category synced");
    println!("{}: {} entries", category.title(), rows.len());
    Ok(())
}

/// Sync every category; a category that fails keeps its last-known-good
/// local snapshot and does not stop the others.
async fn sync_all(db: &ScheduleDb, source: &SourceClient) -> Result<()> {
    for category in Category::ALL {
        if let Err(e) = sync_one(db, source, category).await {
            warn!(category = category.store_name(), error = %e, "category sync failed");
            println!("{}: sync failed ({e:#})", category.title());
        }
    }
    Ok(())
}

async fn list(db: &ScheduleDb, category: Category) -> Result<()> {
    let mut records = db.get_all(category).await?;
    records.sort_by(|a, b| {
        a.event
            .performance_date
            .cmp(&b.event.performance_date)
            .then_with(|| {
                time_sort_key(&a.event.performance_time)
                    .cmp(&time_sort_key(&b.event.performance_time))
            })
    });

    let mut current_date = None;
    for record in &records {
        let date = record.event.performance_date.as_str();
        if current_date != Some(date) {
            println!("{}", if date.is_empty() { "(no date)" } else { date });
            current_date = Some(date);
        }
        let mut markers = String::new();
        if record.favorite {
            markers.push('*');
        }
        if record.sample.is_some() {
            markers.push('~');
        }
        println!(
            "  {:>5}  {} {}",
            record.event.performance_time, record.event.name, markers
        );
    }
    if records.is_empty() {
        println!("no local entries for {} - run 'sync' first", category.title());
    }
    Ok(())
}

async fn pending(db: &ScheduleDb, category: Category) -> Result<()> {
    let records = db.pending_records(category).await?;
    if records.is_empty() {
        println!("nothing pending for {}", category.title());
        return Ok(());
    }
    for record in &records {
        println!("  {}", record.event.name);
    }
    let size = db.pending_size(category).await?;
    println!(
        "{} samples pending, about {}",
        records.len(),
        format_bytes(size)
    );
    Ok(())
}

async fn download(db: &ScheduleDb, category: Category) -> Result<()> {
    if db.pending_records(category).await?.is_empty() {
        println!("nothing pending for {}", category.title());
        return Ok(());
    }
    db.download_all(category, |done, total| {
        print!("\r{} / {}   ", format_bytes(done), format_bytes(total));
        let _ = io::stdout().flush();
    })
    .await?;
    println!();

    let still_pending = db.pending_records(category).await?.len();
    if still_pending > 0 {
        println!("{still_pending} samples failed and remain pending");
    } else {
        println!("all samples downloaded");
    }
    Ok(())
}

async fn toggle_favorite(db: &ScheduleDb, category: Category, key: &str) -> Result<()> {
    let record = db
        .store()
        .get(category, key)
        .await?
        .with_context(|| format!("no record '{key}' in {category}"))?;
    let updated = db.toggle_favorite(category, &record).await?;
    println!(
        "{}: {}",
        updated.event.name,
        if updated.favorite { "favorite" } else { "not a favorite" }
    );
    Ok(())
}

async fn favorites(db: &ScheduleDb) -> Result<()> {
    let mut favorites = db.all_favorites().await?;
    if favorites.is_empty() {
        println!("no favorites yet - toggle one with 'fav <category> <key>'");
        return Ok(());
    }
    favorites.sort_by(|a, b| {
        a.1.event
            .performance_date
            .cmp(&b.1.event.performance_date)
            .then_with(|| {
                time_sort_key(&a.1.event.performance_time)
                    .cmp(&time_sort_key(&b.1.event.performance_time))
            })
    });
    for (category, record) in &favorites {
        println!(
            "{:>8} {:>5}  {} [{}]",
            record.event.performance_date,
            record.event.performance_time,
            record.event.name,
            category.store_name()
        );
    }
    Ok(())
}

async fn status(db: &ScheduleDb) -> Result<()> {
    for category in Category::ALL {
        let count = db.get_all(category).await?.len();
        let age = match db.last_synced(category).await? {
            Some(stamp) if stamp.is_stale() => format!("{} (stale)", stamp.age_display()),
            Some(stamp) => stamp.age_display(),
            None => "never".to_string(),
        };
        println!("{:<18} {:>4} entries  synced {}", category.title(), count, age);
    }
    Ok(())
}
