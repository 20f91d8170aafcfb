use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use ogdrb_core::models::Repeater;
use ogdrb_core::{
    Codeplug, Config, ExportQuery, Exporter, RepeaterFetcher, RepeaterStore, ZoneBook, ZoneDraft,
    ZoneResolver,
};

/// Country/state selection shared by every command.
pub struct Selection {
    pub query: ExportQuery,
    pub us_state_ids: BTreeSet<String>,
}

pub async fn fetch(fetcher: &RepeaterFetcher, selection: &Selection) -> Result<()> {
    if selection.query.countries.is_empty() {
        return Err(ogdrb_core::Error::invalid_selection("at least one --country is required").into());
    }
    let repeaters = fetcher
        .fetch_and_store(&selection.query, &selection.us_state_ids)
        .await?;
    println!(
        "{} repeaters stored for the selection ({} in store)",
        repeaters.len(),
        fetcher.store().len()?
    );
    Ok(())
}

pub fn list(store: Arc<RepeaterStore>, selection: &Selection) -> Result<()> {
    let region = selection.query.region_filter(&selection.us_state_ids);
    let repeaters = ZoneResolver::new(store).compatible_repeaters(&region)?;
    for repeater in &repeaters {
        println!("{}", format_repeater(repeater));
    }
    println!("{} compatible repeaters", repeaters.len());
    Ok(())
}

fn format_repeater(repeater: &Repeater) -> String {
    let position = match repeater.position {
        Some(p) => format!("{:.4},{:.4}", p.lat, p.lon),
        None => "-".to_string(),
    };
    let modes = match (repeater.analog_capable, repeater.dmr_capable) {
        (true, true) => "FM+DMR",
        (false, true) => "DMR",
        _ => "FM",
    };
    format!(
        "{:<24} {:<8} {:>9.4} {:<6} {:<24} {}",
        repeater.id().to_string(),
        repeater.callsign.as_deref().unwrap_or("-"),
        repeater.frequency,
        modes,
        repeater.location_nearest_city,
        position
    )
}

/// Read a JSON array of `{name, lat, lng, radius}` zones (radius in km).
pub fn load_zone_book(path: &Path) -> Result<ZoneBook> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read zone file: {}", path.display()))?;
    let drafts: Vec<ZoneDraft> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse zone file: {}", path.display()))?;
    Ok(ZoneBook::from_drafts(drafts))
}

pub async fn export(
    exporter: &Exporter,
    selection: &Selection,
    zones_path: &Path,
    output: Option<&Path>,
    offline: bool,
) -> Result<()> {
    let book = load_zone_book(zones_path)?;
    let zones = book.to_zones()?;
    info!(zones = zones.len(), offline, "Exporting codeplug");

    let codeplug = exporter
        .export(&zones, &selection.query, &selection.us_state_ids, offline)
        .await?;
    write_codeplug(&codeplug, output)?;

    eprintln!(
        "Exported {} channels from {} zones",
        codeplug.channels.len(),
        zones.len()
    );
    Ok(())
}

fn write_codeplug(codeplug: &Codeplug, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(codeplug)?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write codeplug: {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

pub fn status(config: &Config, store: &RepeaterStore) -> Result<()> {
    println!("Config:  {}", Config::config_path()?.display());
    match store.path() {
        Some(path) => println!("Store:   {}", path.display()),
        None => println!("Store:   (in memory)"),
    }
    match store.freshness()? {
        Some(cached) => {
            println!(
                "Stored:  {} repeaters, updated {}",
                cached.data,
                cached.age_display()
            );
            if cached.is_stale() {
                println!("The store is more than a week old; run `ogdrb fetch` to refresh it.");
            }
        }
        None => println!("Stored:  nothing yet; run `ogdrb fetch`"),
    }
    println!("Agent:   {}", config.user_agent());
    Ok(())
}
