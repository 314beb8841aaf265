use crate::ui;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use radar::records::{format_timestamp, parse_timestamp};
use radar::storage::{
    init_project_store, load_store, locate_current_store, save_store, StoreLocation,
};
use radar::{
    Category, DisplaySettings, ItemStore, NewItem, Priority, RadarConfig, SettingChange,
};
use rand::{distributions::Alphanumeric, Rng};
use std::env;
use tracing::info;

pub fn init(name: Option<String>) -> Result<()> {
    let cwd = env::current_dir()?;
    let location = init_project_store(&cwd, name)?;
    println!("Initialized item store at {}", location.path.display());
    Ok(())
}

pub fn add(
    title: String,
    category: Category,
    at: Option<String>,
    priority: Option<Priority>,
) -> Result<()> {
    let (mut store, location) = load_current_store()?;
    let timestamp = match parse_when(at.as_deref())? {
        Some(dt) => Some(dt),
        None if matches!(category, Category::Note | Category::Inbox) => Some(Utc::now()),
        None => None,
    };
    let id = generate_id(&store);
    store
        .add(NewItem {
            id: id.clone(),
            title,
            category,
            timestamp,
            priority,
        })
        .with_context(|| format!("adding {} {}", category, id))?;
    save_store(&location, &store)?;
    info!(id = %id, %category, "item added");
    println!("Added {} {}", category, id);
    Ok(())
}

pub fn list(config: &RadarConfig) -> Result<()> {
    let (store, location) = load_current_store()?;
    println!("Items: {} ({})", store.name, location.scope.label());
    let items = store.items();
    let now = Utc::now();
    for category in Category::ALL {
        let group: Vec<_> = items.iter().filter(|i| i.category == category).collect();
        if group.is_empty() {
            continue;
        }
        println!("{}", category);
        for item in group {
            let band = config.thresholds.classify(item.timestamp, now);
            let when = item
                .timestamp
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_string());
            let priority = item.priority.map(|p| p.label()).unwrap_or("");
            println!(
                "  - {}: {}  [{}] {} {}",
                item.id,
                item.title,
                band.label(),
                when,
                priority
            );
        }
        println!();
    }
    if items.is_empty() {
        println!("  (empty)");
    }
    Ok(())
}

pub fn layout(config: &RadarConfig, at: Option<String>, scale: radar::BlipScale) -> Result<()> {
    let (store, _) = load_current_store()?;
    let now = parse_when(at.as_deref())?.unwrap_or_else(Utc::now);
    let settings = DisplaySettings::default().with(SettingChange::SetBlipScale(scale));
    let blips = config.engine().compute(&store.items(), now, &settings);
    let out = serde_yaml::to_string(&blips).context("serializing layout")?;
    print!("{}", out);
    Ok(())
}

pub fn done(item_id: String) -> Result<()> {
    let (mut store, location) = load_current_store()?;
    store
        .mark_done(&item_id)
        .with_context(|| format!("completing {}", item_id))?;
    save_store(&location, &store)?;
    info!(id = %item_id, "item marked done");
    println!("Marked {} done", item_id);
    Ok(())
}

pub fn show(config: &RadarConfig) -> Result<()> {
    let (store, location) = load_current_store()?;
    ui::run(store, location, config)
}

fn load_current_store() -> Result<(ItemStore, StoreLocation)> {
    let location = locate_current_store()?;
    let store = load_store(&location)?;
    Ok((store, location))
}

fn parse_when(input: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let raw = match input {
        Some(r) => r.trim(),
        None => return Ok(None),
    };
    if raw.is_empty() {
        return Ok(None);
    }
    parse_timestamp(raw)
        .map(Some)
        .ok_or_else(|| anyhow!("invalid date (use YYYY.MM.DD@hh:mm or RFC 3339): {}", raw))
}

pub(crate) fn generate_id(store: &ItemStore) -> String {
    loop {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        if !store.contains(&id) {
            return id;
        }
    }
}
