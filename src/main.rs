// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use std::env;
use std::path::Path;

use event_planner::audit::{suspicious_alerts, AuditLogEntry};
use event_planner::export::{export_catalog, export_history};
use event_planner::logging::init_logging;
use event_planner::reference::staff;
use event_planner::session::SessionContext;
use event_planner::{open_store, MenuRecordStore, PlannerConfig, SqliteStore};

const USAGE: &str = "\
Usage: event-planner [COMMAND]

Commands:
  menu                          List the current menu
  find <name>                   First item whose name contains <name>
  set-price <id> <price> [who]  Change an item's price (who defaults to
                                PLANNER_ACTOR, logged in as PLANNER_ROLE)
  history [item-id]             Price changes, oldest first
  export <catalog|history> <path>
  staff                         Staff roles and default rates
  alerts                        Suspicious price activity
  (no command)                  Interactive terminal UI";

fn main() -> Result<()> {
    init_logging("warn");

    let config = PlannerConfig::from_env()?;
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        return run_ui_mode(&config);
    }

    let store = open_store(&config)?;

    match args[0].as_str() {
        "menu" => print_menu(&store),
        "find" => {
            let name = args.get(1).context("find needs a name")?;
            find_item(&store, name)
        }
        "set-price" => {
            let (Some(id), Some(price)) = (args.get(1), args.get(2)) else {
                bail!("set-price needs <id> <price>");
            };
            let price: f64 = price
                .parse()
                .with_context(|| format!("'{}' is not a number", price))?;
            let actor_id = args.get(3).or(config.actor.as_ref()).map(String::as_str);
            let session = SessionContext::start(actor_id, &config.role)?;
            set_price(&store, id, price, session.actor_id_or_anonymous())
        }
        "history" => print_history(&store, args.get(1).map(String::as_str)),
        "export" => {
            let (Some(what), Some(path)) = (args.get(1), args.get(2)) else {
                bail!("export needs <catalog|history> <path>");
            };
            run_export(&store, what, Path::new(path))
        }
        "staff" => {
            print_staff();
            Ok(())
        }
        "alerts" => print_alerts(&store),
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => {
            eprintln!("❌ Unknown command: {}\n", other);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn print_menu(store: &MenuRecordStore<SqliteStore>) -> Result<()> {
    let items = store.get_menu_items()?;

    println!("🍽️  Menu ({} items)", items.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for item in &items {
        println!(
            "{:<18} {:<28} {:<12} {:>8.2}",
            item.id,
            item.name,
            item.category.label(),
            item.price
        );
    }

    Ok(())
}

fn find_item(store: &MenuRecordStore<SqliteStore>, name: &str) -> Result<()> {
    match store.get_item_by_name(name)? {
        Some(item) => println!(
            "✓ {} ({}) - {} - {:.2}",
            item.name,
            item.id,
            item.category.label(),
            item.price
        ),
        None => println!("No menu item matches '{}'", name),
    }
    Ok(())
}

fn set_price(store: &MenuRecordStore<SqliteStore>, id: &str, price: f64, actor: &str) -> Result<()> {
    let before = store.get_item(id)?;

    if store.update_price(id, price, actor)? {
        let old = before.map(|i| i.price).unwrap_or_default();
        println!("✓ {}: {:.2} → {:.2} (by {})", id, old, price, actor);
    } else {
        eprintln!("❌ No menu item with id '{}'", id);
        std::process::exit(1);
    }

    Ok(())
}

fn print_history(store: &MenuRecordStore<SqliteStore>, item_id: Option<&str>) -> Result<()> {
    let history = match item_id {
        Some(id) => store.history_for_item(id)?,
        None => store.get_price_history()?,
    };

    if history.is_empty() {
        println!("No price changes recorded");
        return Ok(());
    }

    println!("📜 Price history ({} changes)", history.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for entry in &history {
        println!(
            "{}  {:<18} {:>8.2} → {:<8.2} {}",
            entry.changed_at.format("%Y-%m-%d %H:%M:%S"),
            entry.item_id,
            entry.old_price,
            entry.new_price,
            entry.changed_by
        );
    }

    Ok(())
}

fn run_export(store: &MenuRecordStore<SqliteStore>, what: &str, path: &Path) -> Result<()> {
    let count = match what {
        "catalog" => export_catalog(path, &store.get_menu_items()?)?,
        "history" => export_history(path, &store.get_price_history()?)?,
        other => bail!("Unknown export target '{}' (expected catalog or history)", other),
    };
    println!("✓ Exported {} rows to {}", count, path.display());
    Ok(())
}

fn print_staff() {
    println!("👥 Staff roles");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for role in staff::ROLES {
        println!(
            "{:<14} {:<24} {:>7.2}{:<7} {}",
            role.id,
            role.name,
            role.default_rate,
            role.rate_type.unit(),
            if role.can_access_system { "system access" } else { "" }
        );
    }
}

fn print_alerts(store: &MenuRecordStore<SqliteStore>) -> Result<()> {
    let entries: Vec<AuditLogEntry> = store
        .get_price_history()?
        .iter()
        .map(AuditLogEntry::from_price_change)
        .collect();

    let alerts = suspicious_alerts(&entries);
    if alerts.is_empty() {
        println!("✓ No suspicious activity");
    }
    for alert in alerts {
        println!("{}", alert.message);
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &PlannerConfig) -> Result<()> {
    println!("🖥️  Loading Event Planner UI...\n");

    let store = open_store(config)?;
    let items = store.get_menu_items()?;
    let history = store.get_price_history()?;

    println!("✓ Loaded {} menu items, {} price changes\n", items.len(), history.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let session = SessionContext::start(config.actor.as_deref(), &config.role)?;
    let mut app = ui::App::new(items, history).with_actor(session.current_actor().cloned());
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &PlannerConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the CLI: event-planner help");
    std::process::exit(1);
}
