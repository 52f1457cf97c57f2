//! Loadout search quickstart.
//!
//! Loads the bundled sample catalog, asks for Attack Boost 4, Critical Eye 3
//! and Weakness Exploit 2, and prints the best matches.
//!
//! ```text
//! cargo run -p loadout-search
//! ```

mod data;

use std::sync::Arc;

use armory::{
    console, Catalog, Category, DesiredAbilities, Equippable, SearchConfig, SearchEvent,
    SearchManager, SearchReport, SearchRequest, SkillId, SlotCounts, CONFIG_FILE,
};
use tracing::warn;

const SHOWN: usize = 5;

#[tokio::main]
async fn main() -> armory::Result<()> {
    console::init();

    let (catalog, warnings) = data::sample_catalog()?;
    for warning in &warnings {
        warn!(%warning, "sample data");
    }
    let catalog = Arc::new(catalog);

    let config = SearchConfig::load(CONFIG_FILE).unwrap_or_default();
    let request = SearchRequest::new(
        DesiredAbilities::new()
            .with(SkillId(1), 4)
            .with(SkillId(2), 3)
            .with(SkillId(3), 2),
    )
    .with_extra_slots(SlotCounts::from_sizes(&[2, 1]));

    let (events, mut updates) = tokio::sync::mpsc::unbounded_channel::<SearchEvent>();
    let mut manager = SearchManager::new(Arc::clone(&catalog), config);
    let job = manager.start(request, Some(Box::new(events)))?;

    let printer = tokio::spawn(async move {
        while let Some(event) = updates.recv().await {
            if matches!(event, SearchEvent::Started { .. }) {
                println!("{event}");
            }
        }
    });

    let report = job.join().await?;
    let _ = printer.await;

    print_report(&catalog, &report);
    Ok(())
}

fn print_report(catalog: &Catalog, report: &SearchReport) {
    if report.is_no_match() {
        println!("\nNo loadout reaches every requested level.");
        return;
    }
    if report.is_cancelled() {
        println!("\nSearch cancelled; showing the matches found so far.");
    }

    for (rank, result) in report.results.iter().take(SHOWN).enumerate() {
        let combination = &result.combination;
        println!("\n#{} keys {:?}", rank + 1, result.keys);
        for category in Category::ALL {
            let name = combination
                .piece(category)
                .and_then(|id| catalog.piece(id))
                .map_or("-", |piece| piece.display_name());
            println!("  {:<7} {}", category.to_string(), name);
        }
        let charm = combination
            .charm()
            .and_then(|id| catalog.charm(id))
            .map_or("-", |charm| charm.display_name());
        println!("  {:<7} {}", "charm", charm);
        for (jewel, count) in combination.jewels().grouped() {
            if let Some(jewel) = catalog.jewel(jewel) {
                println!("  jewel   {} x{}", jewel.name, count);
            }
        }
    }
}
