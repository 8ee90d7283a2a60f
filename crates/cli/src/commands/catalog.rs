//! Catalog listing commands.

use galeria_core::{CatalogEntry, CatalogQuery, Category, Price, SortKey};
use galeria_storefront::Catalog;
use galeria_storefront::catalog::TECHNIQUES;
use tracing::info;

/// List catalog entries matching the filters.
pub fn list(category: Option<Category>, search: Option<String>, tag: Option<String>, sort: SortKey) {
    let query = CatalogQuery {
        category,
        search,
        tag,
        sort,
    };
    print_entries(&Catalog::builtin().query(&query));
}

/// List gallery artworks, optionally for one technique.
pub fn gallery(technique: Option<&str>) {
    let pieces = Catalog::builtin().gallery(technique);
    if pieces.is_empty() {
        info!("No artworks. Known techniques: {}", TECHNIQUES.join(", "));
        return;
    }
    print_entries(&pieces);
}

fn print_entries(entries: &[CatalogEntry]) {
    for entry in entries {
        let mut flags = Vec::new();
        if entry.featured {
            flags.push("featured");
        }
        if entry.new {
            flags.push("new");
        }
        info!(
            "{:<8} {:<34} {:>9}  {:<10} {} {}",
            entry.id.as_str(),
            entry.title,
            Price::from_amount(entry.unit_price),
            entry.category.map_or("-", |c| c.slug()),
            entry.tags.join(","),
            flags.join(",")
        );
    }
    info!("{} entries", entries.len());
}
