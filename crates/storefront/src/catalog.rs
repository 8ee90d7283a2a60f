//! Built-in catalog: shop products and gallery artworks.
//!
//! The storefront has no product database; entries are fixed at build time
//! and served read-only. Shop prices are in quetzales, artwork prices in
//! US dollars, matching how the pieces are listed.

use galeria_core::{CatalogEntry, CatalogQuery, Category, ItemId};

/// Gallery techniques, as used in artwork tags and `?technique=`.
pub const TECHNIQUES: [&str; 4] = ["oil", "acrylic", "mixed", "ink"];

/// Read-only list of purchasable entries, in display order.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Catalog over `entries`, keeping their order.
    #[must_use]
    pub const fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The storefront's shop products followed by the gallery artworks.
    #[must_use]
    pub fn builtin() -> Self {
        let mut entries = products();
        entries.extend(artworks());
        Self::new(entries)
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entry with `id`, if any.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id.as_str() == id)
    }

    /// Filtered and sorted entries.
    #[must_use]
    pub fn query(&self, query: &CatalogQuery) -> Vec<CatalogEntry> {
        query.apply(&self.entries)
    }

    /// Artwork pieces, optionally restricted to one technique.
    ///
    /// A blank technique, or `"all"`, lists every piece.
    #[must_use]
    pub fn gallery(&self, technique: Option<&str>) -> Vec<CatalogEntry> {
        let technique = technique
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("all"));

        self.query(&CatalogQuery {
            category: Some(Category::Artwork),
            tag: technique.map(str::to_string),
            ..CatalogQuery::default()
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn entry(id: &str, title: &str, unit_price: f64, image_url: &str, category: Category) -> CatalogEntry {
    CatalogEntry {
        id: ItemId::new(id),
        title: title.to_string(),
        unit_price,
        image_url: image_url.to_string(),
        category: Some(category),
        tags: Vec::new(),
        featured: false,
        new: false,
    }
}

fn products() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            featured: true,
            new: true,
            ..entry("p01", "Pin — Serie ‘Nocturna’", 65.0, "/productos/pin-nocturna.jpg", Category::Pins)
        },
        entry("p02", "Llavero — ‘Ojo Alquímico’", 55.0, "/productos/llavero-ojo.jpg", Category::Keychains),
        CatalogEntry {
            featured: true,
            ..entry("p03", "Collar — ‘Luna & Mar’", 180.0, "/productos/collar-luna.jpg", Category::Necklaces)
        },
        entry("p04", "Dije — ‘Ave Dorada’", 150.0, "/productos/dije-ave.jpg", Category::Pendants),
        CatalogEntry {
            new: true,
            ..entry("p05", "Taza — ‘Bosque Azul’", 90.0, "/productos/taza-bosque.jpg", Category::Mugs)
        },
        entry("p06", "Manta — ‘Cielo de Invierno’", 420.0, "/productos/manta-invierno.jpg", Category::Blankets),
        CatalogEntry {
            featured: true,
            ..entry("p07", "Póster — ‘Edición Limitada 01’", 350.0, "/productos/poster-limited.jpg", Category::Posters)
        },
        entry("p08", "Stickers — ‘Mini Set’", 35.0, "/productos/stickers-mini.jpg", Category::Stickers),
    ]
}

fn artwork(id: &str, title: &str, technique: &str, year: u16, unit_price: f64) -> CatalogEntry {
    CatalogEntry {
        tags: vec![technique.to_string(), year.to_string()],
        ..entry(id, title, unit_price, &format!("/images/{id}.jpg"), Category::Artwork)
    }
}

fn artworks() -> Vec<CatalogEntry> {
    let mut first = artwork("obra-1", "Luz en Silencio", "oil", 2024, 450.0);
    first.new = true;
    let mut series = artwork("obra-3", "Campos Invisibles", "mixed", 2022, 520.0);
    series.tags.push("serie-x".to_string());

    vec![
        first,
        artwork("obra-2", "Memoria de Agua", "acrylic", 2023, 380.0),
        series,
        artwork("obra-4", "Solsticio", "oil", 2024, 410.0),
        artwork("obra-5", "Retícula", "ink", 2023, 260.0),
        artwork("obra-6", "Umbral", "mixed", 2022, 300.0),
    ]
}
