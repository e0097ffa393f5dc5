use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Planet,
    Mission,
}

impl Category {
    pub fn noun(&self) -> &'static str {
        match self {
            Category::Planet => "planet",
            Category::Mission => "mission",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
    pub fun_fact: String,
    pub image_url: String,
}

impl CatalogEntry {
    fn new(name: &str, description: &str, fun_fact: &str, image_url: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            fun_fact: fun_fact.to_string(),
            image_url: image_url.to_string(),
        }
    }
}

/// Planets and missions. Loaded once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Catalog {
    planets: Vec<CatalogEntry>,
    missions: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(
        planets: Vec<CatalogEntry>,
        missions: Vec<CatalogEntry>,
    ) -> Result<Self, CatalogError> {
        ensure_unique_names(Category::Planet, &planets)?;
        ensure_unique_names(Category::Mission, &missions)?;
        Ok(Self { planets, missions })
    }

    /// Reads a catalog from a JSON file shaped `{"planets": [...], "missions": [...]}`.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        let raw: Catalog = serde_json::from_reader(BufReader::new(file))?;
        Self::new(raw.planets, raw.missions)
    }

    pub fn entries(&self, category: Category) -> &[CatalogEntry] {
        match category {
            Category::Planet => &self.planets,
            Category::Mission => &self.missions,
        }
    }

    pub fn planets(&self) -> &[CatalogEntry] {
        &self.planets
    }

    pub fn missions(&self) -> &[CatalogEntry] {
        &self.missions
    }

    pub fn find(&self, category: Category, name: &str) -> Option<&CatalogEntry> {
        self.entries(category).iter().find(|e| e.name == name)
    }

    /// The eight planets of the Solar System and four landmark missions.
    pub fn solar_system() -> Self {
        let planets = vec![
            CatalogEntry::new(
                "Mercury",
                "The smallest and innermost planet in the Solar System",
                "Orbits the Sun at an incredible speed of about 107,000 mph, faster than any other planet.",
                "https://images.unsplash.com/photo-1614732414444-096e5f1122d5?auto=format&fit=crop&q=80&w=800",
            ),
            CatalogEntry::new(
                "Venus",
                "Often called Earth's sister planet due to similar size",
                "Rotates backwards compared to most other planets.",
                "https://images.unsplash.com/photo-1614728894747-a83421e2b9c9?auto=format&fit=crop&q=80&w=800",
            ),
            CatalogEntry::new(
                "Earth",
                "Our home planet and the only known planet with life",
                "Is the only planet not named after a god or goddess.",
                "https://images.unsplash.com/photo-1614730321146-b6fa6a46bcb4?auto=format&fit=crop&q=80&w=800",
            ),
            CatalogEntry::new(
                "Mars",
                "Known as the Red Planet",
                "Has the largest dust storms in our solar system.",
                "https://images.unsplash.com/photo-1614728894747-a83421e2b9c9?auto=format&fit=crop&q=80&w=800",
            ),
            CatalogEntry::new(
                "Jupiter",
                "The largest planet in our solar system",
                "Has the shortest day of all the planets.",
                "https://images.unsplash.com/photo-1614314107768-6018061b5b72?auto=format&fit=crop&q=80&w=800",
            ),
            CatalogEntry::new(
                "Saturn",
                "The ringed planet",
                "Could float in water because it is mostly made of gas.",
                "https://images.unsplash.com/photo-1614732414444-096e5f1122d5?auto=format&fit=crop&q=80&w=800",
            ),
            CatalogEntry::new(
                "Uranus",
                "The tilted ice giant",
                "Rotates on its side, like a rolling ball.",
                "https://images.unsplash.com/photo-1614728894747-a83421e2b9c9?auto=format&fit=crop&q=80&w=800",
            ),
            CatalogEntry::new(
                "Neptune",
                "The windiest planet",
                "Has the strongest winds in the solar system, reaching 1,200 mph.",
                "https://images.unsplash.com/photo-1614314107768-6018061b5b72?auto=format&fit=crop&q=80&w=800",
            ),
        ];
        let missions = vec![
            CatalogEntry::new(
                "Apollo 11",
                "First human Moon landing mission",
                "Neil Armstrong's first step on the Moon was watched by an estimated 600 million people.",
                "https://images.unsplash.com/photo-1541185933-ef5d8ed016c2?auto=format&fit=crop&q=80&w=800",
            ),
            CatalogEntry::new(
                "Voyager 1",
                "Farthest human-made object from Earth",
                "Voyager 1 carries a golden record with sounds and images of Earth.",
                "https://images.unsplash.com/photo-1446776811953-b23d57bd21aa?auto=format&fit=crop&q=80&w=800",
            ),
            CatalogEntry::new(
                "Hubble Space Telescope",
                "NASA's eye on the universe since 1990",
                "Hubble has made more than 1.5 million observations since its mission began.",
                "https://images.unsplash.com/photo-1543722530-d2c3201371e7?auto=format&fit=crop&q=80&w=800",
            ),
            CatalogEntry::new(
                "Mars Perseverance",
                "Latest Mars rover searching for ancient microbial life",
                "Perseverance carries a helicopter named Ingenuity, the first aircraft to fly on another planet.",
                "https://wp.technologyreview.com/wp-content/uploads/2021/04/nasa-mars-rover-perseverance.jpg?auto=format&fit=crop&q=80&w=800",
            ),
        ];

        Self { planets, missions }
    }
}

fn ensure_unique_names(category: Category, entries: &[CatalogEntry]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.name.as_str()) {
            return Err(CatalogError::DuplicateName {
                category: category.noun(),
                name: entry.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn entry(name: &str) -> CatalogEntry {
        CatalogEntry::new(name, "desc", "fact", "https://example.com/img.jpg")
    }

    #[test]
    fn builtin_catalog_has_eight_planets_and_four_missions() {
        let catalog = Catalog::solar_system();
        assert_eq!(catalog.planets().len(), 8);
        assert_eq!(catalog.missions().len(), 4);
        // Builtin data must satisfy the same invariants as loaded data.
        assert!(Catalog::new(catalog.planets().to_vec(), catalog.missions().to_vec()).is_ok());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Catalog::new(vec![entry("Mars"), entry("Mars")], vec![]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateName { category: "planet", ref name } if name == "Mars"
        ));
    }

    #[test]
    fn same_name_in_different_categories_is_allowed() {
        assert!(Catalog::new(vec![entry("Juno")], vec![entry("Juno")]).is_ok());
    }

    #[test]
    fn find_looks_up_by_category() {
        let catalog = Catalog::solar_system();
        assert!(catalog.find(Category::Planet, "Saturn").is_some());
        assert!(catalog.find(Category::Mission, "Saturn").is_none());
    }

    #[test]
    fn loads_catalog_from_json_file() {
        let path = std::env::temp_dir().join(format!("catalog-{}.json", std::process::id()));
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            r#"{{"planets":[{{"name":"Ceres","description":"A dwarf planet","funFact":"Lives in the asteroid belt.","imageUrl":"https://example.com/ceres.jpg"}}],"missions":[]}}"#
        )
        .unwrap();

        let catalog = Catalog::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(catalog.planets()[0].fun_fact, "Lives in the asteroid belt.");
        assert!(catalog.missions().is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Catalog::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
