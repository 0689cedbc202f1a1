//! Keyword-based scientific domain classification.
//!
//! Each item gets an optional [`Domain`] badge by counting keyword hits in
//! its title and summary. The domain with the highest non-zero count wins;
//! no hits means no badge. Classification is display-only and never feeds
//! into dedupe or ranking.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Astronomy,
    Biology,
    Climate,
}

impl Domain {
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Astronomy => "Astronomy",
            Domain::Biology => "Biology",
            Domain::Climate => "Climate",
        }
    }
}

static KEYWORDS: Lazy<Vec<(Domain, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (
            Domain::Astronomy,
            vec![
                "space", "planet", "star", "galaxy", "moon", "mars", "nasa", "asteroid",
                "comet", "telescope", "orbit", "solar", "cosmic", "universe", "black hole",
                "supernova", "nebula", "spacecraft", "rocket", "satellite", "exoplanet",
                "astronomy", "astronaut", "meteor", "jupiter", "saturn", "venus", "mercury",
                "neptune", "uranus", "milky way", "hubble", "webb", "lunar", "launch",
            ],
        ),
        (
            Domain::Biology,
            vec![
                "animal", "species", "cell", "dna", "gene", "evolution", "fossil",
                "dinosaur", "bacteria", "virus", "protein", "organism", "ecosystem",
                "wildlife", "plant", "insect", "mammal", "bird", "fish", "marine",
                "biodiversity", "extinction", "endangered", "habitat", "genetics",
                "enzyme", "microbe", "biology", "predator", "brain", "neuron",
                "disease", "infection", "immune", "coral", "reef", "forest",
            ],
        ),
        (
            Domain::Climate,
            vec![
                "climate", "weather", "temperature", "warming", "carbon", "emission",
                "greenhouse", "glacier", "arctic", "antarctic", "sea level", "drought",
                "flood", "hurricane", "storm", "atmosphere", "pollution", "renewable",
                "fossil fuel", "heat wave", "wildfire", "deforestation", "methane",
                "ozone", "el nino", "rainfall", "permafrost", "environmental",
                "sustainability", "conservation",
            ],
        ),
    ]
});

/// Classify an item by keyword hits in its title and summary. Returns `None`
/// when no domain keyword matches.
pub fn classify(title: &str, summary: Option<&str>) -> Option<Domain> {
    let text = format!("{} {}", title, summary.unwrap_or_default()).to_lowercase();

    let mut best: Option<(Domain, usize)> = None;
    for (domain, keywords) in KEYWORDS.iter() {
        let hits = keywords.iter().filter(|kw| text.contains(*kw)).count();
        if hits > 0 && best.is_none_or(|(_, b)| hits > b) {
            best = Some((*domain, hits));
        }
    }
    best.map(|(d, _)| d)
}
