use log::{debug, warn};
use strum::Display;

use crate::{CatalogID, WeeklyPlan};

#[allow(async_fn_in_trait)]
pub trait ExerciseCatalog {
    /// Entries whose name matches `query`, best match first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogEntry>, CatalogError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: CatalogID,
    pub name: String,
    pub category: Category,
    pub equipment: Equipment,
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Category {
    Strength,
    Plyometrics,
    Core,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Equipment {
    #[strum(to_string = "body weight")]
    None,
    #[strum(to_string = "barbell")]
    Barbell,
    #[strum(to_string = "cable")]
    Cable,
    #[strum(to_string = "dumbbell")]
    Dumbbell,
    #[strum(to_string = "kettlebell")]
    Kettlebell,
    #[strum(to_string = "machine")]
    Machine,
    #[strum(to_string = "pull-up bar")]
    PullUpBar,
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("exercise catalog unavailable")]
    Unavailable,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Attach the best catalog match to every exercise without a catalog
/// reference.
///
/// Enrichment is best effort. Exercises without a match, or whose lookup
/// fails, are left as they are.
pub async fn enrich_plan(catalog: &impl ExerciseCatalog, plan: &WeeklyPlan) -> WeeklyPlan {
    let mut plan = plan.clone();
    for exercise in plan
        .days
        .iter_mut()
        .flat_map(|d| d.exercises.iter_mut())
        .filter(|e| e.exercise_db_id.is_none())
    {
        match catalog.search(exercise.name.as_ref(), 1).await {
            Ok(entries) => {
                if let Some(entry) = entries.into_iter().next() {
                    debug!("matched {} to catalog entry {}", exercise.name, entry.id);
                    exercise.exercise_db_id = Some(entry.id);
                }
            }
            Err(err) => {
                warn!("catalog search for {} failed: {err}", exercise.name);
            }
        }
    }
    plan
}

/// Catalog backed by a built-in list of common exercises.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticCatalog;

impl StaticCatalog {
    #[must_use]
    pub fn entries() -> impl Iterator<Item = CatalogEntry> {
        ENTRIES.iter().map(StaticEntry::to_entry)
    }

    /// Rank entries containing every word of `query`: exact matches first,
    /// then prefix matches, then by name.
    #[must_use]
    pub fn find(query: &str, limit: usize) -> Vec<CatalogEntry> {
        let query = query.trim().to_lowercase();
        let words = query.split_whitespace().collect::<Vec<_>>();
        if words.is_empty() {
            return vec![];
        }

        let mut matches = ENTRIES
            .iter()
            .filter_map(|e| {
                let name = e.name.to_lowercase();
                if !words.iter().all(|w| name.contains(w)) {
                    return None;
                }
                let rank = if name == query {
                    0
                } else if name.starts_with(&query) {
                    1
                } else {
                    2
                };
                Some((rank, e))
            })
            .collect::<Vec<_>>();
        matches.sort_by(|(a_rank, a), (b_rank, b)| a_rank.cmp(b_rank).then(a.name.cmp(b.name)));
        matches
            .into_iter()
            .take(limit)
            .map(|(_, e)| e.to_entry())
            .collect()
    }
}

impl ExerciseCatalog for StaticCatalog {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(Self::find(query, limit))
    }
}

struct StaticEntry {
    id: &'static str,
    name: &'static str,
    category: Category,
    equipment: Equipment,
    instructions: &'static [&'static str],
}

impl StaticEntry {
    fn to_entry(&self) -> CatalogEntry {
        CatalogEntry {
            id: CatalogID::from(self.id),
            name: self.name.to_string(),
            category: self.category,
            equipment: self.equipment,
            instructions: self.instructions.iter().map(ToString::to_string).collect(),
        }
    }
}

const ENTRIES: [StaticEntry; 20] = [
    StaticEntry {
        id: "0001",
        name: "Squat",
        category: Category::Strength,
        equipment: Equipment::Barbell,
        instructions: &[
            "Rest the bar on your upper back.",
            "Sit down until your hips are below your knees.",
            "Drive back up to standing.",
        ],
    },
    StaticEntry {
        id: "0002",
        name: "Front Squat",
        category: Category::Strength,
        equipment: Equipment::Barbell,
        instructions: &[
            "Rest the bar on your front delts with elbows high.",
            "Squat down keeping your torso upright.",
        ],
    },
    StaticEntry {
        id: "0003",
        name: "Bench Press",
        category: Category::Strength,
        equipment: Equipment::Barbell,
        instructions: &[
            "Lower the bar to your mid chest.",
            "Press it back up until your arms are straight.",
        ],
    },
    StaticEntry {
        id: "0004",
        name: "Incline Bench Press",
        category: Category::Strength,
        equipment: Equipment::Barbell,
        instructions: &[
            "Set the bench to 30 to 45 degrees.",
            "Lower the bar to your upper chest and press.",
        ],
    },
    StaticEntry {
        id: "0005",
        name: "Dumbbell Bench Press",
        category: Category::Strength,
        equipment: Equipment::Dumbbell,
        instructions: &["Press the dumbbells from chest level until your arms are straight."],
    },
    StaticEntry {
        id: "0006",
        name: "Deadlift",
        category: Category::Strength,
        equipment: Equipment::Barbell,
        instructions: &[
            "Grip the bar just outside your legs.",
            "Stand up with a neutral spine.",
        ],
    },
    StaticEntry {
        id: "0007",
        name: "Romanian Deadlift",
        category: Category::Strength,
        equipment: Equipment::Barbell,
        instructions: &["Hinge at the hips with soft knees until you feel a stretch."],
    },
    StaticEntry {
        id: "0008",
        name: "Overhead Press",
        category: Category::Strength,
        equipment: Equipment::Barbell,
        instructions: &["Press the bar from your shoulders to lockout overhead."],
    },
    StaticEntry {
        id: "0009",
        name: "Dumbbell Shoulder Press",
        category: Category::Strength,
        equipment: Equipment::Dumbbell,
        instructions: &["Press the dumbbells overhead from shoulder height."],
    },
    StaticEntry {
        id: "0010",
        name: "Barbell Row",
        category: Category::Strength,
        equipment: Equipment::Barbell,
        instructions: &["Hinge forward and pull the bar to your lower chest."],
    },
    StaticEntry {
        id: "0011",
        name: "Cable Row",
        category: Category::Strength,
        equipment: Equipment::Cable,
        instructions: &["Pull the handle to your torso while keeping your chest up."],
    },
    StaticEntry {
        id: "0012",
        name: "Pull-up",
        category: Category::Strength,
        equipment: Equipment::PullUpBar,
        instructions: &["Pull your chin over the bar from a dead hang."],
    },
    StaticEntry {
        id: "0013",
        name: "Lat Pulldown",
        category: Category::Strength,
        equipment: Equipment::Cable,
        instructions: &["Pull the bar to your upper chest."],
    },
    StaticEntry {
        id: "0014",
        name: "Dip",
        category: Category::Strength,
        equipment: Equipment::None,
        instructions: &["Lower yourself until your shoulders are below your elbows."],
    },
    StaticEntry {
        id: "0015",
        name: "Barbell Hip Thrust",
        category: Category::Strength,
        equipment: Equipment::Barbell,
        instructions: &["Drive your hips up until your torso is parallel to the floor."],
    },
    StaticEntry {
        id: "0016",
        name: "Leg Press",
        category: Category::Strength,
        equipment: Equipment::Machine,
        instructions: &["Lower the sled until your knees reach 90 degrees and press."],
    },
    StaticEntry {
        id: "0017",
        name: "Kettlebell Swing",
        category: Category::Strength,
        equipment: Equipment::Kettlebell,
        instructions: &["Hinge and snap your hips to swing the bell to chest height."],
    },
    StaticEntry {
        id: "0018",
        name: "Box Jump",
        category: Category::Plyometrics,
        equipment: Equipment::None,
        instructions: &["Jump onto the box and land softly."],
    },
    StaticEntry {
        id: "0019",
        name: "Plank",
        category: Category::Core,
        equipment: Equipment::None,
        instructions: &["Hold a straight line from head to heels."],
    },
    StaticEntry {
        id: "0020",
        name: "Farmer's Carry",
        category: Category::Strength,
        equipment: Equipment::Dumbbell,
        instructions: &["Walk with a heavy weight in each hand."],
    },
];
