use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::from_str;

use crate::session::Move;

static DRILL_DIR: Dir = include_dir!("src/drills");

pub const DEFAULT_DIFFICULTY: &str = "beginner";

/// A named, ordered move sequence for one category/difficulty pair.
#[derive(Debug, Clone, Deserialize)]
pub struct Drill {
    pub name: String,
    pub category: String,
    pub difficulty: String,
    pub moves: Vec<Move>,
}

impl Drill {
    /// Load the drill for `category`/`difficulty`. A difficulty without a
    /// file falls back to the category's beginner drill; a category with no
    /// readable file at all yields an empty drill, which session
    /// configuration then rejects.
    pub fn load(category: &str, difficulty: &str) -> Self {
        read_drill_file(&drill_file_name(category, difficulty))
            .or_else(|| read_drill_file(&drill_file_name(category, DEFAULT_DIFFICULTY)))
            .unwrap_or_else(|| {
                log::warn!("no drill available for {category}/{difficulty}");
                Self {
                    name: format!("{category} ({difficulty})"),
                    category: category.to_string(),
                    difficulty: difficulty.to_string(),
                    moves: Vec::new(),
                }
            })
    }

    /// The move order as authored.
    pub fn ordered_moves(&self) -> Vec<Move> {
        self.moves.clone()
    }

    /// A shuffled copy of the move order.
    pub fn shuffled_moves(&self) -> Vec<Move> {
        let mut moves = self.moves.clone();
        moves.shuffle(&mut rand::thread_rng());
        moves
    }
}

/// Every drill shipped in the embedded catalog, in file order.
pub fn catalog() -> Vec<Drill> {
    DRILL_DIR
        .files()
        .filter_map(|file| file.contents_utf8())
        .filter_map(|text| from_str::<Drill>(text).ok())
        .collect()
}

fn drill_file_name(category: &str, difficulty: &str) -> String {
    format!("{category}_{difficulty}.json")
}

fn read_drill_file(file_name: &str) -> Option<Drill> {
    let file = DRILL_DIR.get_file(file_name)?;
    let text = file.contents_utf8()?;
    match from_str(text) {
        Ok(drill) => Some(drill),
        Err(err) => {
            log::warn!("unreadable drill file {file_name}: {err}");
            None
        }
    }
}
