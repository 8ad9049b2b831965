mod domain;
mod pancakes;
mod tile_puzzle;

pub use domain::{Cost, Domain, InvalidInput};
pub use pancakes::{Pancakes, PancakesState};
pub use tile_puzzle::{SlideDirection, TilePuzzle, TilePuzzleState};
