//! Data access layer.
//!
//! Repositories own every SQL statement the application issues and map
//! rows to domain models explicitly by column name.

mod video_game;

pub use video_game::VideoGameRepository;
