//! Domain models for the video game catalog.

mod video_game;

pub use video_game::{CreateVideoGame, UpdateVideoGame, VideoGame, VideoGameView, MAX_TEXT_LEN};
