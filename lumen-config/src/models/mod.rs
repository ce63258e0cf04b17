pub mod player;
pub mod sections;
