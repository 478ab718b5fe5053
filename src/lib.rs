#![crate_name = "ht"]
#![crate_type = "lib"]

pub mod act;
pub mod agent;
pub mod assets;
pub mod config;
pub mod def;
pub mod draw;
pub mod fixed;
pub mod game;
pub mod input;
pub mod loader;
pub mod play;
pub mod rnd;
pub mod scale;
pub mod start;
pub mod state;
pub mod time;
pub mod util;
pub mod vid;
