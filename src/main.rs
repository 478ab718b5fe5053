extern crate ht;

use ht::config;
use ht::input::{ControlDirection, ControlInfo};
use ht::loader::DiskLoader;
use ht::start::ht_start;

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let ht_config = config::read_ht_config()?;
    let loader = DiskLoader {
        data_path: ht_config.data_path.clone(),
    };

    // drive straight ahead for a while, then leave; real input devices
    // plug in behind the same trait
    let script = vec![
        ControlInfo {
            dir: ControlDirection::North,
            button1: false,
            button2: false,
        };
        70 * 10
    ];

    ht_start(&loader, ht_config, script)
}
