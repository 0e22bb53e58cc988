//! Kept in its own test binary: it mutates the process environment.

use gameclock::prelude::*;
use std::io::Write;

#[test]
fn environment_overrides_the_update_interval() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(b"name = \"Env\"\nupdate_interval = 100\n").unwrap();

    std::env::set_var("GAMECLOCK_UPDATE_INTERVAL", "250");
    let config = ClockConfig::load(file.path());
    std::env::remove_var("GAMECLOCK_UPDATE_INTERVAL");

    let config = config.unwrap();
    assert_eq!(config.update_interval, 250);
    assert_eq!(config.name.as_deref(), Some("Env"));
}
