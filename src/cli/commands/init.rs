//! Init command handler

use crate::config::Config;

pub fn cmd_init() -> anyhow::Result<u8> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml with default settings.");
    } else {
        println!("config.toml already exists, left unchanged.");
    }
    Ok(0)
}
