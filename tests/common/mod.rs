//! Shared fixtures for binary integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const SAMPLE_CONFIG: &str = r#"
[instances.production]
name = "mysite"
branch = "main"
repository = "git@example.com:org/mysite.git"
servers = ["web1.example.com", "web2.example.com"]
server_user = "deploy"
code_path = "/var/django/html"
venv_python_path = "/usr/bin/python3"
settings_module = "config.settings.production"
requirements = "requirements/production.txt"
save_deploys = 2

[instances.qa]
name = "mysite"
branch = "develop"
repository = "git@example.com:org/mysite.git"
servers = ["qa1.example.com"]
server_user = "deploy"
code_path = "/var/django/html"
venv_python_path = "/usr/bin/python3"
settings_module = "config.settings.qa"
pip_command = "mysite[qa]==1.0.0"
"#;

/// Write the sample config as `cutover.toml` in `dir`.
pub fn write_config(dir: &Path) -> PathBuf {
    write_config_content(dir, SAMPLE_CONFIG)
}

pub fn write_config_content(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("cutover.toml");
    fs::write(&path, content).unwrap();
    path
}

/// Command for the built binary, rooted in `dir` with a scratch config home
/// so the developer's own ~/.config/cutover is never picked up.
pub fn cutover_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cutover"));
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd
}
