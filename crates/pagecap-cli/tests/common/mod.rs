#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::TempDir;

pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

#[allow(dead_code)]
pub const SITE: &str = r#"
[[books]]
name = "docs"
copyright = { rights_holder = "ACME Books" }

[[pages]]
book = "docs"
path = "/"
allow_robots = false
copyright = { rights_holder = "ACME", rights = "All rights reserved", date_copyrighted = "2024" }
parents = ["/downloads/setup"]
children = ["/guide", "/downloads", { book = "archive", path = "/old" }]

[[pages]]
book = "docs"
path = "/guide"
allow_robots = true
parents = ["/"]
children = ["/guide/install"]

[[pages]]
book = "docs"
path = "/guide/install"
parents = ["/guide"]
children = ["/downloads"]
elements = [{ kind = "heading", content = "Install" }]

[[pages]]
book = "docs"
path = "/downloads"
parents = ["/", "/guide/install"]
copyright = { rights = "CC-BY" }
children = ["/downloads/setup"]

[[pages]]
book = "docs"
path = "/downloads/setup"
parents = ["/downloads"]
children = ["/"]
elements = [{ kind = "file", id = "setup.zip" }]
"#;

fn config_file() -> &'static Path {
    static CONFIG: OnceLock<(TempDir, PathBuf)> = OnceLock::new();
    let (_, path) = CONFIG.get_or_init(|| {
        let dir = tempfile::tempdir().expect("failed to create config dir for tests");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").expect("failed to write test config");
        (dir, path)
    });
    path
}

/// Create a `pagecap` command isolated from the user's configuration.
pub fn pagecap_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pagecap"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("PAGECAP_CONFIG", config_file());
    cmd.env_remove("PAGECAP_VERIFY_PARENT_CHILD");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Write `content` as a catalog file named `name` under `dir`.
#[allow(dead_code)]
pub fn write_catalog(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
