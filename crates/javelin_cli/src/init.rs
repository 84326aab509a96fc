//! `javelin init`: write a starter `javelin.toml`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use javelin_config::CONFIG_FILE;

use crate::GlobalArgs;

/// Runs the `javelin init` command.
///
/// Writes `javelin.toml` into `dir` (created if missing), or into the current
/// directory. Refuses to overwrite an existing file.
pub fn run(dir: Option<PathBuf>, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let path = write_config(&project_dir)?;
    if !global.quiet {
        eprintln!("     Created {}", path.display());
    }
    Ok(0)
}

fn write_config(project_dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = project_dir.join(CONFIG_FILE);
    if path.exists() {
        return Err(format!("{} already exists", path.display()).into());
    }
    fs::create_dir_all(project_dir)?;

    let name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("app");
    write_new(&path, &template(name))?;
    Ok(path)
}

/// Creates `path`, failing if something appeared there since the check.
fn write_new(path: &Path, content: &str) -> io::Result<()> {
    use std::io::Write;
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(content.as_bytes())
}

fn template(name: &str) -> String {
    format!(
        r#"[project]
name = "{name}"
main = "Program"

[paths]
source = "."
output = "out"
cache = "compiler-cache"

[classpath]
# entries = ["lanterna-3.1.1.jar", "json-java.jar"]
entries = []

[build]
# jobs = 4
source_extensions = ["java"]

[cache]
prune = true

[toolchain]
javac = "javac"
java = "java"
javac_args = []
java_args = []
wait = false
"#
    )
}
