//! Configuration types deserialized from `javelin.toml`.
//!
//! Every section is optional. The defaults reproduce the layout of a plain
//! Java project built in place: sources in the project directory, classes in
//! `out/`, fingerprints in `compiler-cache/`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// The top-level project configuration parsed from `javelin.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project metadata (name, entry point).
    #[serde(default)]
    pub project: ProjectMeta,
    /// Source, output, and cache directories.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Dependency locations passed to every compile and to the launcher.
    #[serde(default)]
    pub classpath: ClasspathConfig,
    /// Build pass settings.
    #[serde(default)]
    pub build: BuildConfig,
    /// Fingerprint cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// External compiler and launcher commands.
    #[serde(default)]
    pub toolchain: ToolchainConfig,
}

/// Project metadata.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectMeta {
    /// The project name, used only for display.
    #[serde(default)]
    pub name: String,
    /// Fully qualified class to launch after a successful build.
    ///
    /// An empty string means the project has no entry point.
    #[serde(default = "default_main")]
    pub main: String,
}

impl Default for ProjectMeta {
    fn default() -> Self {
        Self {
            name: String::new(),
            main: default_main(),
        }
    }
}

fn default_main() -> String {
    "Program".to_string()
}

/// Directory layout. Relative paths resolve against the directory holding
/// `javelin.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Root of the source tree.
    #[serde(default = "default_source")]
    pub source: String,
    /// Root that compiled classes are written under.
    #[serde(default = "default_output")]
    pub output: String,
    /// Root of the fingerprint cache.
    #[serde(default = "default_cache")]
    pub cache: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
            cache: default_cache(),
        }
    }
}

fn default_source() -> String {
    ".".to_string()
}

fn default_output() -> String {
    "out".to_string()
}

fn default_cache() -> String {
    "compiler-cache".to_string()
}

/// Ordered classpath entries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClasspathConfig {
    /// Jar files or class directories, in lookup order.
    ///
    /// Accepts either a single string or a list of strings.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub entries: Vec<String>,
}

/// Build pass settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Maximum number of files compiled concurrently. Defaults to the
    /// machine's available parallelism.
    #[serde(default)]
    pub jobs: Option<usize>,
    /// File extensions (without the dot) treated as compilable sources.
    #[serde(default = "default_extensions", deserialize_with = "deserialize_string_or_vec")]
    pub source_extensions: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            jobs: None,
            source_extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["java".to_string()]
}

/// Fingerprint cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Remove records of deleted source files at the start of every pass.
    #[serde(default = "default_true")]
    pub prune: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { prune: true }
    }
}

fn default_true() -> bool {
    true
}

/// External compiler and launcher commands.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Compiler executable.
    #[serde(default = "default_javac")]
    pub javac: String,
    /// Launcher executable.
    #[serde(default = "default_java")]
    pub java: String,
    /// Extra arguments passed to every compiler invocation.
    #[serde(default)]
    pub javac_args: Vec<String>,
    /// Extra arguments passed to the launcher before the entry point.
    #[serde(default)]
    pub java_args: Vec<String>,
    /// Wait for the launched program to exit and report its status.
    #[serde(default)]
    pub wait: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            javac: default_javac(),
            java: default_java(),
            javac_args: Vec::new(),
            java_args: Vec::new(),
            wait: false,
        }
    }
}

fn default_javac() -> String {
    "javac".to_string()
}

fn default_java() -> String {
    "java".to_string()
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `entries = "lib.jar"` as well as `entries = ["a.jar", "b.jar"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
