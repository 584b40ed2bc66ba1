//! Test fixtures for configuration and dependency graph files.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A sample `modgraph.toml`.
#[derive(Clone, Debug)]
pub struct ConfigFixture {
    pub content: String,
    pub name: String,
}

impl ConfigFixture {
    /// Application modules with a commons family, a skipped legacy module and
    /// a global `junit` exclude.
    ///
    /// Pairs with [`GraphFixture::basic`].
    pub fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            content: r#"
slot-strategy = "version-major"

[[exclude]]
group-id = "junit"

[[module]]
name = "app"
main-class = "org.example.Main"

[[module.include]]
group-id = "org\\.example"

[[module.dependency]]
name = "javax.api"
slot = "main"
services = "import"

[[module]]
name = "org.apache.commons"

[[module.include]]
group-id = "org\\.apache\\.commons"

[[module.include]]
group-id = "commons-.*"

[[module]]
name = "legacy"
skip = true

[[module.include]]
group-id = "org\\.legacy"
"#
            .trim()
            .to_string(),
        }
    }

    /// A module whose group pattern does not compile.
    pub fn invalid_pattern() -> Self {
        Self {
            name: "invalid_pattern".to_string(),
            content: r#"
[[module]]
name = "broken"

[[module.include]]
group-id = "org.(broken"
"#
            .trim()
            .to_string(),
        }
    }

    /// A module without a name.
    pub fn missing_name() -> Self {
        Self {
            name: "missing_name".to_string(),
            content: r#"
[[module]]
slot = "main"

[[module.include]]
group-id = "org\\.example"
"#
            .trim()
            .to_string(),
        }
    }

    /// Malformed TOML.
    pub fn invalid_syntax() -> Self {
        Self {
            name: "invalid_syntax".to_string(),
            content: "[[module]\nname = ".to_string(),
        }
    }

    /// Writes the fixture as `modgraph.toml` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("modgraph.toml");
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write config fixture '{}'", self.name))?;
        Ok(path)
    }
}

/// A sample dependency graph file.
#[derive(Clone, Debug)]
pub struct GraphFixture {
    pub content: String,
    pub name: String,
}

impl GraphFixture {
    /// An application with a test-scoped `junit` root, an optional `slf4j`
    /// edge that is also reached as required, and a legacy artifact.
    pub fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            content: r#"
roots = [
    "org.example:app:1.2.0",
    { coordinates = "junit:junit:4.13.2", scope = "test" },
]

[[artifact]]
coordinates = "org.example:app:1.2.0"
dependencies = [
    "org.example:app-core:1.2.0",
    "org.apache.commons:commons-lang3:3.12.0",
    { coordinates = "org.slf4j:slf4j-api:1.7.36", optional = true },
    "org.legacy:old:0.9",
]

[[artifact]]
coordinates = "org.example:app-core:1.2.0"
dependencies = [
    "commons-io:commons-io:2.11.0",
    "org.slf4j:slf4j-api:1.7.36",
]

[[artifact]]
coordinates = "junit:junit:4.13.2"
dependencies = ["org.hamcrest:hamcrest-core:1.3"]
"#
            .trim()
            .to_string(),
        }
    }

    /// A root that is not part of the graph.
    pub fn unknown_root() -> Self {
        Self {
            name: "unknown_root".to_string(),
            content: r#"
roots = ["org.example:missing:1.0"]

[[artifact]]
coordinates = "org.example:app:1.0"
"#
            .trim()
            .to_string(),
        }
    }

    /// Writes the fixture as `graph.toml` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("graph.toml");
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write graph fixture '{}'", self.name))?;
        Ok(path)
    }
}
