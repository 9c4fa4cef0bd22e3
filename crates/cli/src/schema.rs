use anyhow::{Context, Result, bail};
use argweave::{ArgKind, ArgSpec, ParserConfig, ValueType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SCHEMA_NAME: &str = "argweave.json";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,

    pub command: CommandDef,
}

/// One command level: its arguments and the subcommands its leftover tokens
/// may be dispatched to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDef {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,

    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub args: Vec<ArgSpec>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub subcommands: IndexMap<String, CommandDef>,
}

impl CommandSchema {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read schema: {}", path.display()))?;
        let schema: CommandSchema = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse schema JSON: {}", path.display()))?;
        schema
            .validate()
            .with_context(|| format!("invalid schema: {}", path.display()))?;
        Ok(schema)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(version) = self.schema_version {
            if version > SCHEMA_VERSION {
                bail!("unsupported schemaVersion {version} (latest is {SCHEMA_VERSION})");
            }
        }
        self.command.validate()
    }
}

impl CommandDef {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("command name must not be empty");
        }

        let mut seen = HashSet::new();
        for arg in &self.args {
            if arg.name.trim().is_empty() {
                bail!("command `{}` has an argument with an empty name", self.name);
            }
            if !seen.insert(arg.name.as_str()) {
                bail!("command `{}` declares `{}` twice", self.name, arg.name);
            }
            arg.value_type
                .scalar_type(&arg.name)
                .with_context(|| format!("in command `{}`", self.name))?;
        }

        let variadic_keywords = self
            .args
            .iter()
            .filter(|a| a.kind == ArgKind::VariadicKeyword)
            .count();
        if variadic_keywords > 1 {
            bail!(
                "command `{}` declares {variadic_keywords} variadic-keyword arguments; at most one is allowed",
                self.name
            );
        }

        if !self.subcommands.is_empty() && self.dispatch_arg().is_none() {
            bail!(
                "command `{}` has subcommands but no positional argument to select one",
                self.name
            );
        }

        for (key, sub) in &self.subcommands {
            if key != &sub.name {
                bail!(
                    "subcommand key `{key}` does not match its name `{}`",
                    sub.name
                );
            }
            sub.validate()?;
        }
        Ok(())
    }

    /// The positional argument whose value names the subcommand to run.
    pub fn dispatch_arg(&self) -> Option<&ArgSpec> {
        self.args.iter().find(|a| a.kind.accepts_positional())
    }
}

/// Write a starter schema into `project_dir`. Fails if one already exists.
pub fn write_default_schema(project_dir: &Path, name: Option<&str>) -> Result<PathBuf> {
    let dest = project_dir.join(DEFAULT_SCHEMA_NAME);
    if dest.exists() {
        bail!("{DEFAULT_SCHEMA_NAME} already exists in {}", project_dir.display());
    }

    let name = name
        .map(str::to_string)
        .or_else(|| guess_project_name(project_dir))
        .unwrap_or_else(|| "my-cli".to_string());
    let schema = starter_schema(name);

    let bytes = serde_json::to_vec_pretty(&schema).context("failed to serialize schema")?;
    let mut out = String::from_utf8(bytes).context("schema is not valid UTF-8")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}

fn starter_schema(name: String) -> CommandSchema {
    let rot = CommandDef {
        name: "rot".to_string(),
        doc: "performs a rot cipher on a file".to_string(),
        args: vec![
            ArgSpec::positional("ifile")
                .alias("i")
                .ty(ValueType::Str)
                .required(true)
                .doc("The input file"),
            ArgSpec::positional("ofile")
                .alias("o")
                .ty(ValueType::Str)
                .doc("The output file"),
            ArgSpec::keyword("rot")
                .ty(ValueType::Int)
                .default_value(13i64)
                .doc("Rotation amount"),
        ],
        ..Default::default()
    };

    CommandSchema {
        schema_version: Some(SCHEMA_VERSION),
        command: CommandDef {
            name,
            args: vec![
                ArgSpec::positional_only("command").required(true),
                ArgSpec::flag("verbose").alias("v"),
            ],
            subcommands: IndexMap::from([("rot".to_string(), rot)]),
            ..Default::default()
        },
    }
}

fn guess_project_name(project_dir: &Path) -> Option<String> {
    let file_name = project_dir.file_name().and_then(|s| s.to_str());
    let direct = file_name.filter(|s| !s.is_empty() && *s != "." && *s != "..");
    if let Some(name) = direct {
        return Some(name.to_string());
    }

    let cwd = std::env::current_dir().ok()?;
    cwd.file_name()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(|s| s.to_string())
}
