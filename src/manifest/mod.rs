/*!
manifest - declarative command definitions compiled into a `CommandTree`.

A manifest is plain data (YAML or JSON):

```yaml
description: demo
commands:
  - name: MyCommand
    subcommands:
      - expression: "say ${message}"
        params: { message: string }
        examples: { message: [hello, hi] }
        deny: { message: [forbidden] }
        reply: "you said ${message}"
      - expression: "sum ${first} ${second}"
        params: { first: int, second: int }
```

Compilation (`compile`) is a pure function of the manifest, the converter
registry and an executor factory:
  - every command becomes a node below the root (literal match on its name)
  - every subcommand becomes its own chain below that node; chains are never
    merged, so sibling order decides which chain a token goes down first
  - literal tokens match exactly and suggest themselves
  - `${name}` placeholders convert the token with the declared type and store
    the value under `name`; a failed conversion rejects the token
  - `examples` feed completion for a placeholder; `deny` blocks execution
    when the placeholder token is listed
  - the last node of a chain receives the executor built by the factory
*/

pub mod convert;

use std::path::Path;
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::command::{
    BuildError, CommandContext, CommandTree, Executor, NodeId, TreeBuilder, acceptors, examples,
    interceptors,
};
use crate::{log_debug, log_trace};

pub use convert::{ArgValue, ConvertError, Converter, ConverterRegistry};

/* ---- Errors ---- */

pub type Result<T> = std::result::Result<T, ManifestError>;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse YAML manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("command '{command}' has an empty subcommand expression")]
    EmptyExpression { command: String },

    #[error("placeholder '{name}' in '{expression}' has no declared param type")]
    UndeclaredPlaceholder { expression: String, name: String },

    #[error("'{expression}' references unknown placeholder '{name}'")]
    UnknownPlaceholder { expression: String, name: String },

    #[error("param '{name}' in '{expression}' uses unsupported type '{ty}'")]
    UnknownType {
        expression: String,
        name: String,
        ty: String,
    },

    #[error("malformed placeholder '{token}' in '{expression}'")]
    MalformedPlaceholder { expression: String, token: String },
}

/* ---- Data model ---- */

fn default_description() -> String {
    "root".to_string()
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Description of the tree root.
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default)]
    pub commands: Vec<CommandDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDef {
    /// First token of every line handled by this command.
    pub name: String,
    #[serde(default)]
    pub subcommands: Vec<SubcommandDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcommandDef {
    /// Whitespace-separated tokens; `${name}` marks a placeholder.
    pub expression: String,
    /// Placeholder name -> value type name (see `ConverterRegistry`).
    #[serde(default)]
    pub params: IndexMap<String, String>,
    /// Placeholder name -> completion suggestions.
    #[serde(default)]
    pub examples: IndexMap<String, Vec<String>>,
    /// Placeholder name -> tokens whose execution is blocked.
    #[serde(default)]
    pub deny: IndexMap<String, Vec<String>>,
    /// Reply template rendered by `reply_executor`.
    #[serde(default)]
    pub reply: Option<String>,
    /// Value returned by `reply_executor`.
    #[serde(default = "default_success")]
    pub success: bool,
}

impl Manifest {
    /// Load from disk: `.yaml` / `.yml` as YAML, anything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let lower = path.to_string_lossy().to_ascii_lowercase();
        if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            Self::from_yaml_str(&raw)
        } else {
            Self::from_json_str(&raw)
        }
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/* ---- Expressions ---- */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Placeholder(String),
}

impl Token {
    /// Text used as the node description.
    pub fn description(&self) -> String {
        match self {
            Token::Literal(s) => s.clone(),
            Token::Placeholder(name) => format!("${{{name}}}"),
        }
    }
}

pub fn parse_expression(expression: &str) -> Result<Vec<Token>> {
    expression
        .split_whitespace()
        .map(|raw| {
            if let Some(inner) = raw.strip_prefix("${").and_then(|r| r.strip_suffix('}')) {
                let name = inner.trim();
                if name.is_empty() || name.contains(['$', '{', '}']) {
                    return Err(ManifestError::MalformedPlaceholder {
                        expression: expression.to_string(),
                        token: raw.to_string(),
                    });
                }
                Ok(Token::Placeholder(name.to_string()))
            } else if raw.contains("${") {
                Err(ManifestError::MalformedPlaceholder {
                    expression: expression.to_string(),
                    token: raw.to_string(),
                })
            } else {
                Ok(Token::Literal(raw.to_string()))
            }
        })
        .collect()
}

/* ---- Compilation ---- */

/// Build a tree from `manifest`. `executor_for` is called once per subcommand
/// and its executor is attached to the last node of that subcommand's chain.
pub fn compile<F>(
    manifest: &Manifest,
    registry: &ConverterRegistry,
    mut executor_for: F,
) -> Result<CommandTree>
where
    F: FnMut(&CommandDef, &SubcommandDef) -> Executor,
{
    let mut builder = TreeBuilder::new(manifest.description.clone())?;
    let root = builder.root();

    for command in &manifest.commands {
        let head = literal_node(&mut builder, &command.name)?;
        builder.sub_command(root, head)?;

        for sub in &command.subcommands {
            let tokens = parse_expression(&sub.expression)?;
            if tokens.is_empty() {
                return Err(ManifestError::EmptyExpression {
                    command: command.name.clone(),
                });
            }
            check_references(sub, &tokens)?;

            let mut parent = head;
            for token in &tokens {
                let id = match token {
                    Token::Literal(text) => literal_node(&mut builder, text)?,
                    Token::Placeholder(name) => {
                        placeholder_node(&mut builder, registry, sub, name)?
                    }
                };
                builder.sub_command(parent, id)?;
                parent = id;
            }
            builder.node(parent).executor(executor_for(command, sub));
            log_debug!(
                "[manifest] compiled '{} {}' ({} token(s))",
                command.name,
                sub.expression,
                tokens.len()
            );
        }
    }
    Ok(builder.finish())
}

fn literal_node(builder: &mut TreeBuilder, text: &str) -> Result<NodeId> {
    let id = builder.command(text)?;
    builder
        .node(id)
        .example_provider(examples::singleton(text))
        .argument_acceptor(acceptors::equals(text));
    Ok(id)
}

fn placeholder_node(
    builder: &mut TreeBuilder,
    registry: &ConverterRegistry,
    sub: &SubcommandDef,
    name: &str,
) -> Result<NodeId> {
    let ty = sub
        .params
        .get(name)
        .ok_or_else(|| ManifestError::UndeclaredPlaceholder {
            expression: sub.expression.clone(),
            name: name.to_string(),
        })?;
    let converter = registry
        .find(ty)
        .ok_or_else(|| ManifestError::UnknownType {
            expression: sub.expression.clone(),
            name: name.to_string(),
            ty: ty.clone(),
        })?;

    let id = builder.command(Token::Placeholder(name.to_string()).description())?;
    let key = name.to_string();
    let ty = ty.clone();
    builder
        .node(id)
        .argument_acceptor(move |ctx: &mut CommandContext| {
            match converter(ctx.argument()) {
                Ok(value) => {
                    ctx.put(key.clone(), value);
                    true
                }
                Err(e) => {
                    log_trace!("[manifest](${{{key}}}) cannot convert to {ty}: {e}");
                    false
                }
            }
        });
    if let Some(suggestions) = sub.examples.get(name) {
        builder
            .node(id)
            .example_provider(examples::collection(suggestions.clone()));
    }
    if let Some(denied) = sub.deny.get(name) {
        let denied = denied.clone();
        builder
            .node(id)
            .action_interceptor(interceptors::on_execute(move |ctx| {
                denied.iter().any(|d| d == ctx.argument())
            }));
    }
    Ok(id)
}

fn check_references(sub: &SubcommandDef, tokens: &[Token]) -> Result<()> {
    let placeholders: Vec<&str> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Placeholder(name) => Some(name.as_str()),
            Token::Literal(_) => None,
        })
        .collect();
    for name in sub.examples.keys().chain(sub.deny.keys()) {
        if !placeholders.contains(&name.as_str()) {
            return Err(ManifestError::UnknownPlaceholder {
                expression: sub.expression.clone(),
                name: name.clone(),
            });
        }
    }
    for name in sub.params.keys() {
        if !placeholders.contains(&name.as_str()) {
            log_debug!(
                "[manifest] param '{name}' of '{}' is never used",
                sub.expression
            );
        }
    }
    Ok(())
}

/* ---- Replies ---- */

/// Substitute `${name}` with the converted value stored under `name`.
/// Unknown placeholders are left untouched.
pub fn render_reply(template: &str, ctx: &CommandContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = after[..end].trim();
        match (!name.is_empty()).then(|| ctx.get::<ArgValue>(name)).flatten() {
            Some(value) => out.push_str(&value.to_string()),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Collected replies of executed subcommands.
pub type ReplySink = Arc<Mutex<Vec<String>>>;

/// Executor that renders `sub.reply` (if any) into `sink` and returns `sub.success`.
pub fn reply_executor(sub: &SubcommandDef, sink: ReplySink) -> Executor {
    let template = sub.reply.clone();
    let success = sub.success;
    Box::new(move |ctx: &mut CommandContext| {
        if let Some(template) = &template {
            let line = render_reply(template, ctx);
            match sink.lock() {
                Ok(mut replies) => replies.push(line),
                Err(poisoned) => poisoned.into_inner().push(line),
            }
        }
        success
    })
}

/* ---- Tests ---- */
