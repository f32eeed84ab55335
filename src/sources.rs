//! # Source discovery
//!
//! Browser families are configured as a list of path templates. A template
//! may reference well-known user directories (`{home}`, `{data}`,
//! `{local_data}`, `{config}`), environment variables (`${NAME}`), and `*`
//! wildcards inside single path components, which is how multiple browser
//! profiles are picked up (`User Data/Profile */History`).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::FamilyConfig;
use crate::parsers::timestamp::TimestampEncoding;

/// Table and columns to read from one family's history database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuerySpec {
    pub table: String,
    pub url_column: String,
    pub title_column: String,
    pub visit_count_column: String,
    /// Also the ordering column.
    pub last_visit_column: String,
    pub encoding: TimestampEncoding,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid SQL identifier {0:?}")]
pub struct InvalidIdentifier(pub String);

impl QuerySpec {
    /// Chromium-based browsers (`History` database).
    pub fn chromium() -> Self {
        Self {
            table: "urls".to_string(),
            url_column: "url".to_string(),
            title_column: "title".to_string(),
            visit_count_column: "visit_count".to_string(),
            last_visit_column: "last_visit_time".to_string(),
            encoding: TimestampEncoding::Webkit,
        }
    }

    /// Firefox (`places.sqlite`).
    pub fn firefox() -> Self {
        Self {
            table: "moz_places".to_string(),
            url_column: "url".to_string(),
            title_column: "title".to_string(),
            visit_count_column: "visit_count".to_string(),
            last_visit_column: "last_visit_date".to_string(),
            encoding: TimestampEncoding::Unix,
        }
    }

    /// Identifiers end up inside SQL text, so only plain names are accepted.
    pub fn validate(&self) -> Result<(), InvalidIdentifier> {
        for ident in [
            &self.table,
            &self.url_column,
            &self.title_column,
            &self.visit_count_column,
            &self.last_visit_column,
        ] {
            if !is_plain_identifier(ident) {
                return Err(InvalidIdentifier(ident.clone()));
            }
        }
        Ok(())
    }

    /// `?1` binds the row cap.
    pub fn select_sql(&self) -> String {
        format!(
            "SELECT \"{url}\", \"{title}\", \"{count}\", \"{last}\" FROM \"{table}\" \
             ORDER BY \"{last}\" DESC LIMIT ?1",
            url = self.url_column,
            title = self.title_column,
            count = self.visit_count_column,
            last = self.last_visit_column,
            table = self.table,
        )
    }
}

fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// One candidate database location. The path may not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub family: String,
    pub path: PathBuf,
    pub query: QuerySpec,
}

impl SourceDescriptor {
    /// Name of the directory holding the database, i.e. the browser profile.
    pub fn profile(&self) -> String {
        self.path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Values available to path templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    dirs: HashMap<String, PathBuf>,
    env: HashMap<String, String>,
}

impl TemplateContext {
    /// User directories from the OS plus the current environment.
    pub fn from_system() -> Self {
        let mut ctx = Self::default();
        let known = [
            ("home", dirs::home_dir()),
            ("data", dirs::data_dir()),
            ("local_data", dirs::data_local_dir()),
            ("config", dirs::config_dir()),
        ];
        for (name, dir) in known {
            if let Some(dir) = dir {
                ctx = ctx.with_dir(name, dir);
            }
        }
        for (key, value) in std::env::vars_os() {
            if let (Ok(key), Ok(value)) = (key.into_string(), value.into_string()) {
                ctx.env.insert(key, value);
            }
        }
        ctx
    }

    pub fn with_dir(mut self, name: &str, dir: impl Into<PathBuf>) -> Self {
        self.dirs.insert(name.to_string(), dir.into());
        self
    }

    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        self.env.insert(name.to_string(), value.to_string());
        self
    }

    /// Substitute placeholders. `Err` carries the placeholder that could not
    /// be resolved.
    pub fn expand(&self, template: &str) -> Result<String, String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(idx) = rest.find(['{', '$']) {
            out.push_str(&rest[..idx]);
            let tail = &rest[idx..];
            if let Some(body) = tail.strip_prefix("${") {
                let end = body.find('}').ok_or_else(|| tail.to_string())?;
                let name = &body[..end];
                let value = self.env.get(name).ok_or_else(|| format!("${{{name}}}"))?;
                out.push_str(value);
                rest = &body[end + 1..];
            } else if let Some(body) = tail.strip_prefix('{') {
                let end = body.find('}').ok_or_else(|| tail.to_string())?;
                let name = &body[..end];
                let dir = self
                    .dirs
                    .get(name)
                    .and_then(|d| d.to_str())
                    .ok_or_else(|| format!("{{{name}}}"))?;
                out.push_str(dir);
                rest = &body[end + 1..];
            } else {
                out.push('$');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Expand every path template of a family into descriptors, in template
/// order, without duplicates.
pub fn discover_family(family: &FamilyConfig, ctx: &TemplateContext) -> Vec<SourceDescriptor> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for template in &family.paths {
        let expanded = match ctx.expand(template) {
            Ok(path) => path,
            Err(missing) => {
                debug!("{}: unresolved {missing} in {template}", family.name);
                continue;
            }
        };
        for path in expand_wildcards(Path::new(&expanded)) {
            if seen.insert(path.clone()) {
                out.push(SourceDescriptor {
                    family: family.name.clone(),
                    path,
                    query: family.query.clone(),
                });
            }
        }
    }
    out
}

/// Resolve `*` components against the filesystem. Paths without wildcards
/// come back unchanged whether or not they exist.
pub fn expand_wildcards(path: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::new()];
    for component in path.components() {
        let part = component.as_os_str();
        let Some(pattern) = part.to_str().filter(|s| s.contains('*')) else {
            for candidate in &mut candidates {
                candidate.push(part);
            }
            continue;
        };

        let mut next = Vec::new();
        for base in &candidates {
            let dir = if base.as_os_str().is_empty() {
                Path::new(".")
            } else {
                base.as_path()
            };
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            let mut matched: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| {
                    entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| wildcard_match(pattern, name))
                })
                .map(|entry| base.join(entry.file_name()))
                .collect();
            matched.sort();
            next.extend(matched);
        }
        candidates = next;
    }
    candidates
}

fn wildcard_match(pattern: &str, name: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = name.strip_prefix(first) else {
        return false;
    };
    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}
