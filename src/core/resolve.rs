//! Item lookup for `kit add`.
//!
//! A bare item name may match a skill or a template of several kinds.
//! Lookup walks an explicit, ordered list of strategies and stops at the
//! first hit, so precedence is visible rather than dependent on directory
//! enumeration order.

use std::path::PathBuf;

use serde::Serialize;

use super::asset::{AssetStore, ContentKind, TemplateKind, file_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Skill,
    Template(TemplateKind),
}

/// Skills first, then agents, commands, hooks and MCP configs.
pub const DEFAULT_ORDER: [Strategy; 5] = [
    Strategy::Skill,
    Strategy::Template(TemplateKind::Agent),
    Strategy::Template(TemplateKind::Command),
    Strategy::Template(TemplateKind::Hook),
    Strategy::Template(TemplateKind::Mcp),
];

impl Strategy {
    /// A definite hit or miss for `name`.
    #[must_use]
    pub fn attempt(self, store: &AssetStore, name: &str) -> Option<ResolvedItem> {
        match self {
            Self::Skill => store.resolve_skill(name).map(|source| ResolvedItem {
                kind: ContentKind::Skills,
                name: name.to_string(),
                source,
            }),
            Self::Template(kind) => {
                let content_kind = kind.content_kind()?;
                store
                    .resolve_template(kind, name)
                    .map(|source| ResolvedItem {
                        kind: content_kind,
                        name: name.to_string(),
                        source,
                    })
            }
        }
    }
}

/// A lookup hit: where the asset lives and which kit slot it belongs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedItem {
    pub kind: ContentKind,
    pub name: String,
    pub source: PathBuf,
}

impl ResolvedItem {
    /// What the manifest records: the directory name for skills, the full
    /// filename (with extension) for everything else.
    #[must_use]
    pub fn reference(&self) -> String {
        match self.kind {
            ContentKind::Skills => self.name.clone(),
            _ => file_name(&self.source),
        }
    }
}

/// Try each strategy in `order`; first match wins.
#[must_use]
pub fn resolve_item(store: &AssetStore, name: &str, order: &[Strategy]) -> Option<ResolvedItem> {
    order.iter().find_map(|strategy| strategy.attempt(store, name))
}
