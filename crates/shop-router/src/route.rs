//! Declarative route tree and path matching.

use std::collections::{BTreeMap, HashSet};

use crate::location::{decode, Location};
use crate::RouteError;

/// Reference to a view the rendering layer loads on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewRef(pub &'static str);

/// Authorization requirements attached to a route.
///
/// Unset flags inherit from the parent record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub auth: Option<bool>,
    pub admin: Option<bool>,
}

impl RouteMeta {
    /// Target needs a signed-in user.
    pub fn requires_auth(&self) -> bool {
        self.auth.unwrap_or(false)
    }

    /// Target needs an administrator.
    pub fn requires_admin(&self) -> bool {
        self.admin.unwrap_or(false)
    }

    /// Either requirement is set.
    pub fn is_protected(&self) -> bool {
        self.requires_auth() || self.requires_admin()
    }

    /// Child values override parent values.
    fn inherit(self, parent: RouteMeta) -> RouteMeta {
        RouteMeta {
            auth: self.auth.or(parent.auth),
            admin: self.admin.or(parent.admin),
        }
    }
}

/// A node of the route tree as declared by the application.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    /// Path pattern, relative to the parent unless it starts with `/`.
    pub path: String,
    pub name: Option<String>,
    pub view: ViewRef,
    pub meta: RouteMeta,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(path: impl Into<String>, view: &'static str) -> Self {
        Self {
            path: path.into(),
            name: None,
            view: ViewRef(view),
            meta: RouteMeta::default(),
            children: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn requires_auth(mut self) -> Self {
        self.meta.auth = Some(true);
        self
    }

    pub fn requires_admin(mut self) -> Self {
        self.meta.admin = Some(true);
        self
    }

    pub fn children(mut self, children: Vec<RouteRecord>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

/// A matchable leaf of the tree, with layouts and inherited meta resolved.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub name: Option<String>,
    /// Absolute pattern, e.g. `/product/:id`.
    pub pattern: String,
    /// Layout chain, outermost first, ending with the leaf view.
    pub views: Vec<ViewRef>,
    pub meta: RouteMeta,
    segments: Vec<Segment>,
}

impl RouteEntry {
    fn is_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }

    fn matches(&self, location: &Location) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = location.segments().collect();
        let mut params = BTreeMap::new();
        let mut i = 0;
        for segment in &self.segments {
            match segment {
                Segment::Static(s) => {
                    if parts.get(i) != Some(&s.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), decode(parts.get(i)?));
                }
                Segment::CatchAll(name) => {
                    let rest = parts[i.min(parts.len())..].join("/");
                    params.insert(name.clone(), decode(&rest));
                    return Some(params);
                }
            }
            i += 1;
        }
        (i == parts.len()).then_some(params)
    }

    fn resolve(&self, location: Location, params: BTreeMap<String, String>) -> ResolvedRoute {
        ResolvedRoute {
            name: self.name.clone(),
            pattern: self.pattern.clone(),
            location,
            params,
            meta: self.meta,
            views: self.views.clone(),
        }
    }

    fn build_path(&self, params: &BTreeMap<String, String>) -> Result<String, RouteError> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Static(s) => parts.push(s.clone()),
                Segment::Param(name) => {
                    let value = params.get(name).ok_or_else(|| RouteError::MissingParam {
                        route: self.name.clone().unwrap_or_else(|| self.pattern.clone()),
                        param: name.clone(),
                    })?;
                    parts.push(urlencoding::encode(value).into_owned());
                }
                Segment::CatchAll(name) => {
                    if let Some(rest) = params.get(name).filter(|r| !r.is_empty()) {
                        parts.push(rest.trim_matches('/').to_string());
                    }
                }
            }
        }
        Ok(format!("/{}", parts.join("/")))
    }
}

/// Where to navigate: a raw path, or a named route with params and query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    Path(String),
    Named {
        name: String,
        params: BTreeMap<String, String>,
        query: Vec<(String, String)>,
    },
}

impl NavigationTarget {
    pub fn path(path: impl Into<String>) -> Self {
        NavigationTarget::Path(path.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        NavigationTarget::Named {
            name: name.into(),
            params: BTreeMap::new(),
            query: Vec::new(),
        }
    }

    /// Add a route param. No effect on path targets.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let NavigationTarget::Named { params, .. } = &mut self {
            params.insert(key.into(), value.into());
        }
        self
    }

    /// Add a query pair. No effect on path targets.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let NavigationTarget::Named { query, .. } = &mut self {
            query.push((key.into(), value.into()));
        }
        self
    }
}

impl From<&str> for NavigationTarget {
    fn from(path: &str) -> Self {
        NavigationTarget::Path(path.to_string())
    }
}

impl From<String> for NavigationTarget {
    fn from(path: String) -> Self {
        NavigationTarget::Path(path)
    }
}

/// A target resolved against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: Option<String>,
    pub pattern: String,
    pub location: Location,
    pub params: BTreeMap<String, String>,
    pub meta: RouteMeta,
    pub views: Vec<ViewRef>,
}

impl ResolvedRoute {
    /// Path with query and hash, as the user requested it.
    pub fn full_path(&self) -> String {
        self.location.full_path()
    }

    pub fn path(&self) -> &str {
        &self.location.path
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

/// The compiled, immutable route table.
#[derive(Debug, Clone)]
pub struct RouteRegistry {
    entries: Vec<RouteEntry>,
}

impl RouteRegistry {
    /// Flatten and validate a route tree.
    pub fn new(records: Vec<RouteRecord>) -> Result<Self, RouteError> {
        let mut entries = Vec::new();
        for record in &records {
            flatten(record, "", &[], RouteMeta::default(), &mut entries)?;
        }

        let mut names = HashSet::new();
        for name in entries.iter().filter_map(|e| e.name.as_deref()) {
            if !names.insert(name) {
                return Err(RouteError::DuplicateName(name.to_string()));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Look up an entry by name.
    pub fn by_name(&self, name: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.name.as_deref() == Some(name))
    }

    /// Resolve a target. Catch-all routes only match when nothing else does.
    pub fn resolve(&self, target: &NavigationTarget) -> Result<ResolvedRoute, RouteError> {
        match target {
            NavigationTarget::Path(path) => self.match_location(Location::parse(path)),
            NavigationTarget::Named {
                name,
                params,
                query,
            } => {
                let entry = self
                    .by_name(name)
                    .ok_or_else(|| RouteError::UnknownName(name.clone()))?;
                let mut location = Location::from_path(&entry.build_path(params)?);
                location.query = query.clone();
                Ok(entry.resolve(location, params.clone()))
            }
        }
    }

    fn match_location(&self, location: Location) -> Result<ResolvedRoute, RouteError> {
        let specific = self.entries.iter().filter(|e| !e.is_catch_all());
        let fallback = self.entries.iter().filter(|e| e.is_catch_all());
        specific
            .chain(fallback)
            .find_map(|entry| entry.matches(&location).map(|params| (entry, params)))
            .map(|(entry, params)| entry.resolve(location.clone(), params))
            .ok_or_else(|| RouteError::NoMatch(location.full_path()))
    }
}

fn flatten(
    record: &RouteRecord,
    parent_pattern: &str,
    parent_views: &[ViewRef],
    parent_meta: RouteMeta,
    out: &mut Vec<RouteEntry>,
) -> Result<(), RouteError> {
    let pattern = join_pattern(parent_pattern, &record.path);
    let meta = record.meta.inherit(parent_meta);
    let mut views = parent_views.to_vec();
    views.push(record.view);

    if !record.children.is_empty() {
        for child in &record.children {
            flatten(child, &pattern, &views, meta, out)?;
        }
        return Ok(());
    }

    out.push(RouteEntry {
        name: record.name.clone(),
        segments: parse_pattern(&pattern)?,
        pattern,
        views,
        meta,
    });
    Ok(())
}

fn join_pattern(parent: &str, path: &str) -> String {
    if path.starts_with('/') || parent.is_empty() {
        return Location::from_path(path).path;
    }
    if path.is_empty() {
        return parent.to_string();
    }
    Location::from_path(&format!("{}/{}", parent, path)).path
}

fn parse_pattern(pattern: &str) -> Result<Vec<Segment>, RouteError> {
    let invalid = |reason: &str| RouteError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };
    let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let mut segments = Vec::with_capacity(raw.len());
    for (i, part) in raw.iter().enumerate() {
        let segment = if let Some(name) = part.strip_prefix(':') {
            Segment::Param(name.to_string())
        } else if let Some(name) = part.strip_prefix('*') {
            if i + 1 != raw.len() {
                return Err(invalid("catch-all must be the last segment"));
            }
            Segment::CatchAll(name.to_string())
        } else {
            Segment::Static(part.to_string())
        };
        if matches!(&segment, Segment::Param(n) | Segment::CatchAll(n) if n.is_empty()) {
            return Err(invalid("unnamed parameter"));
        }
        segments.push(segment);
    }
    Ok(segments)
}
