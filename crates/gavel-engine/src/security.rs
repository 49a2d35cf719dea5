// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Access control decisions for engine requests.

use std::collections::HashMap;

use gavel_config::{Permission, Visibility};
use gavel_foundation::{GavPath, RepositoryName};
use relative_path::RelativePath;

use crate::Repository;

#[cfg(test)]
#[path = "./security_test.rs"]
mod security_test;

/// An opaque reference to the credentials of a caller.
///
/// The engine only forwards tokens; deciding what they grant is
/// entirely up to the [`SecurityGate`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct AccessToken(Option<String>);

impl AccessToken {
    /// The token of an unauthenticated caller.
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(Some(name.into()))
    }

    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }
}

/// Answers whether a token may act on a resource.
#[async_trait::async_trait]
pub trait SecurityGate: Send + Sync + std::fmt::Debug {
    /// May the token read the resource at this path.
    async fn can_access_resource(
        &self,
        token: &AccessToken,
        repository: &Repository,
        path: &GavPath,
    ) -> bool;

    /// May the token list the directory at this path.
    async fn can_browse_resource(
        &self,
        token: &AccessToken,
        repository: &Repository,
        path: &GavPath,
    ) -> bool;

    /// May the token write or remove the resource at this path.
    async fn can_modify_resource(
        &self,
        token: &AccessToken,
        repository: &Repository,
        path: &GavPath,
    ) -> bool;
}

/// A gate that grants every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

#[async_trait::async_trait]
impl SecurityGate for AllowAll {
    async fn can_access_resource(&self, _: &AccessToken, _: &Repository, _: &GavPath) -> bool {
        true
    }

    async fn can_browse_resource(&self, _: &AccessToken, _: &Repository, _: &GavPath) -> bool {
        true
    }

    async fn can_modify_resource(&self, _: &AccessToken, _: &Repository, _: &GavPath) -> bool {
        true
    }
}

/// The repositories a route applies to.
#[derive(Clone, Debug, Eq, PartialEq)]
enum RouteTarget {
    Any,
    Named(RepositoryName),
}

/// Permissions granted over one path prefix.
#[derive(Clone, Debug)]
struct TokenRoute {
    target: RouteTarget,
    prefix: String,
    read: bool,
    write: bool,
}

impl TokenRoute {
    /// Parse a route path like `releases/com/acme` or `*`.
    fn parse(route: &gavel_config::Route) -> crate::Result<Self> {
        let path = route.path.trim_matches('/');
        let (target, prefix) = path.split_once('/').unwrap_or((path, ""));
        let target = match target {
            "*" => RouteTarget::Any,
            name => RouteTarget::Named(RepositoryName::new(name)?),
        };
        let write = route.permissions.contains(&Permission::Write);
        Ok(Self {
            target,
            prefix: prefix.trim_matches('/').to_owned(),
            // write implies read
            read: write || route.permissions.contains(&Permission::Read),
            write,
        })
    }

    fn matches(&self, repository: &RepositoryName, path: &GavPath) -> bool {
        let target = match &self.target {
            RouteTarget::Any => true,
            RouteTarget::Named(name) => name == repository,
        };
        target && (self.prefix.is_empty() || path.starts_with(RelativePath::new(&self.prefix)))
    }
}

/// Enforces repository visibility and the routes granted to named tokens.
///
/// - public repositories can be read and browsed by anyone
/// - hidden repositories can be read by anyone, browsing needs a read route
/// - private repositories need a read route for everything
/// - modification always needs a write route
#[derive(Clone, Debug, Default)]
pub struct PolicyGate {
    tokens: HashMap<String, Vec<TokenRoute>>,
}

impl PolicyGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &gavel_config::Config) -> crate::Result<Self> {
        let mut gate = Self::new();
        for token in config.tokens.iter() {
            gate.add_token(token)?;
        }
        Ok(gate)
    }

    /// Grant the routes of a configured token.
    pub fn add_token(&mut self, token: &gavel_config::Token) -> crate::Result<()> {
        let routes = token
            .routes
            .iter()
            .map(TokenRoute::parse)
            .collect::<crate::Result<Vec<_>>>()?;
        self.tokens
            .entry(token.name.clone())
            .or_default()
            .extend(routes);
        Ok(())
    }

    fn routes(&self, token: &AccessToken) -> &[TokenRoute] {
        token
            .name()
            .and_then(|name| self.tokens.get(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn has_route(
        &self,
        token: &AccessToken,
        repository: &Repository,
        path: &GavPath,
        permitted: impl Fn(&TokenRoute) -> bool,
    ) -> bool {
        self.routes(token)
            .iter()
            .any(|route| permitted(route) && route.matches(repository.name(), path))
    }
}

#[async_trait::async_trait]
impl SecurityGate for PolicyGate {
    async fn can_access_resource(
        &self,
        token: &AccessToken,
        repository: &Repository,
        path: &GavPath,
    ) -> bool {
        match repository.visibility() {
            Visibility::Public | Visibility::Hidden => true,
            Visibility::Private => self.has_route(token, repository, path, |r| r.read),
        }
    }

    async fn can_browse_resource(
        &self,
        token: &AccessToken,
        repository: &Repository,
        path: &GavPath,
    ) -> bool {
        match repository.visibility() {
            Visibility::Public => true,
            Visibility::Hidden | Visibility::Private => {
                self.has_route(token, repository, path, |r| r.read)
            }
        }
    }

    async fn can_modify_resource(
        &self,
        token: &AccessToken,
        repository: &Repository,
        path: &GavPath,
    ) -> bool {
        self.has_route(token, repository, path, |r| r.write)
    }
}
