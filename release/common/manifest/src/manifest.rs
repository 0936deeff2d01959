// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::{borrow::Cow, fmt::Display, path::Path, str::FromStr};

use crate::{format::to_manifest_json, ManifestError};

pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";
pub const VERSION: &str = "version";
pub const CHANGELIST: &str = "changelist";
pub const TIMESTAMP: &str = "timestamp";
pub const COMPONENTS: &str = "components";
pub const P4_LOCATION: &str = "p4_location";

/// An ordered mapping of field names to values.
pub type Fields = IndexMap<String, Node>;

/// A value in the manifest tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Table(Fields),
    /// Numbers, booleans, arrays and nulls. Carried through untouched,
    /// numbers digit for digit.
    Other(serde_json::Value),
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Node::Text(s),
            serde_json::Value::Object(map) => {
                Node::Table(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
            other => Node::Other(other),
        }
    }
}

// Deserialized through `serde_json::Value` so that numbers keep their exact text.
impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Node::from)
    }
}

impl Node {
    /// Returns the value as text if it is a scalar.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Node::Text(s) => Some(Cow::Borrowed(s)),
            Node::Other(value @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => {
                Some(Cow::Owned(value.to_string()))
            }
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Fields> {
        match self {
            Node::Table(fields) => Some(fields),
            _ => None,
        }
    }

    fn as_table_mut(&mut self) -> Option<&mut Fields> {
        match self {
            Node::Table(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Where a field lives: at the top level, or inside a named component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Product,
    Component(String),
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Product => write!(f, "product"),
            Scope::Component(name) => write!(f, "component {name:?}"),
        }
    }
}

/// A mutable handle to a scalar field that already exists in a manifest.
///
/// This is the only way to change a manifest, so fields can be replaced but
/// never created.
pub struct FieldSlot<'a> {
    node: &'a mut Node,
}

impl FieldSlot<'_> {
    /// Replaces the value and returns the previous one.
    pub fn replace(self, value: &str) -> Node {
        std::mem::replace(self.node, Node::Text(value.to_owned()))
    }
}

/// A parsed manifest document.
#[derive(Clone, Debug, PartialEq)]
pub struct Manifest {
    fields: Fields,
}

impl FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, "manifest")
    }
}

impl Manifest {
    /// Loads the manifest at `path`. A file that cannot be read is reported as
    /// [`ManifestError::Io`], content that is not a manifest as
    /// [`ManifestError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&content, &format!("{}", path.display()))
    }

    pub(crate) fn parse(content: &str, origin: &str) -> Result<Self, ManifestError> {
        let fields = serde_json::from_str(content).map_err(|source| ManifestError::Parse {
            origin: origin.to_owned(),
            source,
        })?;
        Ok(Self { fields })
    }

    /// Renders the manifest in its on-disk format.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        to_manifest_json(&self.fields)
    }

    #[cfg(test)]
    pub(crate) fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn product_name(&self) -> Result<Cow<'_, str>, ManifestError> {
        self.product_field(NAME)
    }

    pub fn product_description(&self) -> Result<Cow<'_, str>, ManifestError> {
        self.product_field(DESCRIPTION)
    }

    pub fn product_version(&self) -> Result<Cow<'_, str>, ManifestError> {
        self.product_field(VERSION)
    }

    pub fn product_field(&self, field: &str) -> Result<Cow<'_, str>, ManifestError> {
        text_field(&self.fields, &Scope::Product, field)
    }

    /// Looks up a component by its name.
    pub fn component(&self, name: &str) -> Result<&Fields, ManifestError> {
        self.fields
            .get(COMPONENTS)
            .and_then(Node::as_table)
            .and_then(|components| components.get(name))
            .and_then(Node::as_table)
            .ok_or_else(|| ManifestError::ComponentNotFound(name.to_owned()))
    }

    /// Lists the component names in manifest order.
    #[cfg(test)]
    pub(crate) fn component_names(&self) -> Vec<&str> {
        self.fields
            .get(COMPONENTS)
            .and_then(Node::as_table)
            .map(|components| components.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn component_version(&self, name: &str) -> Result<Cow<'_, str>, ManifestError> {
        self.component_field(name, VERSION)
    }

    pub fn component_location(&self, name: &str) -> Result<Cow<'_, str>, ManifestError> {
        self.component_field(name, P4_LOCATION)
    }

    pub fn component_field(&self, name: &str, field: &str) -> Result<Cow<'_, str>, ManifestError> {
        let component = self.component(name)?;
        text_field(component, &Scope::Component(name.to_owned()), field)
    }

    /// Returns a handle to an existing scalar field in `scope`.
    pub fn field_mut(&mut self, scope: &Scope, field: &str) -> Result<FieldSlot<'_>, ManifestError> {
        let fields = match scope {
            Scope::Product => &mut self.fields,
            Scope::Component(name) => self
                .fields
                .get_mut(COMPONENTS)
                .and_then(Node::as_table_mut)
                .and_then(|components| components.get_mut(name))
                .and_then(Node::as_table_mut)
                .ok_or_else(|| ManifestError::ComponentNotFound(name.clone()))?,
        };
        let node = fields
            .get_mut(field)
            .ok_or_else(|| ManifestError::FieldNotFound {
                scope: scope.clone(),
                field: field.to_owned(),
            })?;
        if let Node::Table(_) = node {
            return Err(ManifestError::UnexpectedType {
                scope: scope.clone(),
                field: field.to_owned(),
            });
        }
        Ok(FieldSlot { node })
    }
}

fn text_field<'a>(
    fields: &'a Fields,
    scope: &Scope,
    field: &str,
) -> Result<Cow<'a, str>, ManifestError> {
    let node = fields
        .get(field)
        .ok_or_else(|| ManifestError::FieldNotFound {
            scope: scope.clone(),
            field: field.to_owned(),
        })?;
    node.as_text().ok_or_else(|| ManifestError::UnexpectedType {
        scope: scope.clone(),
        field: field.to_owned(),
    })
}
