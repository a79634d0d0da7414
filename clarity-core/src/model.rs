//! Declared entity model
//!
//! A representative slice of the records the LIMS exposes, with the metadata
//! the client needs to address them and the listing containers that return
//! them in bulk.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::entity::{Entity, EntityType, Link};
use crate::registry::ListingType;

pub static SAMPLE: EntityType =
    EntityType::new("Sample", "com.genologics.ri.sample.Sample", "samples");

pub static ARTIFACT: EntityType =
    EntityType::new("Artifact", "com.genologics.ri.artifact.Artifact", "artifacts");

pub static PROJECT: EntityType =
    EntityType::new("Project", "com.genologics.ri.project.Project", "projects");

pub static CONTAINER: EntityType =
    EntityType::new("Container", "com.genologics.ri.container.Container", "containers");

pub static RESEARCHER: EntityType =
    EntityType::new("Researcher", "com.genologics.ri.researcher.Researcher", "researchers");

pub static ACTIONS: EntityType =
    EntityType::new("Actions", "com.genologics.ri.step.Actions", "steps").with_subsection("actions");

pub static SAMPLES: ListingType = ListingType::new("Samples", &SAMPLE);
pub static ARTIFACTS: ListingType = ListingType::new("Artifacts", &ARTIFACT);
pub static PROJECTS: ListingType = ListingType::new("Projects", &PROJECT);
pub static CONTAINERS: ListingType = ListingType::new("Containers", &CONTAINER);
pub static RESEARCHERS: ListingType = ListingType::new("Researchers", &RESEARCHER);

/// Every entity type declared in this module
pub static ENTITY_TYPES: [&EntityType; 6] =
    [&SAMPLE, &ARTIFACT, &PROJECT, &CONTAINER, &RESEARCHER, &ACTIONS];

/// Every listing container declared in this module
pub static LISTING_TYPES: [&ListingType; 5] =
    [&SAMPLES, &ARTIFACTS, &PROJECTS, &CONTAINERS, &RESEARCHERS];

macro_rules! entity {
    ($ty:ty, $meta:expr) => {
        impl Entity for $ty {
            fn entity_type() -> &'static EntityType {
                &$meta
            }

            fn uri(&self) -> Option<&Url> {
                self.uri.as_ref()
            }

            fn limsid(&self) -> Option<&str> {
                self.limsid.as_deref()
            }
        }
    };
}

/// A user-defined field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UdfValue {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(default)]
    pub uri: Option<Url>,
    #[serde(default)]
    pub limsid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub date_received: Option<String>,
    #[serde(default)]
    pub project: Option<Link<Project>>,
    #[serde(default)]
    pub submitter: Option<Link<Researcher>>,
    #[serde(default)]
    pub artifact: Option<Link<Artifact>>,
    #[serde(default)]
    pub fields: Vec<UdfValue>,
}

impl Sample {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uri: None,
            limsid: None,
            name: name.into(),
            date_received: None,
            project: None,
            submitter: None,
            artifact: None,
            fields: Vec::new(),
        }
    }

    /// Value of the named user-defined field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Set a user-defined field, replacing any previous value
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.value = value,
            None => self.fields.push(UdfValue { name, value }),
        }
    }
}

entity!(Sample, SAMPLE);

/// Location of an artifact in a container well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub container: Link<Container>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub uri: Option<Url>,
    #[serde(default)]
    pub limsid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artifact_type: Option<String>,
    #[serde(default)]
    pub qc_flag: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub samples: Vec<Link<Sample>>,
}

impl Artifact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uri: None,
            limsid: None,
            name: name.into(),
            artifact_type: None,
            qc_flag: None,
            location: None,
            samples: Vec::new(),
        }
    }
}

entity!(Artifact, ARTIFACT);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub uri: Option<Url>,
    #[serde(default)]
    pub limsid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub open_date: Option<String>,
    #[serde(default)]
    pub close_date: Option<String>,
    #[serde(default)]
    pub researcher: Option<Link<Researcher>>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uri: None,
            limsid: None,
            name: name.into(),
            open_date: None,
            close_date: None,
            researcher: None,
        }
    }
}

entity!(Project, PROJECT);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    #[serde(default)]
    pub uri: Option<Url>,
    #[serde(default)]
    pub limsid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub container_type: Option<String>,
    #[serde(default)]
    pub occupied_wells: u32,
    #[serde(default)]
    pub state: Option<String>,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uri: None,
            limsid: None,
            name: name.into(),
            container_type: None,
            occupied_wells: 0,
            state: None,
        }
    }
}

entity!(Container, CONTAINER);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Researcher {
    #[serde(default)]
    pub uri: Option<Url>,
    #[serde(default)]
    pub limsid: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Researcher {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            uri: None,
            limsid: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
        }
    }
}

entity!(Researcher, RESEARCHER);

/// Next-step decision for one artifact in a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextAction {
    pub artifact: Link<Artifact>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub step_uri: Option<Url>,
}

/// The `actions` sub-resource of a process step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actions {
    #[serde(default)]
    pub uri: Option<Url>,
    #[serde(default)]
    pub limsid: Option<String>,
    #[serde(default)]
    pub next_actions: Vec<NextAction>,
}

entity!(Actions, ACTIONS);
