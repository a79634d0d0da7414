//! Static registry of entity types and the listing containers that hold them

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

use crate::entity::EntityType;
use crate::model;

/// Declares that a batch/listing container returns links to `entity`
#[derive(Debug)]
pub struct ListingType {
    /// Short name, used as the listing snapshot filename
    pub name: &'static str,

    /// The entity type whose links the listing holds
    pub entity: &'static EntityType,
}

impl ListingType {
    pub const fn new(name: &'static str, entity: &'static EntityType) -> Self {
        Self { name, entity }
    }
}

static STANDARD: Lazy<Arc<EntityRegistry>> = Lazy::new(|| {
    let mut registry = EntityRegistry::new();
    for entity_type in model::ENTITY_TYPES {
        registry.register_entity(entity_type);
    }
    for listing in model::LISTING_TYPES {
        registry.register_listing(listing);
    }
    Arc::new(registry)
});

/// Lookup table from entity types to their declared metadata and listings
#[derive(Debug, Default, Clone)]
pub struct EntityRegistry {
    entities: HashMap<&'static str, &'static EntityType>,
    listings: HashMap<&'static str, &'static ListingType>,
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of every type declared in [`crate::model`]
    pub fn standard() -> Arc<EntityRegistry> {
        Arc::clone(&STANDARD)
    }

    /// Register an entity type under its qualified name
    pub fn register_entity(&mut self, entity_type: &'static EntityType) {
        self.entities.insert(entity_type.qualified_name, entity_type);
    }

    /// Register a listing container; its entity type is registered too
    pub fn register_listing(&mut self, listing: &'static ListingType) {
        self.register_entity(listing.entity);
        self.listings.insert(listing.entity.qualified_name, listing);
    }

    /// Builder form of [`register_entity`](Self::register_entity)
    pub fn with_entity(mut self, entity_type: &'static EntityType) -> Self {
        self.register_entity(entity_type);
        self
    }

    /// Builder form of [`register_listing`](Self::register_listing)
    pub fn with_listing(mut self, listing: &'static ListingType) -> Self {
        self.register_listing(listing);
        self
    }

    /// Find an entity type by qualified or short name
    pub fn entity(&self, name: &str) -> Option<&'static EntityType> {
        self.entities
            .get(name)
            .copied()
            .or_else(|| self.entities.values().find(|t| t.name == name).copied())
    }

    /// The listing container that returns links to `entity_type`
    pub fn listing_for(&self, entity_type: &EntityType) -> Option<&'static ListingType> {
        self.listings.get(entity_type.qualified_name).copied()
    }

    /// The URI subsection declared for the named entity type
    pub fn subsection_for(&self, name: &str) -> Option<&'static str> {
        self.entity(name).and_then(|t| t.uri_subsection)
    }

    /// Number of registered entity types
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
