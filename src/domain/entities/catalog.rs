//! # Entity Catalog
//!
//! The four game entity types and their descriptors.
//!
//! Phrase and nomination variants share a shape but live in separate
//! collections. Decks are parents; cards reference a deck through the
//! `deck` column and carry an `order` column used for random selection.

use crate::domain::entities::descriptor::{
    EntityDescriptor, FieldSchema, FieldSpec, RandomSelection,
};
use crate::domain::value_objects::FieldType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parent reference column on card rows.
pub const DECK_FIELD: &str = "deck";

/// Authoring-time order column on card rows.
pub const ORDER_FIELD: &str = "order";

/// Creation timestamp column.
pub const CREATED_AT_FIELD: &str = "created_at";

/// Last-modification timestamp column.
pub const MODIFIED_AT_FIELD: &str = "modified_at";

const DECK_SCHEMA: &[FieldSpec] = &[
    FieldSpec::required("name", FieldType::Text),
    FieldSpec::required("description", FieldType::Text),
    FieldSpec::optional(CREATED_AT_FIELD, FieldType::Timestamp),
    FieldSpec::optional(MODIFIED_AT_FIELD, FieldType::Timestamp),
];

const CARD_SCHEMA: &[FieldSpec] = &[
    FieldSpec::required(DECK_FIELD, FieldType::Uuid),
    FieldSpec::required("term", FieldType::Text),
    FieldSpec::required("description", FieldType::Text),
    FieldSpec::required(ORDER_FIELD, FieldType::Integer),
    FieldSpec::optional("active", FieldType::Boolean),
    FieldSpec::optional(CREATED_AT_FIELD, FieldType::Timestamp),
    FieldSpec::optional(MODIFIED_AT_FIELD, FieldType::Timestamp),
];

const DECK_WIRE: &[&str] = &["deck_id", "name", "description", CREATED_AT_FIELD, MODIFIED_AT_FIELD];

const PHRASE_CARD_WIRE: &[&str] = &[
    "phrase_card_id",
    "term",
    "description",
    DECK_FIELD,
    ORDER_FIELD,
    "active",
    CREATED_AT_FIELD,
    MODIFIED_AT_FIELD,
];

const NOMINATION_CARD_WIRE: &[&str] = &[
    "nomination_card_id",
    "term",
    "description",
    DECK_FIELD,
    ORDER_FIELD,
    "active",
    CREATED_AT_FIELD,
    MODIFIED_AT_FIELD,
];

const CARD_SELECTION: RandomSelection = RandomSelection::new(DECK_FIELD, ORDER_FIELD);

/// Phrase deck descriptor.
pub static PHRASE_DECK: EntityDescriptor = EntityDescriptor::new(
    "PhraseDeck",
    "phrase_deck",
    "deck_id",
    FieldSchema::new(DECK_SCHEMA),
    DECK_WIRE,
);

/// Phrase card descriptor.
pub static PHRASE_CARD: EntityDescriptor = EntityDescriptor::new(
    "PhraseCard",
    "phrase_card",
    "phrase_card_id",
    FieldSchema::new(CARD_SCHEMA),
    PHRASE_CARD_WIRE,
)
.with_random_selection(CARD_SELECTION);

/// Nomination deck descriptor.
pub static NOMINATION_DECK: EntityDescriptor = EntityDescriptor::new(
    "NominationDeck",
    "nomination_deck",
    "deck_id",
    FieldSchema::new(DECK_SCHEMA),
    DECK_WIRE,
);

/// Nomination card descriptor.
pub static NOMINATION_CARD: EntityDescriptor = EntityDescriptor::new(
    "NominationCard",
    "nomination_card",
    "nomination_card_id",
    FieldSchema::new(CARD_SCHEMA),
    NOMINATION_CARD_WIRE,
)
.with_random_selection(CARD_SELECTION);

/// Error returned when parsing an unknown entity kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind: {0}")]
pub struct UnknownEntityKindError(pub String);

/// The four entity types, addressed by their URL path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Phrase decks.
    #[serde(rename = "phrase-decks")]
    PhraseDeck,
    /// Phrase cards.
    #[serde(rename = "phrase-cards")]
    PhraseCard,
    /// Nomination decks.
    #[serde(rename = "nomination-decks")]
    NominationDeck,
    /// Nomination cards.
    #[serde(rename = "nomination-cards")]
    NominationCard,
}

impl EntityKind {
    /// Every entity kind.
    pub const ALL: [Self; 4] = [
        Self::PhraseDeck,
        Self::PhraseCard,
        Self::NominationDeck,
        Self::NominationCard,
    ];

    /// Returns the descriptor for this kind.
    #[must_use]
    pub fn descriptor(&self) -> &'static EntityDescriptor {
        match self {
            Self::PhraseDeck => &PHRASE_DECK,
            Self::PhraseCard => &PHRASE_CARD,
            Self::NominationDeck => &NOMINATION_DECK,
            Self::NominationCard => &NOMINATION_CARD,
        }
    }

    /// Returns the URL path segment.
    #[must_use]
    pub const fn path_segment(&self) -> &'static str {
        match self {
            Self::PhraseDeck => "phrase-decks",
            Self::PhraseCard => "phrase-cards",
            Self::NominationDeck => "nomination-decks",
            Self::NominationCard => "nomination-cards",
        }
    }

    /// Returns true for card kinds.
    #[must_use]
    pub const fn is_card(&self) -> bool {
        matches!(self, Self::PhraseCard | Self::NominationCard)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for EntityKind {
    type Err = UnknownEntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.path_segment() == s)
            .ok_or_else(|| UnknownEntityKindError(s.to_owned()))
    }
}
