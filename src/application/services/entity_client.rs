//! # Entity Store Client
//!
//! Per-entity-type operations over the shared column-family store.
//!
//! One [`EntityStoreClient`] exists per entity descriptor; all of them
//! share one store handle. [`EntityClients`] bundles the four game
//! entity types for the REST layer and the server binary.
//!
//! # Random Selection
//!
//! `get_random` draws one `order` value uniformly from the configured
//! range and asks the store for a single row matching both the parent
//! deck and that value. The result is only uniform over cards when decks
//! hold similar numbers of cards per order value, and it reports
//! `NotFound` when the drawn value has no cards even if other values do.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::order_picker::{OrderPicker, ThreadRngOrderPicker};
use crate::domain::entities::catalog::{CREATED_AT_FIELD, MODIFIED_AT_FIELD};
use crate::domain::entities::{EntityDescriptor, EntityKind, Record};
use crate::domain::value_objects::{
    FieldValue, InvalidIdError, RecordId, Timestamp, ToRecordId,
};
use crate::infrastructure::persistence::codec::encode_value;
use crate::infrastructure::persistence::{
    ColumnFamilyStore, IndexClause, IndexExpression, RecordCodec, StoreError,
};
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Store operations for one entity type.
#[derive(Debug, Clone)]
pub struct EntityStoreClient {
    codec: RecordCodec,
    store: Arc<dyn ColumnFamilyStore>,
    picker: Arc<dyn OrderPicker>,
    order_range: Option<RangeInclusive<i64>>,
}

impl EntityStoreClient {
    /// Creates a client drawing order values from the thread RNG.
    #[must_use]
    pub fn new(descriptor: &'static EntityDescriptor, store: Arc<dyn ColumnFamilyStore>) -> Self {
        Self {
            codec: RecordCodec::new(descriptor),
            store,
            picker: Arc::new(ThreadRngOrderPicker::new()),
            order_range: None,
        }
    }

    /// Replaces the order picker.
    #[must_use]
    pub fn with_picker(mut self, picker: Arc<dyn OrderPicker>) -> Self {
        self.picker = picker;
        self
    }

    /// Overrides the descriptor's order range.
    #[must_use]
    pub fn with_order_range(mut self, range: RangeInclusive<i64>) -> Self {
        self.order_range = Some(range);
        self
    }

    /// Returns the entity descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &'static EntityDescriptor {
        self.codec.descriptor()
    }

    /// Returns the order range used by random selection, if supported.
    #[must_use]
    pub fn order_range(&self) -> Option<RangeInclusive<i64>> {
        let selection = self.descriptor().random_selection()?;
        Some(
            self.order_range
                .clone()
                .unwrap_or_else(|| selection.order_range()),
        )
    }

    /// Fetches one record by id.
    ///
    /// # Errors
    ///
    /// - `InvalidId` if `id` is not a UUID
    /// - `NotFound` if no row exists
    /// - `Codec` if the stored row does not decode
    /// - `StoreUnavailable` on transport failure
    #[tracing::instrument(skip(self, id), fields(entity = self.descriptor().name()))]
    pub async fn get_by_id(&self, id: impl ToRecordId + Send) -> ApplicationResult<Record> {
        let key = id.to_record_id()?;
        let columns = self
            .store
            .get(self.descriptor().collection(), &key)
            .await
            .map_err(|e| self.store_error(e))?;
        Ok(self.codec.decode(key, &columns)?)
    }

    /// Fetches one record when an id is supplied.
    ///
    /// Returns `Ok(None)` without touching the store when `id` is `None`.
    ///
    /// # Errors
    ///
    /// Same as [`get_by_id`](Self::get_by_id) when an id is supplied.
    pub async fn find<I>(&self, id: Option<I>) -> ApplicationResult<Option<Record>>
    where
        I: ToRecordId + Send,
    {
        match id {
            Some(id) => self.get_by_id(id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Writes a record, generating its id when absent.
    ///
    /// A fresh time-ordered UUID is assigned when the record carries no id;
    /// a textual id is normalized. When the schema declares creation and
    /// modification timestamps and the record lacks them, both are stamped
    /// with the current time. The returned record carries the id.
    ///
    /// # Errors
    ///
    /// - `InvalidId` if the supplied id is not a UUID
    /// - `Codec` if a required field is missing or has the wrong type
    /// - `StoreUnavailable` on transport failure
    #[tracing::instrument(skip(self, record), fields(entity = self.descriptor().name()))]
    pub async fn insert(&self, mut record: Record) -> ApplicationResult<Record> {
        let descriptor = self.descriptor();
        let key = match record.get(descriptor.id_field()) {
            None => RecordId::generate(),
            Some(FieldValue::Uuid(id)) => *id,
            Some(FieldValue::Text(raw)) => RecordId::parse(raw)?,
            Some(other) => return Err(InvalidIdError::new(other.to_string()).into()),
        };
        record.set(descriptor.id_field(), key);
        self.stamp_timestamps(&mut record);

        let columns = self.codec.encode(&record)?;
        self.store
            .insert(descriptor.collection(), &key, columns)
            .await
            .map_err(|e| self.store_error(e))?;

        tracing::debug!(id = %key, "record inserted");
        Ok(record)
    }

    /// Picks a random child record of `parent`.
    ///
    /// # Errors
    ///
    /// - `Unsupported` if the entity type has no random selection
    /// - `InvalidId` if `parent` is not a UUID
    /// - `NotFound` if no row matches the parent and the drawn order value
    /// - `Codec` if the matched row does not decode
    /// - `StoreUnavailable` on transport failure
    #[tracing::instrument(skip(self, parent), fields(entity = self.descriptor().name()))]
    pub async fn get_random(&self, parent: impl ToRecordId + Send) -> ApplicationResult<Record> {
        let descriptor = self.descriptor();
        let Some(selection) = descriptor.random_selection() else {
            return Err(ApplicationError::unsupported(format!(
                "{} does not support random selection",
                descriptor.name()
            )));
        };
        let parent = parent.to_record_id()?;
        let range = self
            .order_range
            .clone()
            .unwrap_or_else(|| selection.order_range());
        let order = self.picker.pick(range);

        let clause = IndexClause::new(
            vec![
                IndexExpression::eq(
                    selection.parent_field(),
                    encode_value(&FieldValue::Uuid(parent)),
                ),
                IndexExpression::eq(
                    selection.order_field(),
                    encode_value(&FieldValue::Integer(order)),
                ),
            ],
            1,
        )?;

        let rows = self
            .store
            .get_indexed_slices(descriptor.collection(), &clause)
            .await
            .map_err(|e| self.store_error(e))?;

        let Some((key, columns)) = rows.into_iter().next() else {
            tracing::debug!(%parent, order, "no row for drawn order value");
            return Err(ApplicationError::not_found(
                descriptor.name(),
                format!("random pick from {parent} (order {order})"),
            ));
        };
        Ok(self.codec.decode(key, &columns)?)
    }

    fn stamp_timestamps(&self, record: &mut Record) {
        let schema = self.descriptor().schema();
        let now = Timestamp::now();
        for field in [CREATED_AT_FIELD, MODIFIED_AT_FIELD] {
            if schema.contains(field) && !record.contains(field) {
                record.set(field, now);
            }
        }
    }

    fn store_error(&self, err: StoreError) -> ApplicationError {
        match err {
            StoreError::KeyNotFound { key, .. } => {
                ApplicationError::not_found(self.descriptor().name(), key.to_string())
            }
            other => {
                tracing::warn!(
                    entity = self.descriptor().name(),
                    error = %other,
                    "store request failed"
                );
                other.into()
            }
        }
    }
}

/// One client per entity kind over a shared store handle.
#[derive(Debug, Clone)]
pub struct EntityClients {
    store: Arc<dyn ColumnFamilyStore>,
    phrase_decks: EntityStoreClient,
    phrase_cards: EntityStoreClient,
    nomination_decks: EntityStoreClient,
    nomination_cards: EntityStoreClient,
}

impl EntityClients {
    /// Builds the four clients with the default picker and order range.
    #[must_use]
    pub fn new(store: Arc<dyn ColumnFamilyStore>) -> Self {
        Self::with_client(store, |client| client)
    }

    /// Builds the four clients with a shared picker and optional order range.
    #[must_use]
    pub fn with_selection(
        store: Arc<dyn ColumnFamilyStore>,
        picker: Arc<dyn OrderPicker>,
        order_range: Option<RangeInclusive<i64>>,
    ) -> Self {
        Self::with_client(store, |client| {
            let client = client.with_picker(Arc::clone(&picker));
            match &order_range {
                Some(range) => client.with_order_range(range.clone()),
                None => client,
            }
        })
    }

    fn with_client(
        store: Arc<dyn ColumnFamilyStore>,
        configure: impl Fn(EntityStoreClient) -> EntityStoreClient,
    ) -> Self {
        let build = |kind: EntityKind| {
            configure(EntityStoreClient::new(kind.descriptor(), Arc::clone(&store)))
        };
        Self {
            phrase_decks: build(EntityKind::PhraseDeck),
            phrase_cards: build(EntityKind::PhraseCard),
            nomination_decks: build(EntityKind::NominationDeck),
            nomination_cards: build(EntityKind::NominationCard),
            store,
        }
    }

    /// Returns the client for `kind`.
    #[must_use]
    pub fn get(&self, kind: EntityKind) -> &EntityStoreClient {
        match kind {
            EntityKind::PhraseDeck => &self.phrase_decks,
            EntityKind::PhraseCard => &self.phrase_cards,
            EntityKind::NominationDeck => &self.nomination_decks,
            EntityKind::NominationCard => &self.nomination_cards,
        }
    }

    /// Returns the shared store handle.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ColumnFamilyStore> {
        &self.store
    }

    /// Closes the shared store handle.
    pub async fn close(&self) {
        self.store.close().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::services::order_picker::FixedOrderPicker;
    use crate::domain::entities::{NOMINATION_CARD, PHRASE_CARD, PHRASE_DECK};
    use crate::infrastructure::persistence::ColumnMap;
    use crate::infrastructure::persistence::in_memory::InMemoryColumnFamilyStore;
    use bytes::Bytes;
    use std::collections::BTreeMap;

    fn store() -> Arc<InMemoryColumnFamilyStore> {
        Arc::new(InMemoryColumnFamilyStore::new())
    }

    fn deck() -> Record {
        Record::new()
            .with("name", "Classics")
            .with("description", "The original phrases")
    }

    fn card(deck: RecordId, order: i64) -> Record {
        Record::new()
            .with("deck", deck)
            .with("term", format!("term {order}"))
            .with("description", "A card")
            .with("order", order)
    }

    mod get_by_id {
        use super::*;

        #[tokio::test]
        async fn returns_inserted_record() {
            let client = EntityStoreClient::new(&PHRASE_DECK, store());
            let inserted = client.insert(deck()).await.unwrap();
            let id = inserted.get("deck_id").and_then(FieldValue::as_uuid).unwrap();

            let fetched = client.get_by_id(id).await.unwrap();
            assert_eq!(fetched, inserted);

            let by_text = client.get_by_id(id.to_string().to_uppercase()).await.unwrap();
            assert_eq!(by_text, inserted);
        }

        #[tokio::test]
        async fn never_inserted_is_not_found() {
            let client = EntityStoreClient::new(&PHRASE_CARD, store());
            let err = client.get_by_id(RecordId::generate()).await.unwrap_err();
            assert!(err.is_not_found());
            assert!(err.to_string().contains("PhraseCard"));
        }

        #[tokio::test]
        async fn malformed_id_is_invalid_id() {
            let client = EntityStoreClient::new(&PHRASE_CARD, store());
            let err = client.get_by_id("not-a-uuid").await.unwrap_err();
            assert!(err.is_invalid_id());
            assert!(!err.is_not_found());
        }

        #[tokio::test]
        async fn undecodable_row_is_codec_error() {
            let store = store();
            let key = RecordId::generate();
            let columns: ColumnMap = BTreeMap::from([
                ("name".to_owned(), Bytes::from_static(b"Classics")),
                ("description".to_owned(), Bytes::from_static(b"d")),
                ("created_at".to_owned(), Bytes::from_static(b"xx")),
            ]);
            store.insert("phrase_deck", &key, columns).await.unwrap();

            let client = EntityStoreClient::new(&PHRASE_DECK, store);
            let err = client.get_by_id(key).await.unwrap_err();
            assert!(matches!(err, ApplicationError::Codec(_)));
        }

        #[tokio::test]
        async fn find_without_id_skips_store() {
            let store = store();
            store.set_available(false);
            let client = EntityStoreClient::new(&PHRASE_DECK, store);

            assert!(client.find(None::<RecordId>).await.unwrap().is_none());
            assert!(client.find(Some(RecordId::generate())).await.is_err());
        }

        #[tokio::test]
        async fn find_with_id_returns_record() {
            let client = EntityStoreClient::new(&PHRASE_DECK, store());
            let inserted = client.insert(deck()).await.unwrap();
            let id = inserted.get("deck_id").and_then(FieldValue::as_uuid).unwrap();

            assert_eq!(client.find(Some(id)).await.unwrap(), Some(inserted));
        }
    }

    mod insert {
        use super::*;

        #[tokio::test]
        async fn generates_time_ordered_id() {
            let client = EntityStoreClient::new(&PHRASE_DECK, store());
            let record = client.insert(deck()).await.unwrap();

            let id = record.get("deck_id").and_then(FieldValue::as_uuid).unwrap();
            assert!(!id.is_nil());
            assert_eq!(id.as_uuid().get_version_num(), 7);
            assert_eq!(id.to_string().len(), 36);
        }

        #[tokio::test]
        async fn preserves_preset_id() {
            let client = EntityStoreClient::new(&PHRASE_DECK, store());
            let id = RecordId::generate();
            let record = client.insert(deck().with("deck_id", id)).await.unwrap();
            assert_eq!(record.get("deck_id"), Some(&FieldValue::Uuid(id)));
        }

        #[tokio::test]
        async fn normalizes_textual_id() {
            let client = EntityStoreClient::new(&PHRASE_DECK, store());
            let record = client
                .insert(deck().with("deck_id", "67E5504410B1426F9247BB680E5FE0C8"))
                .await
                .unwrap();
            assert_eq!(
                record.get("deck_id").unwrap().to_string(),
                "67e55044-10b1-426f-9247-bb680e5fe0c8"
            );
        }

        #[tokio::test]
        async fn rejects_non_uuid_id() {
            let client = EntityStoreClient::new(&PHRASE_DECK, store());
            let err = client
                .insert(deck().with("deck_id", "deck-1"))
                .await
                .unwrap_err();
            assert!(err.is_invalid_id());

            let err = client.insert(deck().with("deck_id", 7_i64)).await.unwrap_err();
            assert!(err.is_invalid_id());
        }

        #[tokio::test]
        async fn repeated_insert_with_fixed_id_is_idempotent() {
            let store = store();
            let client = EntityStoreClient::new(&PHRASE_DECK, store.clone());
            let id = RecordId::generate();
            let record = deck().with("deck_id", id);

            client.insert(record.clone()).await.unwrap();
            client.insert(record).await.unwrap();
            assert_eq!(store.len("phrase_deck"), 1);
        }

        #[tokio::test]
        async fn stamps_missing_timestamps() {
            let client = EntityStoreClient::new(&PHRASE_DECK, store());
            let record = client.insert(deck()).await.unwrap();

            let created = record.get("created_at").and_then(FieldValue::as_timestamp);
            let modified = record.get("modified_at").and_then(FieldValue::as_timestamp);
            assert!(created.is_some());
            assert_eq!(created, modified);
        }

        #[tokio::test]
        async fn keeps_supplied_timestamps() {
            let client = EntityStoreClient::new(&PHRASE_DECK, store());
            let then = Timestamp::from_millis(1_600_000_000_000).unwrap();
            let record = client
                .insert(deck().with("created_at", then))
                .await
                .unwrap();
            assert_eq!(record.get("created_at"), Some(&FieldValue::Timestamp(then)));
            assert_ne!(record.get("modified_at"), Some(&FieldValue::Timestamp(then)));
        }

        #[tokio::test]
        async fn missing_required_field_is_codec_error() {
            let client = EntityStoreClient::new(&PHRASE_DECK, store());
            let err = client
                .insert(Record::new().with("name", "x"))
                .await
                .unwrap_err();
            assert!(matches!(err, ApplicationError::Codec(_)));
        }

        #[tokio::test]
        async fn unavailable_store_is_reported() {
            let store = store();
            store.set_available(false);
            let client = EntityStoreClient::new(&PHRASE_DECK, store);

            let err = client.insert(deck()).await.unwrap_err();
            assert!(err.is_store_unavailable());
        }
    }

    mod get_random {
        use super::*;

        async fn seeded(order: i64) -> (EntityStoreClient, RecordId, Record) {
            let store = store();
            let parent = RecordId::generate();
            let client = EntityStoreClient::new(&PHRASE_CARD, store)
                .with_picker(Arc::new(FixedOrderPicker::new(order)));
            let inserted = client.insert(card(parent, 2)).await.unwrap();
            (client, parent, inserted)
        }

        #[tokio::test]
        async fn returns_card_when_drawn_order_matches() {
            let (client, parent, inserted) = seeded(2).await;
            assert_eq!(client.get_random(parent).await.unwrap(), inserted);
        }

        #[tokio::test]
        async fn not_found_when_drawn_order_is_empty() {
            let (client, parent, _) = seeded(1).await;
            assert!(client.get_random(parent).await.unwrap_err().is_not_found());
        }

        #[tokio::test]
        async fn parent_without_rows_is_not_found() {
            let (client, _, _) = seeded(2).await;
            let err = client.get_random(RecordId::generate()).await.unwrap_err();
            assert!(err.is_not_found());
        }

        #[tokio::test]
        async fn other_collections_are_not_searched() {
            let store = store();
            let parent = RecordId::generate();
            let picker: Arc<dyn OrderPicker> = Arc::new(FixedOrderPicker::new(2));
            let phrases =
                EntityStoreClient::new(&PHRASE_CARD, store.clone()).with_picker(picker.clone());
            let nominations = EntityStoreClient::new(&NOMINATION_CARD, store).with_picker(picker);

            phrases.insert(card(parent, 2)).await.unwrap();
            assert!(nominations.get_random(parent).await.unwrap_err().is_not_found());
        }

        #[tokio::test]
        async fn decks_are_unsupported() {
            let client = EntityStoreClient::new(&PHRASE_DECK, store());
            let err = client.get_random(RecordId::generate()).await.unwrap_err();
            assert!(err.is_unsupported());
            assert!(client.order_range().is_none());
        }

        #[tokio::test]
        async fn invalid_parent_is_invalid_id() {
            let (client, _, _) = seeded(2).await;
            assert!(client.get_random("deck-1").await.unwrap_err().is_invalid_id());
        }

        #[tokio::test]
        async fn order_range_override() {
            let store = store();
            let parent = RecordId::generate();
            let client = EntityStoreClient::new(&PHRASE_CARD, store)
                .with_picker(Arc::new(FixedOrderPicker::new(9)))
                .with_order_range(5..=5);
            assert_eq!(client.order_range(), Some(5..=5));

            let inserted = client.insert(card(parent, 5)).await.unwrap();
            assert_eq!(client.get_random(parent).await.unwrap(), inserted);
        }

        #[tokio::test]
        async fn draws_are_approximately_uniform() {
            let client = EntityStoreClient::new(&PHRASE_CARD, store());
            let parent = RecordId::generate();
            for order in 1..=3 {
                client.insert(card(parent, order)).await.unwrap();
            }

            let mut counts: BTreeMap<i64, u32> = BTreeMap::new();
            for _ in 0..3_000 {
                let record = client.get_random(parent).await.unwrap();
                let order = record.get("order").and_then(FieldValue::as_integer).unwrap();
                *counts.entry(order).or_default() += 1;
            }

            assert_eq!(counts.len(), 3);
            for (order, count) in counts {
                assert!(count > 800, "order {order} drawn only {count} times");
            }
        }

        #[tokio::test]
        async fn unavailable_store_is_reported() {
            let store = store();
            let client = EntityStoreClient::new(&PHRASE_CARD, store.clone());
            store.set_available(false);
            let err = client.get_random(RecordId::generate()).await.unwrap_err();
            assert!(err.is_store_unavailable());
        }
    }

    mod clients {
        use super::*;

        #[tokio::test]
        async fn one_client_per_kind() {
            let clients = EntityClients::new(store());
            for kind in EntityKind::ALL {
                assert_eq!(clients.get(kind).descriptor().name(), kind.descriptor().name());
            }
        }

        #[tokio::test]
        async fn clients_share_one_store() {
            let store = store();
            let clients = EntityClients::with_selection(
                store.clone(),
                Arc::new(FixedOrderPicker::new(1)),
                Some(1..=1),
            );

            let deck = clients.get(EntityKind::PhraseDeck).insert(deck()).await.unwrap();
            let deck_id = deck.get("deck_id").and_then(FieldValue::as_uuid).unwrap();
            let cards = clients.get(EntityKind::PhraseCard);
            let inserted = cards.insert(card(deck_id, 1)).await.unwrap();

            assert_eq!(cards.get_random(deck_id).await.unwrap(), inserted);
            assert_eq!(store.len("phrase_deck"), 1);
            assert_eq!(store.len("phrase_card"), 1);
            assert_eq!(cards.order_range(), Some(1..=1));

            clients.close().await;
        }
    }
}
