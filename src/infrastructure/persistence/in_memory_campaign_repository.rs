//! In-memory campaign repository
//!
//! Used for local development and tests. Keeps call counters and can be told to
//! fail every write.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::outbound::{CampaignRepositoryPort, PersistenceError};
use crate::domain::aggregates::Campaign;
use crate::domain::entities::{Character, Monster};
use crate::domain::value_objects::{CampaignId, UserId};

#[derive(Default)]
pub struct InMemoryCampaignRepository {
    campaigns: RwLock<HashMap<CampaignId, Campaign>>,
    loads: AtomicUsize,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryCampaignRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `load_campaign` calls so far
    #[cfg(test)]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of attempted writes (saves and deletes), failed ones included
    #[cfg(test)]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every following write fail until switched off again
    #[cfg(test)]
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn begin_write(&self) -> Result<(), PersistenceError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Database(
                "in-memory store is rejecting writes".to_string(),
            ));
        }
        Ok(())
    }

    async fn update(
        &self,
        campaign_id: &CampaignId,
        apply: impl FnOnce(Campaign) -> Campaign,
    ) -> Result<(), PersistenceError> {
        self.begin_write()?;
        let mut campaigns = self.campaigns.write().await;
        let campaign = campaigns
            .remove(campaign_id)
            .ok_or_else(|| PersistenceError::NotFound(campaign_id.clone()))?;
        campaigns.insert(campaign_id.clone(), apply(campaign));
        Ok(())
    }
}

#[async_trait]
impl CampaignRepositoryPort for InMemoryCampaignRepository {
    async fn load_campaign(&self, id: &CampaignId) -> Result<Campaign, PersistenceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.campaigns
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(id.clone()))
    }

    async fn save_campaign(&self, campaign: &Campaign) -> Result<(), PersistenceError> {
        self.begin_write()?;
        self.campaigns
            .write()
            .await
            .insert(campaign.id().clone(), campaign.clone());
        Ok(())
    }

    async fn save_character(
        &self,
        campaign_id: &CampaignId,
        character: &Character,
    ) -> Result<(), PersistenceError> {
        let character = character.clone();
        self.update(campaign_id, |campaign| {
            campaign.with_characters(vec![character])
        })
        .await
    }

    async fn save_monster(
        &self,
        campaign_id: &CampaignId,
        monster: &Monster,
    ) -> Result<(), PersistenceError> {
        let monster = monster.clone();
        self.update(campaign_id, |campaign| campaign.with_monsters(vec![monster]))
            .await
    }

    async fn delete_campaign(&self, id: &CampaignId) -> Result<(), PersistenceError> {
        self.begin_write()?;
        self.campaigns
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::NotFound(id.clone()))
    }

    async fn find_character(
        &self,
        campaign_id: &CampaignId,
        uid: &UserId,
    ) -> Result<Option<Character>, PersistenceError> {
        Ok(self
            .campaigns
            .read()
            .await
            .get(campaign_id)
            .and_then(|campaign| campaign.character(uid).cloned()))
    }

    async fn find_monster(
        &self,
        campaign_id: &CampaignId,
        name: &str,
    ) -> Result<Option<Monster>, PersistenceError> {
        Ok(self
            .campaigns
            .read()
            .await
            .get(campaign_id)
            .and_then(|campaign| campaign.monster_named(name).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CellCode, Grid, GridMarker};
    use crate::domain::value_objects::Position;

    fn campaign() -> Campaign {
        let grid = Grid::from_rows(
            vec![vec![CellCode::Floor; 3]],
            GridMarker::default(),
            GridMarker::default(),
        )
        .unwrap();
        let mut campaign = Campaign::new(CampaignId::from("c1"), grid);
        campaign
            .add_character(Character::new("u1", "Aria", Position::new(0, 0)))
            .unwrap();
        campaign
    }

    #[tokio::test]
    async fn test_entity_saves_update_the_stored_campaign() {
        let repo = InMemoryCampaignRepository::new();
        let id = CampaignId::from("c1");
        repo.save_campaign(&campaign()).await.unwrap();

        let moved = Character::new("u1", "Aria", Position::new(2, 0));
        repo.save_character(&id, &moved).await.unwrap();
        repo.save_monster(&id, &Monster::new("Bat", 1, Position::new(1, 0)))
            .await
            .unwrap();

        assert_eq!(
            repo.find_character(&id, &UserId::from("u1")).await.unwrap(),
            Some(moved)
        );
        assert_eq!(
            repo.find_monster(&id, "Bat").await.unwrap().map(|m| m.level),
            Some(1)
        );
        assert_eq!(repo.write_count(), 3);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let repo = InMemoryCampaignRepository::new();
        repo.fail_writes(true);

        assert!(matches!(
            repo.save_campaign(&campaign()).await,
            Err(PersistenceError::Database(_))
        ));
        assert!(matches!(
            repo.load_campaign(&CampaignId::from("c1")).await,
            Err(PersistenceError::NotFound(_))
        ));

        repo.fail_writes(false);
        repo.save_campaign(&campaign()).await.unwrap();
        repo.delete_campaign(&CampaignId::from("c1")).await.unwrap();
        assert_eq!(repo.write_count(), 3);
        assert_eq!(repo.load_count(), 1);
    }
}
