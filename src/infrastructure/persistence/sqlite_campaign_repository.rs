//! SQLite campaign repository
//!
//! Characters and monsters live in their own tables with an `ordinal` column, so
//! the order of a campaign's rosters survives a round trip.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::application::ports::outbound::{CampaignRepositoryPort, PersistenceError};
use crate::domain::aggregates::Campaign;
use crate::domain::entities::{Character, Grid, Monster};
use crate::domain::value_objects::{CampaignId, MonsterId, Position, UserId};

const CHARACTER_COLUMNS: &str =
    "uid, name, x, y, current_health, max_health, power, defense, glyph";
const MONSTER_COLUMNS: &str =
    "id, name, level, x, y, current_health, max_health, power, defense, experience, glyph";

#[derive(Clone)]
pub struct SqliteCampaignRepository {
    pool: SqlitePool,
}

impl SqliteCampaignRepository {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS campaigns (
                id TEXT PRIMARY KEY,
                dungeon TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS characters (
                campaign_id TEXT NOT NULL,
                uid TEXT NOT NULL,
                ordinal INTEGER NOT NULL,
                name TEXT NOT NULL,
                x INTEGER NOT NULL,
                y INTEGER NOT NULL,
                current_health INTEGER NOT NULL,
                max_health INTEGER NOT NULL,
                power INTEGER NOT NULL,
                defense INTEGER NOT NULL,
                glyph TEXT NOT NULL,
                PRIMARY KEY (campaign_id, uid)
            )
        "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS monsters (
                campaign_id TEXT NOT NULL,
                id TEXT NOT NULL,
                ordinal INTEGER NOT NULL,
                name TEXT NOT NULL,
                level INTEGER NOT NULL,
                x INTEGER NOT NULL,
                y INTEGER NOT NULL,
                current_health INTEGER NOT NULL,
                max_health INTEGER NOT NULL,
                power INTEGER NOT NULL,
                defense INTEGER NOT NULL,
                experience INTEGER NOT NULL,
                glyph TEXT NOT NULL,
                PRIMARY KEY (campaign_id, id)
            )
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> PersistenceError {
    PersistenceError::Database(e.to_string())
}

fn character_from_row(row: &SqliteRow) -> Result<Character, sqlx::Error> {
    Ok(Character {
        uid: UserId::new(row.try_get::<String, _>("uid")?),
        name: row.try_get("name")?,
        position: Position::new(row.try_get("x")?, row.try_get("y")?),
        current_health: row.try_get("current_health")?,
        max_health: row.try_get("max_health")?,
        power: row.try_get("power")?,
        defense: row.try_get("defense")?,
        glyph: row.try_get("glyph")?,
    })
}

fn monster_from_row(row: &SqliteRow) -> Result<Monster, PersistenceError> {
    let id: String = row.try_get("id").map_err(db_error)?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| PersistenceError::Serialization(format!("monster id {}: {}", id, e)))?;
    let get_i32 = |column: &str| row.try_get::<i32, _>(column).map_err(db_error);

    Ok(Monster {
        id: MonsterId::from_uuid(id),
        name: row.try_get("name").map_err(db_error)?,
        level: row.try_get("level").map_err(db_error)?,
        position: Position::new(get_i32("x")?, get_i32("y")?),
        current_health: get_i32("current_health")?,
        max_health: get_i32("max_health")?,
        power: get_i32("power")?,
        defense: get_i32("defense")?,
        experience: row.try_get("experience").map_err(db_error)?,
        glyph: row.try_get("glyph").map_err(db_error)?,
    })
}

fn bind_character<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    character: &'q Character,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(character.uid.as_str())
        .bind(&character.name)
        .bind(character.position.x)
        .bind(character.position.y)
        .bind(character.current_health)
        .bind(character.max_health)
        .bind(character.power)
        .bind(character.defense)
        .bind(&character.glyph)
}

fn bind_monster<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    monster: &'q Monster,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(monster.id.to_string())
        .bind(&monster.name)
        .bind(monster.level)
        .bind(monster.position.x)
        .bind(monster.position.y)
        .bind(monster.current_health)
        .bind(monster.max_health)
        .bind(monster.power)
        .bind(monster.defense)
        .bind(monster.experience)
        .bind(&monster.glyph)
}

#[async_trait]
impl CampaignRepositoryPort for SqliteCampaignRepository {
    #[instrument(skip(self))]
    async fn load_campaign(&self, id: &CampaignId) -> Result<Campaign, PersistenceError> {
        let row = sqlx::query("SELECT dungeon, created_at FROM campaigns WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or_else(|| PersistenceError::NotFound(id.clone()))?;

        let dungeon: String = row.try_get("dungeon").map_err(db_error)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(db_error)?;
        let grid = Grid::decode(&dungeon)?;

        let characters = sqlx::query(&format!(
            "SELECT {} FROM characters WHERE campaign_id = ? ORDER BY ordinal",
            CHARACTER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .iter()
        .map(character_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(db_error)?;

        let monsters = sqlx::query(&format!(
            "SELECT {} FROM monsters WHERE campaign_id = ? ORDER BY ordinal",
            MONSTER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .iter()
        .map(monster_from_row)
        .collect::<Result<Vec<_>, _>>()?;

        debug!(
            characters = characters.len(),
            monsters = monsters.len(),
            "Campaign loaded"
        );
        Ok(Campaign::new(id.clone(), grid)
            .with_characters(characters)
            .with_monsters(monsters)
            .with_created_at(created_at))
    }

    #[instrument(skip(self, campaign), fields(campaign_id = %campaign.id()))]
    async fn save_campaign(&self, campaign: &Campaign) -> Result<(), PersistenceError> {
        let dungeon = campaign.grid().encode()?;
        let id = campaign.id().as_str();
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query(
            r#"
            INSERT INTO campaigns (id, dungeon, created_at, updated_at) VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET dungeon = excluded.dungeon, updated_at = excluded.updated_at
        "#,
        )
        .bind(id)
        .bind(&dungeon)
        .bind(campaign.created_at())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        sqlx::query("DELETE FROM characters WHERE campaign_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        let insert_character = format!(
            "INSERT INTO characters (campaign_id, ordinal, {}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            CHARACTER_COLUMNS
        );
        for (ordinal, character) in campaign.characters().enumerate() {
            let query = sqlx::query(&insert_character).bind(id).bind(ordinal as i64);
            bind_character(query, character)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        sqlx::query("DELETE FROM monsters WHERE campaign_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        let insert_monster = format!(
            "INSERT INTO monsters (campaign_id, ordinal, {}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            MONSTER_COLUMNS
        );
        for (ordinal, monster) in campaign.monsters().enumerate() {
            let query = sqlx::query(&insert_monster).bind(id).bind(ordinal as i64);
            bind_monster(query, monster)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)
    }

    async fn save_character(
        &self,
        campaign_id: &CampaignId,
        character: &Character,
    ) -> Result<(), PersistenceError> {
        let sql = format!(
            r#"
            INSERT INTO characters (campaign_id, ordinal, {})
            VALUES (?, (SELECT COALESCE(MAX(ordinal) + 1, 0) FROM characters WHERE campaign_id = ?),
                    ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(campaign_id, uid) DO UPDATE SET
                name = excluded.name, x = excluded.x, y = excluded.y,
                current_health = excluded.current_health, max_health = excluded.max_health,
                power = excluded.power, defense = excluded.defense, glyph = excluded.glyph
        "#,
            CHARACTER_COLUMNS
        );
        let query = sqlx::query(&sql)
            .bind(campaign_id.as_str())
            .bind(campaign_id.as_str());
        bind_character(query, character)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn save_monster(
        &self,
        campaign_id: &CampaignId,
        monster: &Monster,
    ) -> Result<(), PersistenceError> {
        let sql = format!(
            r#"
            INSERT INTO monsters (campaign_id, ordinal, {})
            VALUES (?, (SELECT COALESCE(MAX(ordinal) + 1, 0) FROM monsters WHERE campaign_id = ?),
                    ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(campaign_id, id) DO UPDATE SET
                name = excluded.name, level = excluded.level, x = excluded.x, y = excluded.y,
                current_health = excluded.current_health, max_health = excluded.max_health,
                power = excluded.power, defense = excluded.defense,
                experience = excluded.experience, glyph = excluded.glyph
        "#,
            MONSTER_COLUMNS
        );
        let query = sqlx::query(&sql)
            .bind(campaign_id.as_str())
            .bind(campaign_id.as_str());
        bind_monster(query, monster)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_campaign(&self, id: &CampaignId) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        for table in ["characters", "monsters"] {
            sqlx::query(&format!("DELETE FROM {} WHERE campaign_id = ?", table))
                .bind(id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }
        let deleted = sqlx::query("DELETE FROM campaigns WHERE id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?
            .rows_affected();
        if deleted == 0 {
            return Err(PersistenceError::NotFound(id.clone()));
        }
        tx.commit().await.map_err(db_error)
    }

    async fn find_character(
        &self,
        campaign_id: &CampaignId,
        uid: &UserId,
    ) -> Result<Option<Character>, PersistenceError> {
        sqlx::query(&format!(
            "SELECT {} FROM characters WHERE campaign_id = ? AND uid = ?",
            CHARACTER_COLUMNS
        ))
        .bind(campaign_id.as_str())
        .bind(uid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(|row| character_from_row(&row))
        .transpose()
        .map_err(db_error)
    }

    async fn find_monster(
        &self,
        campaign_id: &CampaignId,
        name: &str,
    ) -> Result<Option<Monster>, PersistenceError> {
        sqlx::query(&format!(
            "SELECT {} FROM monsters WHERE campaign_id = ? AND name = ? ORDER BY ordinal LIMIT 1",
            MONSTER_COLUMNS
        ))
        .bind(campaign_id.as_str())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(|row| monster_from_row(&row))
        .transpose()
    }
}
