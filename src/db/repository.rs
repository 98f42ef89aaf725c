//! Database repository for CRUD operations.
//!
//! Uses prepared statements; uniqueness and referential integrity are left to SQLite.

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    normalize_address, ActionType, Card, CollectedCard, Collection, CreateCardRequest,
    Program, ProgramType, Quest, QuestStatus, UpdateCardRequest,
};

const CARD_COLUMNS: &str = "id, nickname, bio, image_uri, basename, role, skills, address, \
     profile_image, token_id, created_at, updated_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== CARD OPERATIONS ====================

    /// List all cards, newest first.
    pub async fn list_cards(&self) -> Result<Vec<Card>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS} FROM cards ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(card_from_row).collect())
    }

    /// Get a card by wallet address.
    pub async fn get_card_by_address(&self, address: &str) -> Result<Option<Card>, AppError> {
        let row = sqlx::query(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE address = ?"))
            .bind(normalize_address(address))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(card_from_row))
    }

    /// Get a card by ID.
    pub async fn get_card(&self, id: i64) -> Result<Option<Card>, AppError> {
        let row = sqlx::query(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(card_from_row))
    }

    /// Create a new card. A second card for the same address is a conflict.
    pub async fn create_card(&self, request: &CreateCardRequest) -> Result<Card, AppError> {
        let now = Utc::now().to_rfc3339();
        let address = normalize_address(&request.address);

        let result = sqlx::query(
            "INSERT INTO cards (nickname, bio, image_uri, basename, role, skills, address, profile_image, token_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&request.nickname)
        .bind(&request.bio)
        .bind(&request.image_uri)
        .bind(&request.basename)
        .bind(&request.role)
        .bind(skills_to_json(&request.skills))
        .bind(&address)
        .bind(&request.profile_image)
        .bind(request.token_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict(format!("Card for {} already exists", address))
            }
            other => other,
        })?;

        tracing::info!(address = %address, "Card created");

        Ok(Card {
            id: result.last_insert_rowid(),
            nickname: request.nickname.clone(),
            bio: request.bio.clone(),
            image_uri: request.image_uri.clone(),
            basename: request.basename.clone(),
            role: request.role.clone(),
            skills: request.skills.clone(),
            address,
            token_id: request.token_id,
            profile_image: request.profile_image.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Apply a profile edit to the card owned by `address`.
    pub async fn update_card(
        &self,
        address: &str,
        request: &UpdateCardRequest,
    ) -> Result<Card, AppError> {
        let existing = self
            .get_card_by_address(address)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Card {} not found", address)))?;

        let now = Utc::now().to_rfc3339();
        let updated = Card {
            nickname: request.nickname.clone().unwrap_or(existing.nickname),
            bio: request.bio.clone().unwrap_or(existing.bio),
            image_uri: request.image_uri.clone().unwrap_or(existing.image_uri),
            basename: request.basename.clone().unwrap_or(existing.basename),
            role: request.role.clone().unwrap_or(existing.role),
            skills: request.skills.clone().unwrap_or(existing.skills),
            token_id: request.token_id.or(existing.token_id),
            profile_image: request.profile_image.clone().or(existing.profile_image),
            updated_at: now,
            ..existing
        };

        sqlx::query(
            "UPDATE cards SET nickname = ?, bio = ?, image_uri = ?, basename = ?, role = ?, skills = ?, token_id = ?, profile_image = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&updated.nickname)
        .bind(&updated.bio)
        .bind(&updated.image_uri)
        .bind(&updated.basename)
        .bind(&updated.role)
        .bind(skills_to_json(&updated.skills))
        .bind(updated.token_id)
        .bind(&updated.profile_image)
        .bind(&updated.updated_at)
        .bind(updated.id)
        .execute(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete the card owned by `address`.
    pub async fn delete_card(&self, address: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM cards WHERE address = ?")
            .bind(normalize_address(address))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Card {} not found", address)));
        }

        tracing::info!(address = %address, "Card deleted");
        Ok(())
    }

    // ==================== COLLECTION OPERATIONS ====================

    /// List every collection edge.
    pub async fn list_collections(&self) -> Result<Vec<Collection>, AppError> {
        let rows = sqlx::query(
            "SELECT id, card_id, collected_card_id, created_at FROM collections ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Collection {
                id: row.get("id"),
                card_id: row.get("card_id"),
                collected_card_id: row.get("collected_card_id"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    /// List the cards collected by `card_id`, most recent first.
    pub async fn list_collected_cards(&self, card_id: i64) -> Result<Vec<CollectedCard>, AppError> {
        let rows = sqlx::query(
            "SELECT c.id, c.nickname, c.bio, c.image_uri, c.basename, c.role, c.skills, c.address, \
             c.profile_image, c.token_id, c.created_at, c.updated_at, \
             col.id AS collection_id, col.created_at AS collected_at \
             FROM collections col JOIN cards c ON c.id = col.collected_card_id \
             WHERE col.card_id = ? ORDER BY col.id DESC",
        )
        .bind(card_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| CollectedCard {
                collection_id: row.get("collection_id"),
                collected_at: row.get("collected_at"),
                card: card_from_row(row),
            })
            .collect())
    }

    /// Record that `card_id` collected `collected_card_id`.
    pub async fn create_collection(
        &self,
        card_id: i64,
        collected_card_id: i64,
    ) -> Result<Collection, AppError> {
        for id in [card_id, collected_card_id] {
            if self.get_card(id).await?.is_none() {
                return Err(AppError::NotFound(format!("Card {} not found", id)));
            }
        }

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO collections (card_id, collected_card_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(card_id)
        .bind(collected_card_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict(format!(
                "Card {} already collected card {}",
                card_id, collected_card_id
            )),
            other => other,
        })?;

        Ok(Collection {
            id: result.last_insert_rowid(),
            card_id,
            collected_card_id,
            created_at: now,
        })
    }

    // ==================== PROGRAM OPERATIONS ====================

    pub async fn list_programs(&self, owner_card_id: Option<i64>) -> Result<Vec<Program>, AppError> {
        let rows = match owner_card_id {
            Some(owner) => {
                sqlx::query(
                    "SELECT id, title, description, owner_card_id, type, created_at FROM programs WHERE owner_card_id = ? ORDER BY id DESC",
                )
                .bind(owner)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, title, description, owner_card_id, type, created_at FROM programs ORDER BY id DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.iter().filter_map(program_from_row).collect())
    }

    pub async fn create_program(
        &self,
        title: &str,
        description: &str,
        owner_card_id: i64,
        program_type: ProgramType,
    ) -> Result<Program, AppError> {
        if self.get_card(owner_card_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Card {} not found",
                owner_card_id
            )));
        }

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO programs (title, description, owner_card_id, type, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(title)
        .bind(description)
        .bind(owner_card_id)
        .bind(program_type.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Program {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            description: description.to_string(),
            owner_card_id,
            program_type,
            created_at: now,
        })
    }

    // ==================== QUEST OPERATIONS ====================

    /// List quests with their server-held status for `address`.
    /// Without an address every quest is `incomplete`.
    pub async fn list_quests(&self, address: Option<&str>) -> Result<Vec<Quest>, AppError> {
        let rows = sqlx::query(
            "SELECT q.id, q.title, q.content, q.action_type, q.reward_amount, \
             EXISTS (SELECT 1 FROM quest_claims qc WHERE qc.quest_id = q.id AND qc.address = ?) AS claimed \
             FROM quests q ORDER BY q.id",
        )
        .bind(address.map(normalize_address))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(quest_from_row).collect())
    }

    /// Get one quest with its server-held status for `address`.
    pub async fn get_quest(&self, id: i64, address: &str) -> Result<Option<Quest>, AppError> {
        let row = sqlx::query(
            "SELECT q.id, q.title, q.content, q.action_type, q.reward_amount, \
             EXISTS (SELECT 1 FROM quest_claims qc WHERE qc.quest_id = q.id AND qc.address = ?) AS claimed \
             FROM quests q WHERE q.id = ?",
        )
        .bind(normalize_address(address))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(quest_from_row))
    }

    /// Record a claim. Claiming the same quest twice is a conflict.
    pub async fn record_claim(&self, address: &str, quest_id: i64) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("INSERT INTO quest_claims (address, quest_id, claimed_at) VALUES (?, ?, ?)")
            .bind(normalize_address(address))
            .bind(quest_id)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => {
                    AppError::Conflict(format!("Quest {} already claimed", quest_id))
                }
                other => other,
            })?;

        tracing::info!(address = %address, quest_id, "Quest claimed");
        Ok(())
    }

    /// Sum of rewards over every quest `address` has claimed.
    pub async fn total_points(&self, address: &str) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(q.reward_amount), 0) AS total FROM quest_claims qc \
             JOIN quests q ON q.id = qc.quest_id WHERE qc.address = ?",
        )
        .bind(normalize_address(address))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("total"))
    }
}

// Helper functions for row conversion

fn card_from_row(row: &SqliteRow) -> Card {
    let skills: String = row.get("skills");
    Card {
        id: row.get("id"),
        nickname: row.get("nickname"),
        bio: row.get("bio"),
        image_uri: row.get("image_uri"),
        basename: row.get("basename"),
        role: row.get("role"),
        skills: parse_json_array(&skills),
        address: row.get("address"),
        token_id: row.get("token_id"),
        profile_image: row.get("profile_image"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn program_from_row(row: &SqliteRow) -> Option<Program> {
    let program_type: String = row.get("type");
    let Some(program_type) = ProgramType::parse(&program_type) else {
        tracing::warn!("Skipping program with unknown type {:?}", program_type);
        return None;
    };
    Some(Program {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        owner_card_id: row.get("owner_card_id"),
        program_type,
        created_at: row.get("created_at"),
    })
}

fn quest_from_row(row: &SqliteRow) -> Quest {
    let action_type: String = row.get("action_type");
    let claimed: i64 = row.get("claimed");
    Quest {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        action_type: ActionType::parse(&action_type),
        reward_amount: row.get("reward_amount"),
        status: if claimed != 0 {
            QuestStatus::Completed
        } else {
            QuestStatus::Incomplete
        },
    }
}

fn skills_to_json(skills: &[String]) -> String {
    serde_json::to_string(skills).unwrap_or_else(|_| "[]".to_string())
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}
