use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::message::{CreateMessage, Message};

#[derive(Clone)]
pub struct MessageService {
    pool: PgPool,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn send(&self, msg: CreateMessage) -> Result<Message> {
        if msg.sender_id == msg.recipient_id {
            return Err(Error::BadRequest(
                "Cannot send a message to yourself".to_string(),
            ));
        }
        let recipient = sqlx::query(r#"SELECT id FROM users WHERE id = $1 AND is_active"#)
            .bind(msg.recipient_id)
            .fetch_optional(&self.pool)
            .await?;
        if recipient.is_none() {
            return Err(Error::NotFound("Recipient not found".to_string()));
        }

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, recipient_id, text)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(msg.sender_id)
        .bind(msg.recipient_id)
        .bind(&msg.text)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn conversation(&self, user_a: Uuid, user_b: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn mark_as_read(&self, recipient_id: Uuid, sender_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_at = NOW()
            WHERE recipient_id = $1 AND sender_id = $2 AND read_at IS NULL
            "#,
        )
        .bind(recipient_id)
        .bind(sender_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn unread_count(&self, recipient_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE recipient_id = $1 AND read_at IS NULL
            "#,
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
