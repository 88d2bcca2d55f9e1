use std::ops::Range;

use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::Coll;

/// Counter backing question IDs.
pub const QUESTION_ID_COUNTER_ID: &str = "question_id";
/// Counter backing option IDs.
pub const OPTION_ID_COUNTER_ID: &str = "option_id";

/// A counter object used to implement auto-increment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u64,
}

impl Counter {
    /// Atomically reserve `count` consecutive values of the counter with the given ID.
    pub async fn reserve(counters: &Coll<Counter>, id: &str, count: usize) -> Result<Range<u64>> {
        let step = i64::try_from(count)
            .map_err(|_| Error::Internal(format!("Cannot reserve {count} values of counter {id}")))?;
        let update = doc! {
            "$inc": { "next": step }
        };
        let options: FindOneAndUpdateOptions = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?
            .ok_or_else(|| Error::Internal(format!("Failed to find counter with ID {id}")))?;
        Ok(counter.next..counter.next + count as u64)
    }
}

/// Ensure the question and option ID counters exist, without resetting them if they do.
///
/// This operation is idempotent.
pub async fn ensure_id_counters_exist(counters: &Coll<Counter>) -> Result<()> {
    let upsert = UpdateOptions::builder().upsert(true).build();
    for id in [QUESTION_ID_COUNTER_ID, OPTION_ID_COUNTER_ID] {
        counters
            .update_one(
                doc! { "_id": id },
                doc! { "$setOnInsert": { "next": 1_i64 } },
                upsert.clone(),
            )
            .await?;
    }
    Ok(())
}
