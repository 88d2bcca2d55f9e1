mod collection;
mod counter;

pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use counter::{ensure_id_counters_exist, Counter, OPTION_ID_COUNTER_ID, QUESTION_ID_COUNTER_ID};
