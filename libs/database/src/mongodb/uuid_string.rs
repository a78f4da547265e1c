//! Serde adapters that store [`Uuid`]s as hyphenated strings.
//!
//! `uuid`'s own `Serialize` impl writes bytes for non human-readable
//! serializers, which is what the driver uses for inserts, while
//! `bson::to_bson` writes strings. Pinning the representation keeps
//! stored documents and query filters in agreement and matches the JSON shape.
//!
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct Sweet {
//!     #[serde(rename = "_id", with = "database::mongodb::uuid_string")]
//!     id: Uuid,
//!     #[serde(default, with = "database::mongodb::uuid_string::vec")]
//!     admins: Vec<Uuid>,
//! }
//! ```

use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
use uuid::Uuid;

pub fn serialize<S: Serializer>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&id.hyphenated())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Uuid::parse_str(&raw).map_err(D::Error::custom)
}

pub mod vec {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::SerializeSeq};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(ids: &[Uuid], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(ids.len()))?;
        for id in ids {
            seq.serialize_element(&id.hyphenated().to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Uuid>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|raw| Uuid::parse_str(raw).map_err(D::Error::custom))
            .collect()
    }
}
