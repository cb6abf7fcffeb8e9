//! Base-unit amount (de)serialization.
//!
//! Amounts are `u128` base units throughout the crate. JSON numbers cannot
//! carry uint256-scale values, so the wire format is an integer-valued
//! string. Deserialization accepts both a string and a plain integer (small
//! test fixtures use the latter); serialization always emits a string.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serializer};

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = u128;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an unsigned integer or an integer-valued string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
        v.trim()
            .parse::<u128>()
            .map_err(|_| E::custom(format!("invalid base-unit amount: {v:?}")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
        Ok(v as u128)
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
        Ok(v)
    }
}

pub fn serialize<S: Serializer>(v: &u128, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(v)
}

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
    d.deserialize_any(AmountVisitor)
}

/// `Option<u128>` variant of the amount codec.
pub mod opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<u128>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(x) => s.serialize_some(&x.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u128>, D::Error> {
        #[derive(Deserialize)]
        struct Raw(#[serde(with = "super")] u128);

        Ok(Option::<Raw>::deserialize(d)?.map(|r| r.0))
    }
}

/// `HashMap<String, u128>` variant, used for per-token caps and volumes.
pub mod map {
    use super::HashMap;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        v: &HashMap<String, u128>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        let mut m = s.serialize_map(Some(v.len()))?;
        for (k, amount) in v {
            m.serialize_entry(k, &amount.to_string())?;
        }
        m.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<HashMap<String, u128>, D::Error> {
        #[derive(Deserialize)]
        struct Raw(#[serde(with = "super")] u128);

        let raw: HashMap<String, Raw> = HashMap::deserialize(d)?;
        Ok(raw.into_iter().map(|(k, v)| (k, v.0)).collect())
    }
}
