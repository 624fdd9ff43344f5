use core::str::FromStr;

use serde::{de::Visitor, Deserialize, Serialize};

use crate::{QubicId, QubicTxHash, Signature};

struct QubicIdVisitor;

impl<'de> Visitor<'de> for QubicIdVisitor {
    type Value = QubicId;

    fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
        formatter.write_str("60 uppercase character alphabetic ASCII string")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        QubicId::from_str(value).map_err(|e| E::custom(e.to_string()))
    }
}

impl Serialize for QubicId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&self.get_identity())
    }
}

impl<'de> Deserialize<'de> for QubicId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(QubicIdVisitor)
    }
}

struct QubicTxHashVisitor;

impl<'de> Visitor<'de> for QubicTxHashVisitor {
    type Value = QubicTxHash;

    fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
        formatter.write_str("60 lowercase character alphabetic ASCII string")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        QubicTxHash::from_str(value).map_err(|e| E::custom(e.to_string()))
    }
}

impl Serialize for QubicTxHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&self.get_identity())
    }
}

impl<'de> Deserialize<'de> for QubicTxHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(QubicTxHashVisitor)
    }
}

struct HexVisitor<const LENGTH: usize>;

impl<'de, const LENGTH: usize> Visitor<'de> for HexVisitor<LENGTH> {
    type Value = [u8; LENGTH];

    fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
        formatter.write_str("0x prefixed hexadecimal string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        let stripped = v
            .strip_prefix("0x")
            .ok_or_else(|| E::custom("string is not 0x prefixed"))?;

        match hex::decode(stripped) {
            Ok(r) => r
                .try_into()
                .map_err(|_| E::custom("invalid length")),
            Err(e) => Err(E::custom(e.to_string())),
        }
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&format!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Signature(deserializer.deserialize_str(HexVisitor)?))
    }
}
