/// Treat an `Option<OffsetDateTime>` as a Unix timestamp, accepting fractional values when
/// deserializing.
///
/// Use this module in combination with serde's `#[serde(with = "...")]` attribute.
///
/// When deserializing, the offset is assumed to be UTC.
pub mod option {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use time::OffsetDateTime;

    /// Serialize an `Option<OffsetDateTime>` as its Unix timestamp
    pub fn serialize<S: Serializer>(
        option: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        option
            .map(OffsetDateTime::unix_timestamp)
            .serialize(serializer)
    }

    /// Deserialize an `Option<OffsetDateTime>` from its Unix timestamp
    pub fn deserialize<'a, D: Deserializer<'a>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        Option::<f64>::deserialize(deserializer)?
            .map(|val| val as i64)
            .map(OffsetDateTime::from_unix_timestamp)
            .transpose()
            .map_err(|err| Error::custom(format!("failed to deserialize timestamp: {err}")))
    }
}
