use uuid::Uuid;

use crate::{FieldError, schema::builder::SchemaBuilder};

graphql_scalar!(Uuid);

impl SchemaBuilder {
    /// Declares the `UUID` scalar, represented as its hyphenated string form.
    pub fn uuid_scalar(&mut self) -> &mut Self {
        self.string_scalar::<Uuid>(|s| {
            s.name("UUID")
                .serialize(Uuid::to_string)
                .deserialize(|raw| {
                    Uuid::parse_str(&raw)
                        .map_err(|e| FieldError::from(format!("Failed to parse `Uuid`: {e}")))
                })
        })
    }
}
