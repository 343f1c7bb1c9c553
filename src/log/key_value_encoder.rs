use log::{
    Record,
    kv::{Error, Key, Value, VisitSource},
};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::encode::{Encode, Write};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct KeyValueEncoderConfig {
    pub pattern: Option<String>,
}

/// Pattern encoder that appends the record's structured fields as
/// ` key=value` pairs. Values containing whitespace, quotes or `=` are quoted.
#[derive(Debug)]
pub struct KeyValueEncoder {
    delegate: PatternEncoder,
}

impl KeyValueEncoder {
    pub fn new(pattern: &str) -> Self {
        Self {
            delegate: PatternEncoder::new(pattern),
        }
    }
}

impl Encode for KeyValueEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record) -> anyhow::Result<()> {
        self.delegate.encode(w, record)?;

        let mut fields = FieldCollector::default();
        if let Err(e) = record.key_values().visit(&mut fields) {
            fields.pairs.push(("kv_error".to_string(), e.to_string()));
        }

        for (key, value) in fields.pairs {
            write!(w, " {}={}", key, quote(&value))?;
        }

        w.write_all(b"\n")?;
        Ok(())
    }
}

#[derive(Default)]
struct FieldCollector {
    pairs: Vec<(String, String)>,
}

impl<'kvs> VisitSource<'kvs> for FieldCollector {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), Error> {
        self.pairs.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == '"' || c == '=');
    if needs_quotes {
        format!("{:?}", value)
    } else {
        value.to_string()
    }
}

pub struct KeyValueEncoderDeserializer;

impl log4rs::config::Deserialize for KeyValueEncoderDeserializer {
    type Trait = dyn Encode;
    type Config = KeyValueEncoderConfig;

    fn deserialize(
        &self,
        config: KeyValueEncoderConfig,
        _: &log4rs::config::Deserializers,
    ) -> anyhow::Result<Box<dyn Encode>> {
        let pattern = config.pattern.as_deref().unwrap_or("{d} {l} {t} - {m}");
        Ok(Box::new(KeyValueEncoder::new(pattern)))
    }
}
