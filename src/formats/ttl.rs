//! Turtle rendering of records against the SPECIAL log and policy vocabularies.
//!
//! Each record renders as a single line of subject blocks of the form
//! `<s> <p> <o> ; <p> <o> .`. Statements whose value is empty are left out, and
//! compact vocabulary terms such as `svpu:Marketing` are expanded to full IRIs.

use crate::core::error::{Error, Result};
use crate::core::event::{ConsentEvent, LogEvent, Record, SimplePolicy};
use crate::core::ids::new_id;
use chrono::{DateTime, SecondsFormat};
use rand::Rng;

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
const SPLOG: &str = "http://www.specialprivacy.eu/langs/splog#";
const SPL: &str = "http://www.specialprivacy.eu/langs/usage-policy#";
const SVPOL: &str = "http://www.specialprivacy.eu/vocabs/policy#";
const PROV: &str = "http://www.w3.org/ns/prov#";
const DCT: &str = "http://purl.org/dc/terms/";

const LOGS: &str = "http://example.com/logs/";
const APPLICATIONS: &str = "http://example.com/applications/";
const LOG_ENTRIES: &str = "http://example.com/logEntries/";
const LOG_ENTRY_CONTENTS: &str = "http://example.com/logEntryContents/";
const USERS: &str = "http://www.example.com/users/";
const POLICIES: &str = "http://www.example.com/policy/";

const PREFIXES: [(&str, &str); 10] = [
    ("spl", SPL),
    ("svpu", "http://www.specialprivacy.eu/vocabs/purposes#"),
    ("svpr", "http://www.specialprivacy.eu/vocabs/processing#"),
    ("svr", "http://www.specialprivacy.eu/vocabs/recipients#"),
    ("svl", "http://www.specialprivacy.eu/vocabs/locations#"),
    ("svd", "http://www.specialprivacy.eu/vocabs/data#"),
    ("splog", SPLOG),
    ("dct", DCT),
    ("prov", PROV),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
];

/// Per-kind Turtle template; fixed for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlTemplate {
    Log,
    Consent,
}

impl TtlTemplate {
    pub fn render(&self, record: &Record, rng: &mut impl Rng) -> Result<String> {
        match (self, record) {
            (TtlTemplate::Log, Record::Log(event)) => render_log(event, rng),
            (TtlTemplate::Consent, Record::Consent(event)) => render_consent(event),
            (TtlTemplate::Log, Record::Consent(_)) => Err(Error::Serialization(
                "log template cannot render a consent record".to_string(),
            )),
            (TtlTemplate::Consent, Record::Log(_)) => Err(Error::Serialization(
                "consent template cannot render a log record".to_string(),
            )),
        }
    }
}

/// Expands a `prefix:term` compact IRI for the known vocabularies; other values pass through.
pub fn expand_prefix(term: &str) -> String {
    if let Some((prefix, local)) = term.split_once(':') {
        if let Some((_, namespace)) = PREFIXES.iter().find(|(name, _)| *name == prefix) {
            return format!("{namespace}{local}");
        }
    }
    term.to_string()
}

enum Object {
    Iri(String),
    DateTime(String),
    Blank(Vec<(String, Object)>),
}

impl Object {
    fn iri(value: impl AsRef<str>) -> Self {
        Object::Iri(value.as_ref().to_string())
    }

    fn term(value: &str) -> Self {
        Object::Iri(expand_prefix(value))
    }

    fn write(&self, out: &mut String) {
        match self {
            Object::Iri(iri) => write_iri(out, iri),
            Object::DateTime(text) => {
                out.push('"');
                out.push_str(text);
                out.push_str("\"^^");
                write_iri(out, XSD_DATE_TIME);
            }
            Object::Blank(pairs) => {
                out.push('[');
                write_pairs(out, pairs);
                out.push_str(" ]");
            }
        }
    }
}

/// One subject with its predicate/object list, closed by `.`.
struct Block {
    subject: String,
    pairs: Vec<(String, Object)>,
}

impl Block {
    fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            pairs: Vec::new(),
        }
    }

    fn with(mut self, predicate: impl Into<String>, object: Object) -> Self {
        self.pairs.push((predicate.into(), object));
        self
    }

    fn with_if(
        self,
        present: bool,
        predicate: impl Into<String>,
        object: impl FnOnce() -> Object,
    ) -> Self {
        if present {
            self.with(predicate, object())
        } else {
            self
        }
    }

    fn with_some(self, predicate: impl Into<String>, object: Option<Object>) -> Self {
        match object {
            Some(object) => self.with(predicate, object),
            None => self,
        }
    }

    fn write(&self, out: &mut String) {
        if !out.is_empty() {
            out.push(' ');
        }
        write_iri(out, &self.subject);
        write_pairs(out, &self.pairs);
        out.push_str(" .");
    }
}

fn write_pairs(out: &mut String, pairs: &[(String, Object)]) {
    for (index, (predicate, object)) in pairs.iter().enumerate() {
        if index > 0 {
            out.push_str(" ;");
        }
        out.push(' ');
        write_iri(out, predicate);
        out.push(' ');
        object.write(out);
    }
}

/// Writes `<iri>`, percent-encoding characters that IRIREF does not allow.
fn write_iri(out: &mut String, iri: &str) {
    out.push('<');
    for ch in iri.chars() {
        match ch {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | ' ' => {
                out.push_str(&format!("%{:02X}", ch as u32));
            }
            ch if ch.is_control() => {
                let mut buf = [0u8; 4];
                for byte in ch.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{byte:02X}"));
                }
            }
            ch => out.push(ch),
        }
    }
    out.push('>');
}

fn iso_time(timestamp: i64) -> Result<String> {
    DateTime::from_timestamp_millis(timestamp)
        .map(|time| time.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| Error::Serialization(format!("timestamp {timestamp} out of range")))
}

fn render_log(event: &LogEvent, rng: &mut impl Rng) -> Result<String> {
    let log_entry = format!("{LOG_ENTRIES}{}", new_id(rng));
    let content = format!("{LOG_ENTRY_CONTENTS}{}", new_id(rng));
    let mut out = String::new();

    if !event.process.is_empty() {
        Block::new(format!("{LOGS}{}", event.process))
            .with(RDF_TYPE, Object::iri(format!("{SPLOG}Log")))
            .with(
                format!("{PROV}wasAttributedTo"),
                Object::iri(format!("{APPLICATIONS}{}", event.process)),
            )
            .with(format!("{SPLOG}logEntry"), Object::iri(&log_entry))
            .write(&mut out);
    }

    let transaction_time = if event.timestamp != 0 {
        Some(Object::DateTime(iso_time(event.timestamp)?))
    } else {
        None
    };
    Block::new(log_entry)
        .with(RDF_TYPE, Object::iri(format!("{SPLOG}LogEntry")))
        .with_some(format!("{SPLOG}transactionTime"), transaction_time)
        .with_if(!event.user_id.is_empty(), format!("{SPLOG}dataSubject"), || {
            Object::iri(format!("{USERS}{}", event.user_id))
        })
        .with(format!("{SPLOG}logEntryContent"), Object::iri(&content))
        .write(&mut out);

    let mut block = Block::new(content)
        .with(RDF_TYPE, Object::iri(format!("{SPLOG}LogEntryContent")))
        .with_if(!event.purpose.is_empty(), format!("{SPL}hasPurpose"), || {
            Object::term(&event.purpose)
        })
        .with_if(!event.processing.is_empty(), format!("{SPL}hasProcessing"), || {
            Object::term(&event.processing)
        })
        .with_if(!event.storage.is_empty(), format!("{SPL}hasStorage"), || {
            Object::term(&event.storage)
        })
        .with_if(!event.recipient.is_empty(), format!("{SPL}hasRecipient"), || {
            Object::term(&event.recipient)
        });
    for data in event.data.iter().filter(|data| !data.is_empty()) {
        block = block.with(format!("{SPL}hasData"), Object::term(data));
    }
    block.write(&mut out);

    Ok(out)
}

fn render_consent(event: &ConsentEvent) -> Result<String> {
    let policy = format!("{POLICIES}{}", event.consent_id);
    let user = format!("{USERS}{}", event.user_id);
    let mut out = String::new();

    if !event.user_id.is_empty() {
        Block::new(user.clone())
            .with(format!("{SPL}hasPolicy"), Object::iri(&policy))
            .write(&mut out);
    }

    let created = if event.timestamp != 0 {
        Some(Object::DateTime(iso_time(event.timestamp)?))
    } else {
        None
    };
    let mut block = Block::new(policy)
        .with(RDF_TYPE, Object::iri(format!("{SVPOL}Consent")))
        .with_some(format!("{DCT}created"), created)
        .with_if(!event.user_id.is_empty(), format!("{SPL}hasDataSubject"), || {
            Object::iri(&user)
        });
    for simple in &event.simple_policies {
        block = block.with(format!("{SVPOL}simplePolicy"), simple_policy(simple));
    }
    block.write(&mut out);

    Ok(out)
}

fn simple_policy(policy: &SimplePolicy) -> Object {
    let fields = [
        ("hasPurpose", &policy.purpose),
        ("hasProcessing", &policy.processing),
        ("hasStorage", &policy.storage),
        ("hasRecipient", &policy.recipient),
        ("hasData", &policy.data),
    ];
    Object::Blank(
        fields
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(predicate, value)| (format!("{SPL}{predicate}"), Object::term(value)))
            .collect(),
    )
}
