//! Campaign data model and metadata validation

use serde_yaml::{Mapping, Value};
use std::path::PathBuf;

use crate::error::ValidationErrors;
use crate::headers::Headers;

/// Template variables of one recipient
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// One destination of a campaign
#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub address: String,
    pub fields: Fields,
}

/// Validated campaign metadata
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignData {
    pub attachments: Vec<PathBuf>,
    pub headers: Headers,
    pub recipients: Vec<Recipient>,
}

const CAMPAIGN_KEYS: [&str; 3] = ["attachments", "headers", "recipients"];
const RECIPIENT_KEYS: [&str; 2] = ["address", "fields"];

impl CampaignData {
    /// Validate frontmatter metadata into campaign data
    ///
    /// Every problem is collected before returning, so the operator sees the
    /// whole list at once instead of fixing one field per run.
    pub fn from_metadata(metadata: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let empty = Mapping::new();
        let root = match metadata {
            Value::Mapping(map) => map,
            Value::Null => &empty,
            _ => {
                errors.push("<root>", "expected a mapping");
                return Err(errors);
            }
        };

        reject_unknown_keys(root, &CAMPAIGN_KEYS, "", &mut errors);

        let headers = match root.get("headers") {
            Some(value) => parse_headers(value, &mut errors),
            None => {
                errors.push("headers", "field required");
                Headers::new()
            }
        };

        let attachments = match root.get("attachments") {
            Some(value) => parse_attachments(value, &mut errors),
            None => Vec::new(),
        };

        let recipients = match root.get("recipients") {
            Some(Value::Sequence(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| parse_recipient(item, i, &mut errors))
                .collect(),
            Some(_) => {
                errors.push("recipients", "expected a list");
                Vec::new()
            }
            None => {
                errors.push("recipients", "field required");
                Vec::new()
            }
        };

        if errors.is_empty() {
            Ok(CampaignData {
                attachments,
                headers,
                recipients,
            })
        } else {
            Err(errors)
        }
    }
}

fn reject_unknown_keys(map: &Mapping, known: &[&str], prefix: &str, errors: &mut ValidationErrors) {
    for key in map.keys() {
        match key.as_str() {
            Some(name) if known.contains(&name) => {}
            Some(name) => errors.push(format!("{}{}", prefix, name), "unknown field"),
            None => errors.push(format!("{}{:?}", prefix, key), "unknown field"),
        }
    }
}

/// Scalars are accepted as header values and rendered as text
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_headers(value: &Value, errors: &mut ValidationErrors) -> Headers {
    let Value::Mapping(map) = value else {
        errors.push("headers", "expected a mapping");
        return Headers::new();
    };

    let mut headers = Headers::new();
    for (key, value) in map {
        let Some(name) = key.as_str() else {
            errors.push("headers", format!("non-string key {:?}", key));
            continue;
        };
        match scalar_to_string(value) {
            Some(text) => headers.insert(name, text),
            None => errors.push(format!("headers.{}", name), "expected a string"),
        }
    }
    headers
}

fn parse_attachments(value: &Value, errors: &mut ValidationErrors) -> Vec<PathBuf> {
    let Value::Sequence(items) = value else {
        errors.push("attachments", "expected a list of file paths");
        return Vec::new();
    };

    let mut paths = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(path) => paths.push(PathBuf::from(path)),
            None => errors.push(format!("attachments[{}]", i), "expected a string"),
        }
    }
    paths
}

fn parse_recipient(value: &Value, index: usize, errors: &mut ValidationErrors) -> Option<Recipient> {
    let path = format!("recipients[{}]", index);
    let Value::Mapping(map) = value else {
        errors.push(path, "expected a mapping");
        return None;
    };

    let before = errors.issues.len();
    reject_unknown_keys(map, &RECIPIENT_KEYS, &format!("{}.", path), errors);

    let address = match map.get("address") {
        Some(Value::String(address)) => Some(address.clone()),
        Some(_) => {
            errors.push(format!("{}.address", path), "expected a string");
            None
        }
        None => {
            errors.push(format!("{}.address", path), "field required");
            None
        }
    };

    let fields = match map.get("fields") {
        Some(value @ Value::Mapping(_)) => match serde_json::to_value(value) {
            Ok(serde_json::Value::Object(fields)) => Some(fields),
            Ok(_) => {
                errors.push(format!("{}.fields", path), "expected a mapping");
                None
            }
            Err(e) => {
                errors.push(format!("{}.fields", path), e.to_string());
                None
            }
        },
        Some(_) => {
            errors.push(format!("{}.fields", path), "expected a mapping");
            None
        }
        None => {
            errors.push(format!("{}.fields", path), "field required");
            None
        }
    };

    if errors.issues.len() != before {
        return None;
    }
    Some(Recipient {
        address: address?,
        fields: fields?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_metadata() {
        let data = CampaignData::from_metadata(&metadata(
            r#"
headers:
  Subject: Spring meetup
  Reply-To: events@example.com
attachments:
  - files/agenda.pdf
recipients:
  - address: alice@example.com
    fields:
      name: Alice
      seats: 2
  - address: bob@example.com
    fields:
      name: Bob
"#,
        ))
        .unwrap();

        assert_eq!(data.headers.get("Subject"), Some("Spring meetup"));
        assert_eq!(data.attachments, vec![PathBuf::from("files/agenda.pdf")]);
        assert_eq!(data.recipients.len(), 2);
        assert_eq!(data.recipients[0].address, "alice@example.com");
        assert_eq!(data.recipients[0].fields["seats"], serde_json::json!(2));
        assert_eq!(data.recipients[1].fields["name"], serde_json::json!("Bob"));
    }

    #[test]
    fn test_attachments_default_to_empty() {
        let data = CampaignData::from_metadata(&metadata(
            "headers: {Subject: Hi}\nrecipients: []\n",
        ))
        .unwrap();
        assert!(data.attachments.is_empty());
        assert!(data.recipients.is_empty());
    }

    #[test]
    fn test_missing_required_fields_are_all_reported() {
        let errors = CampaignData::from_metadata(&Value::Null).unwrap_err();
        assert!(errors.has_path("headers"));
        assert!(errors.has_path("recipients"));
        assert_eq!(errors.issues.len(), 2);
    }

    #[test]
    fn test_recipient_problems_carry_their_index() {
        let errors = CampaignData::from_metadata(&metadata(
            r#"
headers: {Subject: Hi}
recipients:
  - address: ok@example.com
    fields: {}
  - fields: {name: Nobody}
  - address: [not, a, string]
    fields: plain text
    extra: 1
"#,
        ))
        .unwrap_err();

        assert!(errors.has_path("recipients[1].address"));
        assert!(errors.has_path("recipients[2].address"));
        assert!(errors.has_path("recipients[2].fields"));
        assert!(errors.has_path("recipients[2].extra"));
        assert!(!errors.has_path("recipients[0].address"));
    }

    #[test]
    fn test_unknown_top_level_field_is_rejected() {
        let errors = CampaignData::from_metadata(&metadata(
            "headers: {Subject: Hi}\nrecipients: []\nrecipient: []\n",
        ))
        .unwrap_err();
        assert!(errors.has_path("recipient"));
    }

    #[test]
    fn test_malformed_headers_and_attachments() {
        let errors = CampaignData::from_metadata(&metadata(
            "headers: [Subject]\nattachments: [a.pdf, {nested: 1}]\nrecipients: []\n",
        ))
        .unwrap_err();
        assert!(errors.has_path("headers"));
        assert!(errors.has_path("attachments[1]"));
    }

    #[test]
    fn test_numeric_header_values_become_text() {
        let data = CampaignData::from_metadata(&metadata(
            "headers: {Subject: Hi, X-Campaign-Id: 42}\nrecipients: []\n",
        ))
        .unwrap();
        assert_eq!(data.headers.get("X-Campaign-Id"), Some("42"));
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        let errors = CampaignData::from_metadata(&metadata("- just\n- a list\n")).unwrap_err();
        assert!(errors.has_path("<root>"));
    }
}
