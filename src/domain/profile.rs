use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the agent's `data` array. The provider owns this shape, so
/// every field is read independently and a wrongly-typed field is dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawProfile {
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub subtitle: Option<String>,
    pub profile_url: Option<String>,
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

impl From<&Value> for RawProfile {
    fn from(value: &Value) -> Self {
        RawProfile {
            full_name: string_field(value, "fullName"),
            first_name: string_field(value, "firstName"),
            last_name: string_field(value, "lastName"),
            job_title: string_field(value, "jobTitle"),
            subtitle: string_field(value, "subtitle"),
            profile_url: string_field(value, "profileUrl"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
}

// The provider emits "" for unknown values, which counts as missing.
fn present(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}

impl From<RawProfile> for Profile {
    fn from(raw: RawProfile) -> Self {
        let name = present(raw.full_name).unwrap_or_else(|| {
            format!(
                "{} {}",
                raw.first_name.unwrap_or_default(),
                raw.last_name.unwrap_or_default()
            )
            .trim()
            .to_string()
        });
        let title = present(raw.job_title)
            .or(present(raw.subtitle))
            .unwrap_or_default();

        Profile {
            name,
            title,
            profile_url: raw.profile_url,
        }
    }
}
