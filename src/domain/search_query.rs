use itertools::Itertools;
use serde::Deserialize;
use serde_json::Value;

const PEOPLE_SEARCH_URL: &str = "https://www.linkedin.com/search/results/people/";

pub const DEFAULT_JOB_TITLES: [&str; 4] = [
    "Product Regulatory Manager",
    "Regulatory Compliance Director",
    "Product Stewardship Director",
    "Product Sustainability Director",
];

/// Body of `POST /search-profiles`.
///
/// `titles` stays loosely typed: anything other than a non-empty array means
/// "use the defaults".
#[derive(Deserialize, Debug, Default, Clone)]
pub struct SearchRequest {
    pub company: Option<String>,
    pub titles: Option<Value>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Company name is required")]
    MissingCompany,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTitleSet(Vec<String>);

impl Default for JobTitleSet {
    fn default() -> Self {
        JobTitleSet(DEFAULT_JOB_TITLES.iter().map(|t| t.to_string()).collect())
    }
}

impl JobTitleSet {
    pub fn from_requested(titles: Option<&Value>) -> Self {
        match titles.and_then(Value::as_array) {
            Some(items) if !items.is_empty() => JobTitleSet(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(title) => title.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            _ => JobTitleSet::default(),
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub company: String,
    pub titles: JobTitleSet,
}

impl SearchQuery {
    pub fn parse(request: SearchRequest) -> Result<SearchQuery, ValidationError> {
        let company = match request.company {
            Some(company) if !company.is_empty() => company,
            _ => return Err(ValidationError::MissingCompany),
        };

        Ok(SearchQuery {
            company,
            titles: JobTitleSet::from_requested(request.titles.as_ref()),
        })
    }

    /// `("A" OR "B") "Company"`
    pub fn keywords(&self) -> String {
        let titles_query = self
            .titles
            .as_slice()
            .iter()
            .map(|title| format!(r#""{}""#, title))
            .join(" OR ");

        format!(r#"({}) "{}""#, titles_query, self.company)
    }

    pub fn search_url(&self) -> String {
        format!(
            "{}?keywords={}",
            PEOPLE_SEARCH_URL,
            urlencoding::encode(&self.keywords())
        )
    }
}
