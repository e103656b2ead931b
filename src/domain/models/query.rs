use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::{error::DomainError, models::conference::Conference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryField {
    City,
    Topic,
    Month,
    MaxAttendees,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryOperator {
    #[serde(rename = "EQ")]
    Eq,
    #[serde(rename = "NE")]
    Ne,
    #[serde(rename = "LT")]
    Lt,
    #[serde(rename = "LTEQ")]
    Lte,
    #[serde(rename = "GT")]
    Gt,
    #[serde(rename = "GTEQ")]
    Gte,
}

impl QueryOperator {
    pub fn is_inequality(&self) -> bool {
        !matches!(self, QueryOperator::Eq)
    }

    pub fn holds<T: Ord + ?Sized>(&self, left: &T, right: &T) -> bool {
        let ordering = left.cmp(right);
        match self {
            QueryOperator::Eq => ordering == Ordering::Equal,
            QueryOperator::Ne => ordering != Ordering::Equal,
            QueryOperator::Lt => ordering == Ordering::Less,
            QueryOperator::Lte => ordering != Ordering::Greater,
            QueryOperator::Gt => ordering == Ordering::Greater,
            QueryOperator::Gte => ordering != Ordering::Less,
        }
    }
}

/// Filter as submitted by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    pub field: QueryField,
    pub operator: QueryOperator,
    pub value: String,
}

/// Filter with its value parsed for the field it targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    City(QueryOperator, String),
    Topic(String),
    Month(QueryOperator, u32),
    MaxAttendees(QueryOperator, u32),
}

impl Condition {
    fn parse(filter: QueryFilter) -> Result<Self, DomainError> {
        let number = |value: &str| {
            value.trim().parse::<u32>().map_err(|_| {
                DomainError::InvalidQuery(format!("{:?} expects a number, got {value:?}", filter.field))
            })
        };

        match filter.field {
            QueryField::City => Ok(Condition::City(filter.operator, filter.value)),
            QueryField::Topic if filter.operator == QueryOperator::Eq => Ok(Condition::Topic(filter.value)),
            QueryField::Topic => Err(DomainError::InvalidQuery(
                "topics only support equality".to_string(),
            )),
            QueryField::Month => Ok(Condition::Month(filter.operator, number(&filter.value)?)),
            QueryField::MaxAttendees => Ok(Condition::MaxAttendees(
                filter.operator,
                number(&filter.value)?,
            )),
        }
    }

    pub fn matches(&self, conference: &Conference) -> bool {
        match self {
            // conferences without a city never match a city filter
            Condition::City(op, city) => conference
                .city()
                .is_some_and(|value| op.holds(value, city.as_str())),
            Condition::Topic(topic) => conference.topics().iter().any(|t| t == topic),
            Condition::Month(op, month) => op.holds(&conference.month(), month),
            Condition::MaxAttendees(op, max) => op.holds(&conference.max_attendees(), max),
        }
    }
}

/// Conjunction of conditions with at most one field under inequality
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConferenceQuery {
    conditions: Vec<Condition>,
    inequality_field: Option<QueryField>,
}

impl ConferenceQuery {
    pub fn new(filters: Vec<QueryFilter>) -> Result<Self, DomainError> {
        let mut inequality_field = None;
        let mut conditions = Vec::with_capacity(filters.len());

        for filter in filters {
            if filter.operator.is_inequality() {
                match inequality_field {
                    Some(field) if field != filter.field => {
                        return Err(DomainError::InvalidQuery(format!(
                            "inequality filter already set on {field:?}, cannot add one on {:?}",
                            filter.field
                        )));
                    }
                    _ => inequality_field = Some(filter.field),
                }
            }
            conditions.push(Condition::parse(filter)?);
        }

        Ok(Self {
            conditions,
            inequality_field,
        })
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn inequality_field(&self) -> Option<QueryField> {
        self.inequality_field
    }

    pub fn matches(&self, conference: &Conference) -> bool {
        self.conditions.iter().all(|condition| condition.matches(conference))
    }

    /// Order by the inequality field, if any, then by name
    pub fn sort(&self, conferences: &mut [Conference]) {
        conferences.sort_by(|a, b| {
            let primary = match self.inequality_field {
                Some(QueryField::City) => a.city().cmp(&b.city()),
                Some(QueryField::Month) => a.month().cmp(&b.month()),
                Some(QueryField::MaxAttendees) => a.max_attendees().cmp(&b.max_attendees()),
                Some(QueryField::Topic) | None => Ordering::Equal,
            };
            primary.then_with(|| a.name().cmp(b.name()))
        });
    }
}
