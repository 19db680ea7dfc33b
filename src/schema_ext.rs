use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A wrapper type for DateTime<Utc> to implement the Schema trait
#[derive(Serialize, Deserialize, ToSchema)]
#[schema(value_type = String, format = "date-time", example = "2023-01-01T12:00:00Z")]
pub struct DateTimeWrapper(pub DateTime<Utc>);
