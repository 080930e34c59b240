//! Response bodies shared between the user and captain handlers.

use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, Row};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct Fullname {
    pub firstname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct User {
    pub id: Uuid,
    pub fullname: Fullname,
    pub email: String,
}

impl User {
    /// Map a row holding id, first_name, last_name and email
    ///
    /// # Errors
    /// Returns an error if a column is missing or has the wrong type
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            fullname: Fullname {
                firstname: row.try_get("first_name")?,
                lastname: row.try_get("last_name")?,
            },
            email: row.try_get("email")?,
        })
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserAuth {
    pub user: User,
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CaptainStatus {
    Active,
    Inactive,
}

impl CaptainStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl FromStr for CaptainStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!("unknown captain status: {other}")),
        }
    }
}

impl fmt::Display for CaptainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Car,
    Motorcycle,
    Auto,
}

impl VehicleType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Motorcycle => "motorcycle",
            Self::Auto => "auto",
        }
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "car" => Ok(Self::Car),
            "motorcycle" => Ok(Self::Motorcycle),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown vehicle type: {other}")),
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub color: String,
    pub plate: String,
    pub capacity: i32,
    pub vehicle_type: VehicleType,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Captain {
    pub id: Uuid,
    pub fullname: Fullname,
    pub email: String,
    pub status: CaptainStatus,
    pub vehicle: Vehicle,
}

impl Captain {
    /// Map a row holding the captain account and vehicle columns
    ///
    /// # Errors
    /// Returns an error if a column is missing, has the wrong type or holds
    /// a status or vehicle type outside the schema CHECK constraints
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let vehicle_type: String = row.try_get("vehicle_type")?;

        Ok(Self {
            id: row.try_get("id")?,
            fullname: Fullname {
                firstname: row.try_get("first_name")?,
                lastname: row.try_get("last_name")?,
            },
            email: row.try_get("email")?,
            status: status
                .parse()
                .map_err(|err: String| column_decode("status", err))?,
            vehicle: Vehicle {
                color: row.try_get("vehicle_color")?,
                plate: row.try_get("vehicle_plate")?,
                capacity: row.try_get("vehicle_capacity")?,
                vehicle_type: vehicle_type
                    .parse()
                    .map_err(|err: String| column_decode("vehicle_type", err))?,
            },
        })
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CaptainAuth {
    pub captain: Captain,
    pub token: String,
}

fn column_decode(index: &str, message: String) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: index.into(),
        source: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vehicle_serializes_camel_case() {
        let vehicle = Vehicle {
            color: "red".to_string(),
            plate: "KA-01-1234".to_string(),
            capacity: 4,
            vehicle_type: VehicleType::Car,
        };

        let value = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(
            value,
            json!({
                "color": "red",
                "plate": "KA-01-1234",
                "capacity": 4,
                "vehicleType": "car"
            })
        );
    }

    #[test]
    fn test_vehicle_type_from_str() {
        assert_eq!("car".parse::<VehicleType>().unwrap(), VehicleType::Car);
        assert_eq!(
            "motorcycle".parse::<VehicleType>().unwrap(),
            VehicleType::Motorcycle
        );
        assert_eq!("auto".parse::<VehicleType>().unwrap(), VehicleType::Auto);
        assert!("boat".parse::<VehicleType>().is_err());
    }

    #[test]
    fn test_captain_status_round_trip() {
        for status in [CaptainStatus::Active, CaptainStatus::Inactive] {
            assert_eq!(status.as_str().parse::<CaptainStatus>().unwrap(), status);
        }
        assert!("banned".parse::<CaptainStatus>().is_err());
    }

    #[test]
    fn test_fullname_skips_missing_lastname() {
        let fullname = Fullname {
            firstname: "Ana".to_string(),
            lastname: None,
        };
        let value = serde_json::to_value(&fullname).unwrap();
        assert_eq!(value, json!({ "firstname": "Ana" }));
    }
}
