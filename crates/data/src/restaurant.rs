use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Default, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub address: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewRestaurant {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub address: String,
}

impl From<Restaurant> for NewRestaurant {
    fn from(restaurant: Restaurant) -> Self {
        Self {
            name: restaurant.name,
            description: restaurant.description,
            image_url: restaurant.image_url,
            address: restaurant.address,
        }
    }
}
