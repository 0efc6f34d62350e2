//! Game rating card: seven scored axes and their aggregate.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

/// One user's scores for one game. Each axis is 1-5.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct RatingCard {
    pub gameplay: u8,
    pub immersion: u8,
    pub fun: u8,
    pub story: u8,
    pub graphics: u8,
    pub sound: u8,
    pub replay: u8,
}

impl RatingCard {
    fn axes(self) -> [(&'static str, u8); 7] {
        [
            ("gameplay", self.gameplay),
            ("immersion", self.immersion),
            ("fun", self.fun),
            ("story", self.story),
            ("graphics", self.graphics),
            ("sound", self.sound),
            ("replay", self.replay),
        ]
    }

    /// Rejects any axis outside 1-5, naming the offending field.
    pub fn validate(self) -> Result<(), ApiError> {
        for (field, value) in self.axes() {
            if !(1..=5).contains(&value) {
                return Err(ApiError::invalid_input(field, "must be between 1 and 5"));
            }
        }
        Ok(())
    }

    /// Arithmetic mean of the seven axes.
    pub fn average(self) -> f64 {
        let sum: u32 = self.axes().iter().map(|&(_, v)| u32::from(v)).sum();
        f64::from(sum) / 7.0
    }
}
