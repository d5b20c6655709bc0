// src/models/brain_bucks.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{game::ROW_VALUES, store::Timestamp};

/// A question card of the Brain Bucks board, stored in `brainBucks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub id: String,
    /// Board row value the card is played for.
    pub value: i64,
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub time: Timestamp,
}

/// DTO for creating or replacing a card.
#[derive(Debug, Deserialize, Validate)]
pub struct CardRequest {
    #[validate(custom(function = validate_card_value))]
    pub value: i64,
    #[validate(length(min = 1, max = 1000))]
    pub question: String,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub answer: String,
}

fn validate_card_value(value: i64) -> Result<(), validator::ValidationError> {
    if !ROW_VALUES.contains(&value) {
        return Err(validator::ValidationError::new("invalid_card_value"));
    }
    Ok(())
}

/// DTO for creating a game. Team names default to "Team 1".."Team 3".
#[derive(Debug, Default, Deserialize)]
pub struct CreateGameRequest {
    #[serde(default)]
    pub teams: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TeamNameRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RevealCellRequest {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Deserialize)]
pub struct JudgeRequest {
    pub correct: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTeamRequest {
    pub team_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(value: i64) -> CardRequest {
        CardRequest {
            value,
            question: "2 + 2?".to_string(),
            answer: "4".to_string(),
        }
    }

    #[test]
    fn test_card_value_must_be_a_row_value() {
        assert!(card(300).validate().is_ok());
        assert!(card(250).validate().is_err());
        assert!(card(0).validate().is_err());
    }
}
