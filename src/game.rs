// src/game.rs

//! Brain Bucks: a team quiz played on a 5x5 board.
//!
//! Each row is worth a fixed value. Revealing a cell draws the next unused
//! card for that value; the host then judges the active team's answer, which
//! adds or subtracts the value, and the turn passes to the next team. The game
//! ends once every cell has been played.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

use crate::{error::AppError, models::brain_bucks::Card};

pub const ROW_VALUES: [i64; 5] = [100, 200, 300, 400, 500];
pub const COL_COUNT: usize = 5;
pub const TOTAL_CELLS: usize = ROW_VALUES.len() * COL_COUNT;

/// Shown when every card of a value has already been played.
pub const MISSING_CARD_QUESTION: &str = "No question was found for this value.";

const DEFAULT_TEAM_COUNT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Teams are being set up.
    Teams,
    Board,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub score: i64,
}

/// The question currently shown to the teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub row: usize,
    pub col: usize,
    pub value: i64,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    WrongStage { expected: Stage, actual: Stage },
    NoTeams,
    LastTeam,
    UnknownTeam(u32),
    CellOutOfRange { row: usize, col: usize },
    CellUsed { row: usize, col: usize },
    PromptOpen,
    NoPrompt,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::WrongStage { expected, actual } => {
                write!(f, "Game is in stage {:?}, expected {:?}", actual, expected)
            }
            GameError::NoTeams => write!(f, "At least one team is required"),
            GameError::LastTeam => write!(f, "The last team cannot be removed"),
            GameError::UnknownTeam(id) => write!(f, "Team {} not found", id),
            GameError::CellOutOfRange { row, col } => {
                write!(f, "Cell ({}, {}) is outside the board", row, col)
            }
            GameError::CellUsed { row, col } => write!(f, "Cell ({}, {}) was already played", row, col),
            GameError::PromptOpen => write!(f, "Judge the open question first"),
            GameError::NoPrompt => write!(f, "No question is open"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::UnknownTeam(_) => AppError::NotFound(err.to_string()),
            GameError::WrongStage { .. }
            | GameError::CellUsed { .. }
            | GameError::PromptOpen
            | GameError::NoPrompt => AppError::Conflict(err.to_string()),
            GameError::NoTeams | GameError::LastTeam | GameError::CellOutOfRange { .. } => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    stage: Stage,
    teams: Vec<Team>,
    next_team_id: u32,
    active_team_id: Option<u32>,
    cards_by_value: BTreeMap<i64, Vec<Card>>,
    /// Next card to draw per value.
    pointers: HashMap<i64, usize>,
    used_cells: BTreeSet<(usize, usize)>,
    prompt: Option<Prompt>,
}

/// Serializable snapshot of a game.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub stage: Stage,
    pub teams: Vec<Team>,
    pub active_team_id: Option<u32>,
    pub row_values: [i64; 5],
    pub col_count: usize,
    pub used_cells: Vec<[usize; 2]>,
    pub prompt: Option<Prompt>,
    /// Ranked teams, once the game is over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standings: Option<Vec<Team>>,
}

impl Game {
    /// New game in the team setup stage with "Team 1".."Team 3".
    /// Cards are played per value in the order given.
    pub fn new(cards: Vec<Card>) -> Self {
        let mut cards_by_value: BTreeMap<i64, Vec<Card>> = BTreeMap::new();
        for card in cards {
            cards_by_value.entry(card.value).or_default().push(card);
        }

        let teams = (1..=DEFAULT_TEAM_COUNT)
            .map(|id| Team {
                id,
                name: format!("Team {}", id),
                score: 0,
            })
            .collect();

        Game {
            stage: Stage::Teams,
            teams,
            next_team_id: DEFAULT_TEAM_COUNT + 1,
            active_team_id: Some(1),
            cards_by_value,
            pointers: HashMap::new(),
            used_cells: BTreeSet::new(),
            prompt: None,
        }
    }

    /// New game with named teams instead of the defaults. Blank names fall
    /// back to "Team N".
    pub fn with_teams(cards: Vec<Card>, names: Vec<String>) -> Self {
        let mut game = Game::new(cards);
        game.teams.clear();
        game.next_team_id = 1;
        game.active_team_id = None;
        for name in names {
            let id = game.next_team_id;
            game.next_team_id += 1;
            let name = Some(name.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Team {}", id));
            game.teams.push(Team { id, name, score: 0 });
        }
        game.active_team_id = game.teams.first().map(|t| t.id);
        game
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn active_team_id(&self) -> Option<u32> {
        self.active_team_id
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    fn expect_stage(&self, expected: Stage) -> Result<(), GameError> {
        if self.stage != expected {
            return Err(GameError::WrongStage {
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }

    fn team_mut(&mut self, id: u32) -> Result<&mut Team, GameError> {
        self.teams
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(GameError::UnknownTeam(id))
    }

    pub fn add_team(&mut self, name: Option<String>) -> Result<&Team, GameError> {
        self.expect_stage(Stage::Teams)?;
        let id = self.next_team_id;
        self.next_team_id += 1;
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Team {}", id));
        self.teams.push(Team { id, name, score: 0 });
        if self.active_team_id.is_none() {
            self.active_team_id = Some(id);
        }
        Ok(&self.teams[self.teams.len() - 1])
    }

    pub fn remove_team(&mut self, id: u32) -> Result<(), GameError> {
        self.expect_stage(Stage::Teams)?;
        if !self.teams.iter().any(|t| t.id == id) {
            return Err(GameError::UnknownTeam(id));
        }
        if self.teams.len() == 1 {
            return Err(GameError::LastTeam);
        }
        self.teams.retain(|t| t.id != id);
        if self.active_team_id == Some(id) {
            self.active_team_id = self.teams.first().map(|t| t.id);
        }
        Ok(())
    }

    pub fn rename_team(&mut self, id: u32, name: &str) -> Result<(), GameError> {
        self.expect_stage(Stage::Teams)?;
        self.team_mut(id)?.name = name.trim().to_string();
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        self.expect_stage(Stage::Teams)?;
        if self.teams.is_empty() {
            return Err(GameError::NoTeams);
        }
        if self.active_team_id.is_none() {
            self.active_team_id = self.teams.first().map(|t| t.id);
        }
        self.stage = Stage::Board;
        Ok(())
    }

    /// Hands the turn to a specific team.
    pub fn select_active_team(&mut self, id: u32) -> Result<(), GameError> {
        self.expect_stage(Stage::Board)?;
        self.team_mut(id)?;
        self.active_team_id = Some(id);
        Ok(())
    }

    /// Opens the cell and draws the next card for its row value.
    /// The cell is spent even when no card is left for the value.
    pub fn reveal(&mut self, row: usize, col: usize) -> Result<&Prompt, GameError> {
        self.expect_stage(Stage::Board)?;
        if self.prompt.is_some() {
            return Err(GameError::PromptOpen);
        }
        if row >= ROW_VALUES.len() || col >= COL_COUNT {
            return Err(GameError::CellOutOfRange { row, col });
        }
        if self.used_cells.contains(&(row, col)) {
            return Err(GameError::CellUsed { row, col });
        }

        let value = ROW_VALUES[row];
        let pointer = self.pointers.get(&value).copied().unwrap_or(0);
        let card = self
            .cards_by_value
            .get(&value)
            .and_then(|cards| cards.get(pointer));

        let (question, answer) = match card {
            Some(card) => (card.question.clone(), card.answer.clone()),
            None => (MISSING_CARD_QUESTION.to_string(), String::new()),
        };
        if card.is_some() {
            self.pointers.insert(value, pointer + 1);
        }

        self.used_cells.insert((row, col));
        Ok(self.prompt.insert(Prompt {
            row,
            col,
            value,
            question,
            answer,
        }))
    }

    /// Scores the open question for the active team and passes the turn.
    pub fn judge(&mut self, correct: bool) -> Result<(), GameError> {
        self.expect_stage(Stage::Board)?;
        let prompt = self.prompt.take().ok_or(GameError::NoPrompt)?;

        if let Some(active) = self.active_team_id {
            let delta = if correct { prompt.value } else { -prompt.value };
            if let Ok(team) = self.team_mut(active) {
                team.score += delta;
            }
            self.advance_turn();
        }

        if self.used_cells.len() >= TOTAL_CELLS {
            self.stage = Stage::Results;
        }
        Ok(())
    }

    fn advance_turn(&mut self) {
        let Some(active) = self.active_team_id else {
            return;
        };
        if let Some(idx) = self.teams.iter().position(|t| t.id == active) {
            let next = &self.teams[(idx + 1) % self.teams.len()];
            self.active_team_id = Some(next.id);
        }
    }

    /// Teams ranked by score, highest first. Ties keep team order.
    pub fn standings(&self) -> Vec<Team> {
        let mut ranked = self.teams.clone();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }

    pub fn view(&self) -> GameView {
        GameView {
            stage: self.stage,
            teams: self.teams.clone(),
            active_team_id: self.active_team_id,
            row_values: ROW_VALUES,
            col_count: COL_COUNT,
            used_cells: self.used_cells.iter().map(|&(r, c)| [r, c]).collect(),
            prompt: self.prompt.clone(),
            standings: (self.stage == Stage::Results).then(|| self.standings()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Timestamp;

    fn card(value: i64, question: &str) -> Card {
        Card {
            id: question.to_string(),
            value,
            question: question.to_string(),
            answer: format!("{} answer", question),
            time: Timestamp::Pending,
        }
    }

    fn started(cards: Vec<Card>) -> Game {
        let mut game = Game::new(cards);
        game.start().unwrap();
        game
    }

    #[test]
    fn test_new_game_has_default_teams() {
        let game = Game::new(Vec::new());
        assert_eq!(game.stage(), Stage::Teams);
        let names: Vec<&str> = game.teams().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Team 1", "Team 2", "Team 3"]);
        assert_eq!(game.active_team_id(), Some(1));
    }

    #[test]
    fn test_team_editing() {
        let mut game = Game::new(Vec::new());
        assert_eq!(game.add_team(Some("  Owls ".to_string())).unwrap().name, "Owls");
        assert_eq!(game.add_team(None).unwrap().name, "Team 5");
        game.rename_team(2, "Foxes").unwrap();
        game.remove_team(1).unwrap();

        assert_eq!(game.teams()[0].name, "Foxes");
        assert_eq!(game.active_team_id(), Some(2));
        assert_eq!(game.remove_team(99), Err(GameError::UnknownTeam(99)));
    }

    #[test]
    fn test_last_team_cannot_be_removed() {
        let mut game = Game::with_teams(Vec::new(), vec!["Solo".to_string()]);
        assert_eq!(game.remove_team(1), Err(GameError::LastTeam));
    }

    #[test]
    fn test_with_teams_names_blank_entries() {
        let game = Game::with_teams(Vec::new(), vec!["Owls".to_string(), " ".to_string()]);
        let names: Vec<&str> = game.teams().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Owls", "Team 2"]);
    }

    #[test]
    fn test_start_requires_teams() {
        let mut game = Game::with_teams(Vec::new(), Vec::new());
        assert_eq!(game.start(), Err(GameError::NoTeams));
    }

    #[test]
    fn test_teams_locked_after_start() {
        let mut game = started(Vec::new());
        assert!(matches!(
            game.add_team(None),
            Err(GameError::WrongStage { expected: Stage::Teams, actual: Stage::Board })
        ));
    }

    #[test]
    fn test_reveal_draws_cards_in_order() {
        let mut game = started(vec![card(100, "first"), card(100, "second")]);

        assert_eq!(game.reveal(0, 0).unwrap().question, "first");
        game.judge(true).unwrap();
        assert_eq!(game.reveal(0, 1).unwrap().question, "second");
        game.judge(false).unwrap();
        assert_eq!(game.reveal(0, 2).unwrap().question, MISSING_CARD_QUESTION);
    }

    #[test]
    fn test_judge_scores_and_rotates_turn() {
        let mut game = started(vec![card(300, "q")]);

        game.reveal(2, 0).unwrap();
        game.judge(true).unwrap();
        assert_eq!(game.teams()[0].score, 300);
        assert_eq!(game.active_team_id(), Some(2));

        game.reveal(2, 1).unwrap();
        game.judge(false).unwrap();
        assert_eq!(game.teams()[1].score, -300);
        assert_eq!(game.active_team_id(), Some(3));
    }

    #[test]
    fn test_reveal_rules() {
        let mut game = started(Vec::new());
        assert_eq!(
            game.reveal(5, 0).unwrap_err(),
            GameError::CellOutOfRange { row: 5, col: 0 }
        );
        game.reveal(1, 1).unwrap();
        assert_eq!(game.reveal(1, 2).unwrap_err(), GameError::PromptOpen);
        game.judge(true).unwrap();
        assert_eq!(game.reveal(1, 1).unwrap_err(), GameError::CellUsed { row: 1, col: 1 });
        assert_eq!(game.judge(true), Err(GameError::NoPrompt));
    }

    #[test]
    fn test_select_active_team() {
        let mut game = started(Vec::new());
        game.select_active_team(3).unwrap();
        assert_eq!(game.active_team_id(), Some(3));
        assert_eq!(game.select_active_team(7), Err(GameError::UnknownTeam(7)));
    }

    #[test]
    fn test_full_board_ends_game() {
        let mut game = started(Vec::new());
        for row in 0..ROW_VALUES.len() {
            for col in 0..COL_COUNT {
                game.reveal(row, col).unwrap();
                game.judge(row == 4).unwrap();
            }
        }

        assert_eq!(game.stage(), Stage::Results);
        let view = game.view();
        let standings = view.standings.unwrap();
        assert_eq!(standings.len(), 3);
        assert!(standings.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
