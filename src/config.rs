use crate::browser;
use crate::puzzle::bookshelf::SHELF_SLOTS;
use crate::puzzle::ColorToken;
use anyhow::{bail, ensure, Context, Result};
use serde::Deserialize;

pub const CONFIG_PATH: &str = "room.json";
const MAX_CODE_LENGTH: usize = 12;

/// Room layout read once at startup. Every field is optional in the json,
/// missing ones take the stock room's value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// how many clue colors to draw when `code` is not given
    pub code_length: usize,
    /// fixed cube code, skips the random draw
    pub code: Option<Vec<u8>>,
    pub start_order: Vec<ColorToken>,
    pub target_order: Vec<ColorToken>,
    /// shelf slot whose book starts in the cabinet
    pub missing_slot: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        use crate::puzzle::ColorToken::*;
        RoomConfig {
            code_length: 6,
            code: None,
            start_order: vec![Purple, Orange, Blue, Yellow, Red],
            target_order: vec![Orange, Yellow, Purple, Blue, Red],
            missing_slot: 2,
        }
    }
}

impl RoomConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (1..=MAX_CODE_LENGTH).contains(&self.code_length),
            "code_length {} is outside 1..={}",
            self.code_length,
            MAX_CODE_LENGTH
        );
        if let Some(code) = &self.code {
            ensure!(
                (1..=MAX_CODE_LENGTH).contains(&code.len()),
                "code has {} digits, expected 1..={}",
                code.len(),
                MAX_CODE_LENGTH
            );
            if let Some(digit) = code.iter().find(|digit| !(1..=6).contains(*digit)) {
                bail!("code digit {} is not a cube face", digit);
            }
        }
        check_shelf(&self.start_order).context("start_order")?;
        check_shelf(&self.target_order).context("target_order")?;

        let mut start = self.start_order.clone();
        let mut target = self.target_order.clone();
        start.sort_by_key(|book| book.digit());
        target.sort_by_key(|book| book.digit());
        ensure!(
            start == target,
            "target_order is not a reordering of start_order"
        );
        ensure!(
            self.missing_slot < SHELF_SLOTS,
            "missing_slot {} is past the end of the shelf",
            self.missing_slot
        );
        Ok(())
    }

    /// Reads `path`, any fetch, parse or validation problem gives the stock
    /// room
    pub async fn load(path: &str) -> RoomConfig {
        match fetch_validated(path).await {
            Ok(config) => config,
            Err(err) => {
                warn!("using default room : {:#}", err);
                RoomConfig::default()
            }
        }
    }
}

async fn fetch_validated(path: &str) -> Result<RoomConfig> {
    let config: RoomConfig = browser::fetch_json(path)
        .await
        .with_context(|| format!("loading {}", path))?;
    config
        .validate()
        .with_context(|| format!("validating {}", path))?;
    Ok(config)
}

fn check_shelf(books: &[ColorToken]) -> Result<()> {
    ensure!(
        books.len() == SHELF_SLOTS,
        "expected {} books, got {}",
        SHELF_SLOTS,
        books.len()
    );
    for (index, book) in books.iter().enumerate() {
        ensure!(
            !books[..index].contains(book),
            "{} is on the shelf twice",
            book.name()
        );
    }
    Ok(())
}
