//! Grant full power level ("ops") to a user in a bridged room.
//!
//! The flow is resolve alias → read `m.room.power_levels` → maybe confirm →
//! write the event back with the user raised. The write is always the last
//! request, so any failure or a declined prompt leaves the room untouched.

use bridge_common::{BridgeError, HomeserverClient, PowerLevels};
use std::io::{self, BufRead, Write};
use thiserror::Error;

pub const OPS_LEVEL: i64 = 100;
/// Users already at this level are raised without asking.
pub const SILENT_LEVEL: i64 = 50;
pub const CONFIRM_PROMPT: &str = "Current user is not an op. Continue? [y/n]: ";

#[derive(Debug, Error)]
pub enum GrantError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("failed to read confirmation: {0}")]
    Prompt(#[from] io::Error),
}

/// Asks the operator whether to go ahead.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        Ok(self(prompt))
    }
}

/// Answers every prompt with yes (`--yes`).
pub struct AlwaysYes;

impl Confirm for AlwaysYes {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        tracing::debug!(prompt, "confirmation skipped");
        Ok(true)
    }
}

/// Line-based prompt: writes the question, reads one answer.
///
/// EOF counts as "no", so a closed stdin never grants anything.
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptConfirm<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            writeln!(self.output)?;
            return Ok(false);
        }
        Ok(is_affirmative(&answer))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

pub fn needs_confirmation(current_level: i64, silent_level: i64) -> bool {
    current_level != silent_level
}

#[derive(Debug, Clone)]
pub struct GrantOptions {
    pub user_id: String,
    pub alias: String,
    pub level: i64,
    pub silent_level: i64,
}

impl GrantOptions {
    pub fn new(user_id: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            alias: alias.into(),
            level: OPS_LEVEL,
            silent_level: SILENT_LEVEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    Granted { room_id: String, previous_level: i64 },
    Declined { room_id: String, previous_level: i64 },
}

/// A room's power levels as read before any change is made.
#[derive(Debug, Clone)]
pub struct PendingGrant {
    pub room_id: String,
    pub event: PowerLevels,
}

/// Resolve the alias and read the room's current power levels.
pub fn fetch_room(hs: &HomeserverClient, alias: &str) -> Result<PendingGrant, GrantError> {
    let room_id = hs.resolve_alias(alias)?;
    let event = hs.power_levels(&room_id)?;
    Ok(PendingGrant { room_id, event })
}

impl PendingGrant {
    /// Ask if needed, then write the raised level back.
    pub fn apply(
        self,
        hs: &HomeserverClient,
        options: &GrantOptions,
        confirm: &mut dyn Confirm,
    ) -> Result<GrantOutcome, GrantError> {
        let PendingGrant { room_id, mut event } = self;

        let previous_level = event.level_of(&options.user_id);
        if needs_confirmation(previous_level, options.silent_level)
            && !confirm.confirm(CONFIRM_PROMPT)?
        {
            tracing::info!(
                user_id = %options.user_id,
                room_id = %room_id,
                previous_level,
                "grant declined"
            );
            return Ok(GrantOutcome::Declined {
                room_id,
                previous_level,
            });
        }

        event.set_level(&options.user_id, options.level);
        hs.put_power_levels(&room_id, &event)?;
        tracing::info!(
            user_id = %options.user_id,
            room_id = %room_id,
            previous_level,
            level = options.level,
            "power level raised"
        );

        Ok(GrantOutcome::Granted {
            room_id,
            previous_level,
        })
    }
}

pub fn grant_ops(
    hs: &HomeserverClient,
    options: &GrantOptions,
    confirm: &mut dyn Confirm,
) -> Result<GrantOutcome, GrantError> {
    fetch_room(hs, &options.alias)?.apply(hs, options, confirm)
}
