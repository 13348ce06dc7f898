use std::collections::BTreeMap;
use std::str::FromStr;

use thiserror::Error;

use crate::event_table::{ActivationType, ExecutionType};
use crate::game::GameBuild;
use crate::params::{EventParameter, ParameterType};
use crate::scoping::ScopeError;
use crate::snippet::{assemble_scoped, label_safe, GenerationContext};
use crate::symbols::SymbolError;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EventError {
    #[error("Event {event} does not support {game}")]
    UnsupportedGame { event: String, game: GameBuild },
    #[error("Event already registered: {0}")]
    DuplicateId(String),
    #[error("Event {id} would share entry labels with {existing}")]
    LabelCollision { id: String, existing: String },
    #[error("Missing '{0}' header")]
    MissingHeader(&'static str),
    #[error("Invalid header on line {line}: '{text}'")]
    InvalidHeader { line: usize, text: String },
    #[error("Event buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

/// What an event produced for one space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutput {
    /// Bytes written straight into the caller's buffer.
    Bytes { offset: usize, len: usize },
    /// Assembly text for the caller to assemble and place.
    Asm(String),
}

/// A kind of event that can be placed on a board space.
pub trait Event {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    fn activation_type(&self) -> ActivationType {
        ActivationType::LandedOn
    }

    fn execution_type(&self) -> ExecutionType {
        ExecutionType::Direct
    }

    fn parameters(&self) -> &[EventParameter] {
        &[]
    }

    fn games(&self) -> &[GameBuild];

    fn supports(&self, game: GameBuild) -> bool {
        self.games().contains(&game)
    }

    /// Generate the event's code for the space at `space_index`.
    ///
    /// Events that emit bytes directly write them into `buffer` and report the range they
    /// used; the rest return text and leave `buffer` alone.
    fn write(
        &self,
        buffer: &mut [u8],
        ctx: &GenerationContext,
        space_index: u16,
    ) -> Result<EventOutput, EventError>;
}

/// All events known to a patching run, keyed by id.
#[derive(Default)]
pub struct EventRegistry {
    events: BTreeMap<String, Box<dyn Event>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, event: Box<dyn Event>) -> Result<(), EventError> {
        let id = event.id().to_owned();
        if self.events.contains_key(&id) {
            return Err(EventError::DuplicateId(id));
        }
        let label = label_safe(&id);
        if let Some(existing) = self.events.keys().find(|other| label_safe(other) == label) {
            return Err(EventError::LabelCollision {
                id,
                existing: existing.clone(),
            });
        }
        tracing::debug!("registered event {}", id);
        self.events.insert(id, event);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn Event> {
        self.events.get(id).map(|event| event.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Event> {
        self.events.values().map(|event| event.as_ref())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// An event written by the user as a single assembly file.
///
/// The file starts with a comment header describing the event:
///
/// ```text
/// ; NAME: Give Coins
/// ; GAMES: MP1_USA,MP2_USA
/// ; EXECUTION: Direct
/// ; PARAM: Number|coins
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAsmEvent {
    id: String,
    name: String,
    games: Vec<GameBuild>,
    execution_type: ExecutionType,
    parameters: Vec<EventParameter>,
    asm: String,
}

impl CustomAsmEvent {
    #[tracing::instrument(skip(text))]
    pub fn parse(text: &str) -> Result<CustomAsmEvent, EventError> {
        let mut name = None;
        let mut games = vec![];
        let mut execution_type = ExecutionType::Direct;
        let mut parameters = vec![];

        for (ix, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some(comment) = line.strip_prefix(';') else {
                break;
            };
            let Some((key, value)) = comment.split_once(':') else {
                continue;
            };
            let value = value.trim();
            let invalid = || EventError::InvalidHeader {
                line: ix + 1,
                text: line.to_owned(),
            };

            match key.trim().to_ascii_uppercase().as_str() {
                "NAME" if !value.is_empty() => name = Some(value.to_owned()),
                "GAMES" => {
                    for game in value.split(',') {
                        games.push(GameBuild::from_str(game.trim()).map_err(|_| invalid())?);
                    }
                }
                "EXECUTION" => {
                    execution_type = ExecutionType::from_str(value).map_err(|_| invalid())?
                }
                "PARAM" => {
                    let (kind, param) = value.split_once('|').ok_or_else(invalid)?;
                    let kind = ParameterType::from_str(kind).unwrap_or_else(|never| match never {});
                    if let ParameterType::Other(other) = &kind {
                        tracing::warn!("unknown parameter type {}, passed through verbatim", other);
                    }
                    parameters.push(EventParameter::new(param.trim(), kind));
                }
                "NAME" => return Err(invalid()),
                _ => {}
            }
        }

        let name = name.ok_or(EventError::MissingHeader("NAME"))?;
        if games.is_empty() {
            return Err(EventError::MissingHeader("GAMES"));
        }

        Ok(CustomAsmEvent {
            id: label_safe(&name),
            name,
            games,
            execution_type,
            parameters,
            asm: text.to_owned(),
        })
    }
}

impl Event for CustomAsmEvent {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn execution_type(&self) -> ExecutionType {
        self.execution_type
    }

    fn parameters(&self) -> &[EventParameter] {
        &self.parameters
    }

    fn games(&self) -> &[GameBuild] {
        &self.games
    }

    #[tracing::instrument(skip(self, _buffer, ctx), fields(event = %self.id))]
    fn write(
        &self,
        _buffer: &mut [u8],
        ctx: &GenerationContext,
        space_index: u16,
    ) -> Result<EventOutput, EventError> {
        if !self.supports(ctx.game) {
            return Err(EventError::UnsupportedGame {
                event: self.id.clone(),
                game: ctx.game,
            });
        }
        let ctx = GenerationContext {
            parameters: &self.parameters,
            ..*ctx
        };
        Ok(EventOutput::Asm(assemble_scoped(
            &ctx,
            &self.id,
            space_index,
            &self.asm,
        )?))
    }
}
