//! Developer console
//!
//! Text commands for poking at a running game:
//!
//! | command | effect |
//! |---|---|
//! | `debug` | toggle collision outlines |
//! | `spawn <kind> [x] [y] [speed]` | spawn an entity by kind id |
//! | `inspect <id>` | log an entity |
//! | `set <id> <property> <value>` | change `speed`, `x`, `y` or a shooter's `fire_chance` |
//! | `enemies` | outline every enemy |
//! | `printenemies` | log every enemy |

use crate::error::{CommandError, RegistryError};
use crate::renderer::DebugContext;
use crate::sim::entity::EntityId;
use crate::sim::registry::EntityRegistry;
use crate::sim::spawn::{SpawnHandler, SpawnRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Debug,
    Spawn(SpawnRequest),
    Inspect(EntityId),
    Set {
        id: EntityId,
        property: String,
        value: f32,
    },
    Enemies,
    PrintEnemies,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut args = line.split_whitespace();
        let name = args.next().ok_or(CommandError::Empty)?.to_lowercase();
        let rest: Vec<&str> = args.collect();

        match name.as_str() {
            "debug" => Ok(Command::Debug),
            "enemies" => Ok(Command::Enemies),
            "printenemies" => Ok(Command::PrintEnemies),
            "spawn" => {
                let numbers = rest
                    .iter()
                    .map(|arg| parse_number(arg))
                    .collect::<Result<Vec<f32>, _>>()?;
                SpawnRequest::from_args(&numbers)
                    .map(Command::Spawn)
                    .ok_or(CommandError::MissingArgument("kind"))
            }
            "inspect" => Ok(Command::Inspect(parse_id(rest.first())?)),
            "set" => {
                let id = parse_id(rest.first())?;
                let property = rest
                    .get(1)
                    .ok_or(CommandError::MissingArgument("property"))?
                    .to_string();
                let value = parse_number(rest.get(2).ok_or(CommandError::MissingArgument("value"))?)?;
                Ok(Command::Set {
                    id,
                    property,
                    value,
                })
            }
            _ => Err(CommandError::Unknown(line.to_string())),
        }
    }
}

fn parse_number(arg: &str) -> Result<f32, CommandError> {
    arg.parse::<f32>()
        .map_err(|_| CommandError::InvalidNumber(arg.to_string()))
}

fn parse_id(arg: Option<&&str>) -> Result<EntityId, CommandError> {
    let arg = arg.ok_or(CommandError::MissingArgument("id"))?;
    arg.parse::<u32>()
        .map(EntityId)
        .map_err(|_| CommandError::InvalidNumber(arg.to_string()))
}

/// Game state a command may touch
pub struct ConsoleTarget<'a> {
    pub registry: &'a mut EntityRegistry,
    pub spawner: &'a mut SpawnHandler,
    pub debug: &'a mut DebugContext,
}

/// Run a command. Lookup failures are logged; only identity exhaustion
/// while spawning is returned.
pub fn execute(command: &Command, target: ConsoleTarget<'_>) -> Result<(), RegistryError> {
    match command {
        Command::Debug => {
            let enabled = target.debug.toggle();
            log::info!("Dev console: debug drawing {}", if enabled { "on" } else { "off" });
        }
        Command::Spawn(request) => {
            target.spawner.spawn(target.registry, *request)?;
        }
        Command::Inspect(id) => match target.registry.get(*id) {
            Some(entity) => log::info!("Dev console: {:?}", entity),
            None => log::error!("Dev console: No entity with id {} exists.", id),
        },
        Command::Set {
            id,
            property,
            value,
        } => match target.registry.get_mut(*id) {
            Some(entity) => {
                if !entity.set_property(property, *value) {
                    log::warn!("Dev console: Unknown property '{}'", property);
                }
            }
            None => log::error!("Dev console: No entity with id {} exists.", id),
        },
        Command::Enemies => {
            let ids: Vec<EntityId> = target.registry.enemies().iter().map(|e| e.id()).collect();
            for id in ids {
                if let Some(entity) = target.registry.get_mut(id) {
                    entity.enable_debug();
                }
            }
        }
        Command::PrintEnemies => {
            for enemy in target.registry.enemies() {
                log::info!("Dev console: {:?}", enemy);
            }
        }
    }
    Ok(())
}
